use std::fmt::Display;

use super::ast::{ExprId, IdentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    /// `/`, always produces a real
    Divide,
    /// `div`, integers only
    IntDivide,
    Greater,
    Less,
    GreaterEquals,
    LessEquals,
    Equals,
    NotEquals,
    And,
    Or,
}

impl BinaryOperator {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
                | BinaryOperator::IntDivide
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Greater
                | BinaryOperator::Less
                | BinaryOperator::GreaterEquals
                | BinaryOperator::LessEquals
                | BinaryOperator::Equals
                | BinaryOperator::NotEquals
        )
    }

    /// `<`, `>`, `<=` and `>=`; these reject booleans.
    pub fn is_ordering(self) -> bool {
        self.is_comparison() && !matches!(self, BinaryOperator::Equals | BinaryOperator::NotEquals)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }

    /// Human readable name used in promotion warnings.
    pub fn describe(self) -> &'static str {
        match self {
            BinaryOperator::Add => "addition",
            BinaryOperator::Subtract => "subtraction",
            BinaryOperator::Multiply => "multiplication",
            BinaryOperator::Divide => "division",
            BinaryOperator::IntDivide => "integer division",
            BinaryOperator::Greater
            | BinaryOperator::Less
            | BinaryOperator::GreaterEquals
            | BinaryOperator::LessEquals
            | BinaryOperator::Equals
            | BinaryOperator::NotEquals => "comparison",
            BinaryOperator::And | BinaryOperator::Or => "logical operation",
        }
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::IntDivide => "div",
            BinaryOperator::Greater => ">",
            BinaryOperator::Less => "<",
            BinaryOperator::GreaterEquals => ">=",
            BinaryOperator::LessEquals => "<=",
            BinaryOperator::Equals => "=",
            BinaryOperator::NotEquals => "<>",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        };
        write!(f, "{}", symbol)
    }
}

impl Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOperator::Negate => write!(f, "-"),
            UnaryOperator::Not => write!(f, "not"),
        }
    }
}

/// Expression node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Integer(i64),
    Real(f64),
    Boolean(bool),
    /// A plain variable reference, also the target of a return write.
    Variable(IdentId),
    ArrayElement {
        array: IdentId,
        index: ExprId,
    },
    Call {
        callee: IdentId,
        arguments: Vec<ExprId>,
    },
    Unary {
        operator: UnaryOperator,
        operand: ExprId,
    },
    Binary {
        operator: BinaryOperator,
        left: ExprId,
        right: ExprId,
    },
}
