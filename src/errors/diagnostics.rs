//! Semantic diagnostics collected while checking a program.
//!
//! Unlike syntax errors, semantic problems never stop the walk: they are
//! appended to a [`Diagnostics`] sink that is handed by `&mut` to every
//! declaration, lookup and check. Code generation only runs when the sink
//! holds no errors; warnings never block it.

use std::fmt::Display;

use thiserror::Error;

use crate::{ast::types::Kind, Position};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("Redefinition of variable: {name}")]
    VariableRedefinition { name: String },
    #[error("Redefinition of function: {name}")]
    FunctionRedefinition { name: String },
    #[error("Redefinition of procedure: {name}")]
    ProcedureRedefinition { name: String },
    #[error("Undeclared variable: {name}")]
    UndeclaredVariable { name: String },
    #[error("Undeclared function: {signature}")]
    UndeclaredFunction { signature: String },
    #[error("Undeclared procedure: {signature}")]
    UndeclaredProcedure { signature: String },
    #[error("Identifier '{name}' is not an array.")]
    NotAnArray { name: String },
    #[error("Array index for '{name}' must be an integer expression, but got {found}.")]
    NonIntegerIndex { name: String, found: Kind },
    #[error("Cannot apply '{operator}' to operands of type {left} and {right}.")]
    IncompatibleOperands {
        operator: String,
        left: Kind,
        right: Kind,
    },
    #[error("Operator '{operator}' requires {expected} operand, but got {found}.")]
    InvalidUnaryOperand {
        operator: String,
        expected: String,
        found: Kind,
    },
    #[error("{statement} condition must be a boolean expression, but got {found}.")]
    NonBooleanCondition { statement: String, found: Kind },
    #[error("Cannot assign expression of type {found} to variable '{name}' of type {expected}.")]
    AssignmentMismatch {
        name: String,
        expected: Kind,
        found: Kind,
    },
    #[error("Type mismatch in return assignment for function '{function}'. Expected {expected} but got {found}.")]
    ReturnTypeMismatch {
        function: String,
        expected: Kind,
        found: Kind,
    },
    #[error("Function '{function}' is missing a return assignment (e.g., {function} := expression).")]
    MissingReturn { function: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticWarning {
    #[error("Implicitly casting integer to real in {context}.")]
    ImplicitIntToReal { context: String },
    #[error("Implicitly casting integer expression to real for return value of function '{function}'.")]
    ImplicitReturnCast { function: String },
}

/// A semantic error or warning together with where it was detected.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic<T> {
    pub kind: T,
    pub position: Position,
}

impl<T: Display> Display for Diagnostic<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} Message: {}",
            self.position.line, self.position.column, self.kind
        )
    }
}

/// Ordered errors and warnings of one type-checking run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    errors: Vec<Diagnostic<SemanticError>>,
    warnings: Vec<Diagnostic<SemanticWarning>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn error(&mut self, kind: SemanticError, position: Position) {
        log::trace!("error at {}: {}", position, kind);
        self.errors.push(Diagnostic { kind, position });
    }

    pub fn warning(&mut self, kind: SemanticWarning, position: Position) {
        log::trace!("warning at {}: {}", position, kind);
        self.warnings.push(Diagnostic { kind, position });
    }

    pub fn errors(&self) -> &[Diagnostic<SemanticError>] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Diagnostic<SemanticWarning>] {
        &self.warnings
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Formats every warning, then every error, the way the driver prints them.
    pub fn report(&self) -> String {
        let mut out = String::new();

        for warning in &self.warnings {
            out.push_str(&format!("Warning:{}\n", warning));
        }

        if self.has_errors() {
            out.push_str(&format!("** Found {} Errors **\n", self.errors.len()));
            for error in &self.errors {
                out.push_str(&format!("Error:{}\n", error));
            }
            out.push_str("Fix these then try to compile again\n");
        }

        out
    }
}
