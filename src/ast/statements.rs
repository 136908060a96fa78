use super::ast::{ExprId, IdentId, StmtId};

/// Statement node variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `target := value`; the target is a `Variable` or `ArrayElement` expression.
    Assign { target: ExprId, value: ExprId },
    /// A procedure call, including the built-in `write`.
    ProcCall {
        callee: IdentId,
        arguments: Vec<ExprId>,
    },
    /// `begin ... end`
    Compound(Vec<StmtId>),
    If {
        condition: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    While { condition: ExprId, body: StmtId },
}
