use crate::{
    ast::{
        ast::{Arena, Ast, ExprId, IdentId, Program, StmtId, SubprogramDecl, VarDecl},
        expressions::{BinaryOperator, Expr, UnaryOperator},
        statements::Stmt,
        types::{Kind, Signature},
    },
    errors::diagnostics::{Diagnostics, SemanticError, SemanticWarning},
    Position,
};

use super::scope::{ScopeManager, SymbolId, SymbolRole};

/// The function whose body is being walked, for return writes.
#[derive(Debug, Clone)]
pub struct CallableContext {
    pub name: String,
    pub symbol: Option<SymbolId>,
    pub return_kind: Kind,
    pub has_return: bool,
}

#[derive(Debug)]
pub struct TypeChecker {
    pub arena: Arena,
    pub scopes: ScopeManager,
    pub diagnostics: Diagnostics,
    pub function: Option<CallableContext>,
}

/// What a checking run leaves behind besides the annotated tree.
#[derive(Debug)]
pub struct TypeCheckOutput {
    pub scopes: ScopeManager,
    pub diagnostics: Diagnostics,
}

impl TypeChecker {
    pub fn new(arena: Arena) -> Self {
        TypeChecker {
            arena,
            scopes: ScopeManager::with_builtins(),
            diagnostics: Diagnostics::new(),
            function: None,
        }
    }

    fn ident_position(&self, id: IdentId) -> Position {
        self.arena[id].span.start
    }

    fn expr_position(&self, id: ExprId) -> Position {
        self.arena[id].span.start
    }

    fn link(&mut self, ident: IdentId, symbol: Option<SymbolId>) {
        self.arena[ident].symbol = symbol;
    }

    fn annotate(&mut self, id: ExprId, kind: Kind) -> Kind {
        self.arena[id].kind = kind;
        kind
    }

    fn symbol_kind(&self, symbol: Option<SymbolId>) -> Kind {
        symbol
            .and_then(|id| self.scopes.symbol(id))
            .map(|symbol| symbol.data_kind)
            .unwrap_or(Kind::Void)
    }

    fn declare_variables(&mut self, declarations: &[VarDecl], role: SymbolRole) {
        for declaration in declarations {
            for name in &declaration.names {
                let position = self.ident_position(*name);
                let symbol = self.scopes.declare_variable(
                    &self.arena[*name].name,
                    role,
                    &declaration.ty,
                    position,
                    &mut self.diagnostics,
                );
                self.link(*name, symbol);
            }
        }
    }
}

/// Checks a whole program, annotating `ast` in place.
///
/// Annotations from an earlier run are cleared first, so checking the same
/// tree twice yields the same diagnostics.
pub fn type_check(ast: &mut Ast) -> TypeCheckOutput {
    let mut arena = std::mem::take(&mut ast.arena);
    arena.reset_annotations();

    let mut type_checker = TypeChecker::new(arena);
    type_check_program(&mut type_checker, &ast.program);

    log::debug!(
        "type check finished: {} errors, {} warnings",
        type_checker.diagnostics.errors().len(),
        type_checker.diagnostics.warnings().len()
    );

    ast.arena = type_checker.arena;

    TypeCheckOutput {
        scopes: type_checker.scopes,
        diagnostics: type_checker.diagnostics,
    }
}

pub fn type_check_program(type_checker: &mut TypeChecker, program: &Program) {
    type_checker.declare_variables(&program.globals, SymbolRole::Global);

    for subprogram in &program.subprograms {
        type_check_subprogram(type_checker, subprogram);
    }

    type_check_stmt(type_checker, program.body);
}

pub fn type_check_subprogram(type_checker: &mut TypeChecker, decl: &SubprogramDecl) {
    let name = type_checker.arena[decl.name].name.clone();
    let position = type_checker.ident_position(decl.name);

    let param_kinds = decl
        .params
        .iter()
        .flat_map(|param| param.names.iter().map(|_| param.ty.element_kind()))
        .collect::<Vec<Kind>>();

    let role = if decl.is_function() {
        SymbolRole::Func
    } else {
        SymbolRole::Proc
    };

    let signature = Signature::new(name.clone(), param_kinds, decl.return_kind());
    let symbol = type_checker.scopes.declare_callable(
        role,
        signature,
        position,
        &mut type_checker.diagnostics,
    );
    type_checker.link(decl.name, symbol);

    let scope = type_checker.scopes.enter_scope();
    log::debug!("checking {:?} '{}' in scope {:?}", role, name, scope);

    type_checker.declare_variables(&decl.params, SymbolRole::Param);
    type_checker.declare_variables(&decl.locals, SymbolRole::Local);

    let enclosing = type_checker.function.take();
    if decl.is_function() {
        type_checker.function = Some(CallableContext {
            name: name.clone(),
            symbol,
            return_kind: decl.return_kind(),
            has_return: false,
        });
    }

    type_check_stmt(type_checker, decl.body);

    let context = std::mem::replace(&mut type_checker.function, enclosing);
    if let Some(context) = context {
        if !context.has_return {
            type_checker
                .diagnostics
                .error(SemanticError::MissingReturn { function: name }, position);
        }
    }

    type_checker.scopes.exit_scope();
}

pub fn type_check_stmt(type_checker: &mut TypeChecker, id: StmtId) {
    let stmt = type_checker.arena[id].stmt.clone();

    match stmt {
        Stmt::Assign { target, value } => type_check_assignment(type_checker, target, value),
        Stmt::ProcCall { callee, arguments } => {
            type_check_call(type_checker, callee, &arguments, SymbolRole::Proc);
        }
        Stmt::Compound(statements) => {
            for statement in statements {
                type_check_stmt(type_checker, statement);
            }
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            type_check_condition(type_checker, condition, "If");
            type_check_stmt(type_checker, then_branch);
            if let Some(else_branch) = else_branch {
                type_check_stmt(type_checker, else_branch);
            }
        }
        Stmt::While { condition, body } => {
            type_check_condition(type_checker, condition, "While");
            type_check_stmt(type_checker, body);
        }
    }
}

fn type_check_condition(type_checker: &mut TypeChecker, condition: ExprId, statement: &str) {
    let kind = type_check_expr(type_checker, condition);

    if kind != Kind::Bool && !kind.is_void() {
        let position = type_checker.expr_position(condition);
        type_checker.diagnostics.error(
            SemanticError::NonBooleanCondition {
                statement: statement.to_string(),
                found: kind,
            },
            position,
        );
    }
}

/// The return slot written by `target`, if it names the enclosing function.
fn return_write(type_checker: &TypeChecker, target: ExprId) -> Option<IdentId> {
    let context = type_checker.function.as_ref()?;

    match type_checker.arena[target].expr {
        Expr::Variable(ident) if type_checker.arena[ident].name == context.name => Some(ident),
        _ => None,
    }
}

fn type_check_assignment(type_checker: &mut TypeChecker, target: ExprId, value: ExprId) {
    let is_return = return_write(type_checker, target);

    let target_kind = match (is_return, type_checker.function.as_mut()) {
        (Some(ident), Some(context)) => {
            context.has_return = true;
            let (symbol, kind) = (context.symbol, context.return_kind);
            type_checker.link(ident, symbol);
            type_checker.annotate(target, kind)
        }
        _ => type_check_expr(type_checker, target),
    };

    let value_kind = type_check_expr(type_checker, value);

    if target_kind.is_void() || value_kind.is_void() || target_kind == value_kind {
        return;
    }

    let position = type_checker.expr_position(target);
    let name = match type_checker.arena[target].expr {
        Expr::Variable(ident) | Expr::ArrayElement { array: ident, .. } => {
            type_checker.arena[ident].name.clone()
        }
        _ => String::new(),
    };

    if target_kind == Kind::Real && value_kind == Kind::Int {
        let warning = if is_return.is_some() {
            SemanticWarning::ImplicitReturnCast { function: name }
        } else {
            SemanticWarning::ImplicitIntToReal {
                context: format!("assignment to '{}'", name),
            }
        };
        type_checker.diagnostics.warning(warning, position);
        return;
    }

    let error = if is_return.is_some() {
        SemanticError::ReturnTypeMismatch {
            function: name,
            expected: target_kind,
            found: value_kind,
        }
    } else {
        SemanticError::AssignmentMismatch {
            name,
            expected: target_kind,
            found: value_kind,
        }
    };
    type_checker.diagnostics.error(error, position);
}

/// Resolves a call by the kinds of its arguments; returns the callable's
/// return kind. A `Void` argument keeps its position, so a call with the
/// wrong name or arity is still reported.
fn type_check_call(
    type_checker: &mut TypeChecker,
    callee: IdentId,
    arguments: &[ExprId],
    role: SymbolRole,
) -> Kind {
    let kinds = arguments
        .iter()
        .map(|argument| type_check_expr(type_checker, *argument))
        .collect::<Vec<Kind>>();

    let position = type_checker.ident_position(callee);
    let symbol = type_checker.scopes.lookup_callable(
        &type_checker.arena[callee].name,
        role,
        &kinds,
        position,
        &mut type_checker.diagnostics,
    );
    type_checker.link(callee, symbol);

    type_checker.symbol_kind(symbol)
}

pub fn type_check_expr(type_checker: &mut TypeChecker, id: ExprId) -> Kind {
    let expr = type_checker.arena[id].expr.clone();

    let kind = match expr {
        Expr::Integer(_) => Kind::Int,
        Expr::Real(_) => Kind::Real,
        Expr::Boolean(_) => Kind::Bool,
        Expr::Variable(ident) => {
            let position = type_checker.ident_position(ident);
            let symbol = type_checker.scopes.lookup_variable(
                &type_checker.arena[ident].name,
                position,
                &mut type_checker.diagnostics,
            );
            type_checker.link(ident, symbol);
            type_checker.symbol_kind(symbol)
        }
        Expr::ArrayElement { array, index } => {
            type_check_array_element(type_checker, array, index)
        }
        Expr::Call { callee, arguments } => {
            type_check_call(type_checker, callee, &arguments, SymbolRole::Func)
        }
        Expr::Unary { operator, operand } => {
            type_check_unary(type_checker, id, operator, operand)
        }
        Expr::Binary {
            operator,
            left,
            right,
        } => type_check_binary(type_checker, id, operator, left, right),
    };

    type_checker.annotate(id, kind)
}

fn type_check_array_element(type_checker: &mut TypeChecker, array: IdentId, index: ExprId) -> Kind {
    let position = type_checker.ident_position(array);
    let name = type_checker.arena[array].name.clone();

    let symbol = type_checker
        .scopes
        .lookup_variable(&name, position, &mut type_checker.diagnostics);
    type_checker.link(array, symbol);

    let index_kind = type_check_expr(type_checker, index);
    let array_kind = type_checker.symbol_kind(symbol);

    if !array_kind.is_void() && !array_kind.is_array() {
        type_checker
            .diagnostics
            .error(SemanticError::NotAnArray { name: name.clone() }, position);
        return Kind::Void;
    }

    if index_kind != Kind::Int && !index_kind.is_void() {
        let index_position = type_checker.expr_position(index);
        type_checker.diagnostics.error(
            SemanticError::NonIntegerIndex {
                name,
                found: index_kind,
            },
            index_position,
        );
    }

    array_kind.element()
}

fn type_check_unary(
    type_checker: &mut TypeChecker,
    id: ExprId,
    operator: UnaryOperator,
    operand: ExprId,
) -> Kind {
    let operand_kind = type_check_expr(type_checker, operand);
    let position = type_checker.expr_position(id);

    match operator {
        UnaryOperator::Negate => {
            if operand_kind.is_numeric() || operand_kind.is_void() {
                return operand_kind;
            }

            type_checker.diagnostics.error(
                SemanticError::InvalidUnaryOperand {
                    operator: operator.to_string(),
                    expected: String::from("Int or Real"),
                    found: operand_kind,
                },
                position,
            );
            Kind::Void
        }
        UnaryOperator::Not => {
            if operand_kind != Kind::Bool && !operand_kind.is_void() {
                type_checker.diagnostics.error(
                    SemanticError::InvalidUnaryOperand {
                        operator: operator.to_string(),
                        expected: String::from("Bool"),
                        found: operand_kind,
                    },
                    position,
                );
            }
            Kind::Bool
        }
    }
}

fn type_check_binary(
    type_checker: &mut TypeChecker,
    id: ExprId,
    operator: BinaryOperator,
    left: ExprId,
    right: ExprId,
) -> Kind {
    let left_kind = type_check_expr(type_checker, left);
    let right_kind = type_check_expr(type_checker, right);
    let position = type_checker.expr_position(id);

    let incompatible = SemanticError::IncompatibleOperands {
        operator: operator.to_string(),
        left: left_kind,
        right: right_kind,
    };
    let promotion = SemanticWarning::ImplicitIntToReal {
        context: operator.describe().to_string(),
    };
    let any_void = left_kind.is_void() || right_kind.is_void();
    let mixed_numeric =
        left_kind.is_numeric() && right_kind.is_numeric() && left_kind != right_kind;

    if operator.is_logical() {
        if !any_void && (left_kind != Kind::Bool || right_kind != Kind::Bool) {
            type_checker.diagnostics.error(incompatible, position);
        }
        return Kind::Bool;
    }

    if operator.is_comparison() {
        if any_void {
            return Kind::Bool;
        }

        if mixed_numeric {
            type_checker.diagnostics.warning(promotion, position);
        } else if left_kind != right_kind
            || left_kind.is_array()
            || (left_kind == Kind::Bool && operator.is_ordering())
        {
            type_checker.diagnostics.error(incompatible, position);
        }
        return Kind::Bool;
    }

    // Arithmetic
    if any_void {
        return Kind::Void;
    }

    if operator == BinaryOperator::IntDivide {
        if left_kind == Kind::Int && right_kind == Kind::Int {
            return Kind::Int;
        }
        type_checker.diagnostics.error(incompatible, position);
        return Kind::Void;
    }

    if !left_kind.is_numeric() || !right_kind.is_numeric() {
        type_checker.diagnostics.error(incompatible, position);
        return Kind::Void;
    }

    if mixed_numeric {
        type_checker.diagnostics.warning(promotion, position);
        return Kind::Real;
    }

    match (operator, left_kind) {
        (BinaryOperator::Divide, _) => Kind::Real,
        (_, kind) => kind,
    }
}
