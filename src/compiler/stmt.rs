use crate::ast::{
    ast::{ExprId, IdentId, StmtId},
    expressions::Expr,
    statements::Stmt,
    types::Kind,
};
use crate::type_checker::scope::SymbolRole;

use super::{
    compiler::{CodegenError, Compiler},
    expr::{gen_call, gen_element_address, gen_expression, gen_write},
};

pub fn gen_statement(compiler: &mut Compiler, id: StmtId) -> Result<(), CodegenError> {
    let ast = compiler.ast;

    match &ast.stmt(id).stmt {
        Stmt::Assign { target, value } => gen_assignment(compiler, *target, *value),
        Stmt::ProcCall { callee, arguments } => {
            let symbol = compiler.symbol_of(*callee)?;
            if symbol.builtin {
                gen_write(compiler, arguments)
            } else {
                gen_call(compiler, *callee, arguments)
            }
        }
        Stmt::Compound(statements) => {
            for statement in statements {
                gen_statement(compiler, *statement)?;
            }
            Ok(())
        }
        Stmt::If {
            condition,
            then_branch,
            else_branch,
        } => {
            let end = compiler.new_label();
            gen_expression(compiler, *condition)?;

            match else_branch {
                Some(else_branch) => {
                    let otherwise = compiler.new_label();
                    compiler.emit(format!("JZ {}", otherwise));
                    gen_statement(compiler, *then_branch)?;
                    compiler.emit(format!("JUMP {}", end));
                    compiler.emit_label(&otherwise);
                    gen_statement(compiler, *else_branch)?;
                }
                None => {
                    compiler.emit(format!("JZ {}", end));
                    gen_statement(compiler, *then_branch)?;
                }
            }

            compiler.emit_label(&end);
            Ok(())
        }
        Stmt::While { condition, body } => {
            let start = compiler.new_label();
            let end = compiler.new_label();

            compiler.emit_label(&start);
            gen_expression(compiler, *condition)?;
            compiler.emit(format!("JZ {}", end));
            gen_statement(compiler, *body)?;
            compiler.emit(format!("JUMP {}", start));
            compiler.emit_label(&end);
            Ok(())
        }
    }
}

/// Evaluates `value`, converting it to a real when stored into a real slot.
fn gen_value(compiler: &mut Compiler, value: ExprId, target_kind: Kind) -> Result<(), CodegenError> {
    gen_expression(compiler, value)?;

    if target_kind == Kind::Real && compiler.kind_of(value) == Kind::Int {
        compiler.emit("ITOF");
    }
    Ok(())
}

fn gen_assignment(compiler: &mut Compiler, target: ExprId, value: ExprId) -> Result<(), CodegenError> {
    let ast = compiler.ast;
    let target_kind = compiler.kind_of(target);

    match &ast.expr(target).expr {
        Expr::Variable(ident) => gen_variable_store(compiler, *ident, value, target_kind),
        Expr::ArrayElement { array, index } => {
            gen_element_address(compiler, *array, *index)?;
            gen_value(compiler, value, target_kind)?;
            compiler.emit("STOREN");
            Ok(())
        }
        _ => Err(CodegenError::NotAVariable {
            name: String::from("<expression>"),
        }),
    }
}

fn gen_variable_store(
    compiler: &mut Compiler,
    ident: IdentId,
    value: ExprId,
    target_kind: Kind,
) -> Result<(), CodegenError> {
    let symbol = compiler.symbol_of(ident)?;
    gen_value(compiler, value, target_kind)?;

    if symbol.role == SymbolRole::Func {
        // The caller reserved the result slot just below the parameters.
        let offset = -(1 + symbol.param_count() as i64);
        compiler.emit(format!("STOREL {}", offset));
        return Ok(());
    }

    compiler.store_variable(symbol)
}
