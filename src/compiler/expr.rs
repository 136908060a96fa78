use crate::ast::{
    ast::{ExprId, IdentId},
    expressions::{BinaryOperator, Expr, UnaryOperator},
    types::Kind,
};
use crate::type_checker::scope::SymbolRole;

use super::compiler::{CodegenError, Compiler};

pub fn gen_expression(compiler: &mut Compiler, id: ExprId) -> Result<(), CodegenError> {
    let ast = compiler.ast;

    match &ast.expr(id).expr {
        Expr::Integer(value) => compiler.emit(format!("PUSHI {}", value)),
        Expr::Real(value) => compiler.emit(format!("PUSHF {}", real_literal(*value))),
        Expr::Boolean(value) => compiler.emit(format!("PUSHI {}", i32::from(*value))),
        Expr::Variable(ident) => {
            let symbol = compiler.symbol_of(*ident)?;
            compiler.push_variable(symbol)?;
        }
        Expr::ArrayElement { array, index } => {
            gen_element_address(compiler, *array, *index)?;
            compiler.emit("LOADN");
        }
        Expr::Call { callee, arguments } => gen_call(compiler, *callee, arguments)?,
        Expr::Unary { operator, operand } => {
            gen_expression(compiler, *operand)?;

            match (operator, compiler.kind_of(*operand)) {
                (UnaryOperator::Not, _) => compiler.emit("NOT"),
                (UnaryOperator::Negate, Kind::Real) => {
                    compiler.emit("PUSHF -1.0");
                    compiler.emit("FMUL");
                }
                (UnaryOperator::Negate, _) => {
                    compiler.emit("PUSHI -1");
                    compiler.emit("MUL");
                }
            }
        }
        Expr::Binary {
            operator,
            left,
            right,
        } => gen_binary(compiler, id, *operator, *left, *right)?,
    }

    Ok(())
}

/// Six decimals, unless that would change the value. The fallback is the
/// shortest exact decimal form, which never uses an exponent.
pub fn real_literal(value: f64) -> String {
    let fixed = format!("{:.6}", value);

    if fixed.parse::<f64>() == Ok(value) {
        fixed
    } else {
        value.to_string()
    }
}

/// Pushes the base address and the zero-based offset of `array[index]`,
/// aborting at run time when the index is outside the declared bounds.
pub fn gen_element_address(
    compiler: &mut Compiler,
    array: IdentId,
    index: ExprId,
) -> Result<(), CodegenError> {
    let symbol = compiler.symbol_of(array)?;
    let (begin, end) = compiler.bounds_of(symbol)?;
    let message = format!(
        "array index out of bounds: {}[{}..{}]",
        symbol.name, begin, end
    );

    compiler.push_variable(symbol)?;
    gen_expression(compiler, index)?;

    compiler.emit_guard(
        &[
            String::from("DUP 1"),
            format!("PUSHI {}", begin),
            String::from("INF"),
        ],
        &message,
    );
    compiler.emit_guard(
        &[
            String::from("DUP 1"),
            format!("PUSHI {}", end),
            String::from("SUP"),
        ],
        &message,
    );

    compiler.emit(format!("PUSHI {}", begin));
    compiler.emit("SUB");
    Ok(())
}

/// Calls a user function or procedure. Arguments are pushed right to left;
/// functions get a result slot reserved first, which is left on the stack.
pub fn gen_call(
    compiler: &mut Compiler,
    callee: IdentId,
    arguments: &[ExprId],
) -> Result<(), CodegenError> {
    let symbol = compiler.symbol_of(callee)?;
    let label = symbol.label().ok_or_else(|| CodegenError::NotCallable {
        name: symbol.name.clone(),
    })?;

    if symbol.role == SymbolRole::Func {
        compiler.emit("PUSHN 1");
    }

    for argument in arguments.iter().rev() {
        gen_expression(compiler, *argument)?;
    }

    compiler.emit(format!("PUSHA {}", label));
    compiler.emit("CALL");

    if !arguments.is_empty() {
        compiler.emit(format!("POP {}", arguments.len()));
    }
    Ok(())
}

/// The built-in `write`: prints its single argument.
pub fn gen_write(compiler: &mut Compiler, arguments: &[ExprId]) -> Result<(), CodegenError> {
    for argument in arguments {
        gen_expression(compiler, *argument)?;

        match compiler.kind_of(*argument) {
            Kind::Real => compiler.emit("WRITEF"),
            _ => compiler.emit("WRITEI"),
        }
    }
    Ok(())
}

fn gen_binary(
    compiler: &mut Compiler,
    id: ExprId,
    operator: BinaryOperator,
    left: ExprId,
    right: ExprId,
) -> Result<(), CodegenError> {
    match operator {
        BinaryOperator::And => gen_and(compiler, left, right),
        BinaryOperator::Or => {
            gen_expression(compiler, left)?;
            gen_expression(compiler, right)?;
            compiler.emit("ADD");
            compiler.emit("PUSHI 0");
            compiler.emit("SUP");
            Ok(())
        }
        operator if operator.is_comparison() => gen_comparison(compiler, operator, left, right),
        BinaryOperator::Divide => {
            gen_promoted(compiler, left, Kind::Real)?;
            gen_promoted(compiler, right, Kind::Real)?;
            compiler.emit_guard(
                &[
                    String::from("DUP 1"),
                    format!("PUSHF {:.6}", 0.0),
                    String::from("EQUAL"),
                ],
                "division by zero",
            );
            compiler.emit("FDIV");
            Ok(())
        }
        BinaryOperator::IntDivide => {
            gen_expression(compiler, left)?;
            gen_expression(compiler, right)?;
            compiler.emit_guard(
                &[
                    String::from("DUP 1"),
                    String::from("PUSHI 0"),
                    String::from("EQUAL"),
                ],
                "division by zero",
            );
            compiler.emit("DIV");
            Ok(())
        }
        _ => {
            let result = compiler.kind_of(id);
            gen_promoted(compiler, left, result)?;
            gen_promoted(compiler, right, result)?;

            let real = result == Kind::Real;
            let instruction = match operator {
                BinaryOperator::Add if real => "FADD",
                BinaryOperator::Add => "ADD",
                BinaryOperator::Subtract if real => "FSUB",
                BinaryOperator::Subtract => "SUB",
                BinaryOperator::Multiply if real => "FMUL",
                _ => "MUL",
            };
            compiler.emit(instruction);
            Ok(())
        }
    }
}

/// Evaluates `id`, converting an integer result when `kind` is real.
fn gen_promoted(compiler: &mut Compiler, id: ExprId, kind: Kind) -> Result<(), CodegenError> {
    gen_expression(compiler, id)?;

    if kind == Kind::Real && compiler.kind_of(id) == Kind::Int {
        compiler.emit("ITOF");
    }
    Ok(())
}

/// `left and right`, skipping `right` when `left` is false.
fn gen_and(compiler: &mut Compiler, left: ExprId, right: ExprId) -> Result<(), CodegenError> {
    let false_path = compiler.new_label();
    let end = compiler.new_label();

    gen_expression(compiler, left)?;
    compiler.emit(format!("JZ {}", false_path));
    gen_expression(compiler, right)?;
    compiler.emit(format!("JZ {}", false_path));
    compiler.emit("PUSHI 1");
    compiler.emit(format!("JUMP {}", end));
    compiler.emit_label(&false_path);
    compiler.emit("PUSHI 0");
    compiler.emit_label(&end);
    Ok(())
}

fn gen_comparison(
    compiler: &mut Compiler,
    operator: BinaryOperator,
    left: ExprId,
    right: ExprId,
) -> Result<(), CodegenError> {
    let left_kind = compiler.kind_of(left);
    let right_kind = compiler.kind_of(right);

    gen_expression(compiler, left)?;
    gen_expression(compiler, right)?;

    match (left_kind, right_kind) {
        (Kind::Int, Kind::Real) => {
            compiler.emit("SWAP");
            compiler.emit("ITOF");
            compiler.emit("SWAP");
        }
        (Kind::Real, Kind::Int) => compiler.emit("ITOF"),
        _ => {}
    }

    let real = left_kind == Kind::Real || right_kind == Kind::Real;
    match operator {
        BinaryOperator::Equals => compiler.emit("EQUAL"),
        BinaryOperator::NotEquals => {
            compiler.emit("EQUAL");
            compiler.emit("NOT");
        }
        BinaryOperator::Greater if real => compiler.emit("FSUP"),
        BinaryOperator::Greater => compiler.emit("SUP"),
        BinaryOperator::Less if real => compiler.emit("FINF"),
        BinaryOperator::Less => compiler.emit("INF"),
        BinaryOperator::GreaterEquals if real => compiler.emit("FSUPEQ"),
        BinaryOperator::GreaterEquals => compiler.emit("SUPEQ"),
        BinaryOperator::LessEquals if real => compiler.emit("FINFEQ"),
        _ => compiler.emit("INFEQ"),
    }
    Ok(())
}
