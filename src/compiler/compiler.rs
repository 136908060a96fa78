//! Code generator state and program layout.
//!
//! The generated text starts with `START`, reserves and initializes global
//! storage, runs the main body and ends it with `STOP`. Subprogram bodies
//! follow, each behind its `f<signature>:` or `p<signature>:` entry label and
//! ending in `RETURN`.

use std::fmt::Display;

use thiserror::Error;

use crate::{
    ast::{
        ast::{Ast, ExprId, IdentId, SubprogramDecl, VarDecl},
        types::Kind,
    },
    type_checker::scope::{ScopeManager, Symbol, SymbolRole},
};

use super::stmt::gen_statement;

/// Raised when the tree handed to the generator was not fully resolved. A
/// program that type checked without errors never produces one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodegenError {
    #[error("identifier '{name}' was never resolved to a symbol")]
    UnresolvedSymbol { name: String },
    #[error("'{name}' cannot be used as a variable")]
    NotAVariable { name: String },
    #[error("'{name}' has no entry label")]
    NotCallable { name: String },
    #[error("array '{name}' has no recorded bounds")]
    MissingBounds { name: String },
    #[error("array '{name}' has more elements than can be allocated")]
    ArrayTooLarge { name: String },
}

pub struct Compiler<'a> {
    pub ast: &'a Ast,
    pub scopes: &'a ScopeManager,
    out: String,
    label_counter: u32,
}

impl<'a> Compiler<'a> {
    pub fn new(ast: &'a Ast, scopes: &'a ScopeManager) -> Self {
        Compiler {
            ast,
            scopes,
            out: String::new(),
            label_counter: 0,
        }
    }

    /// Appends one indented instruction line.
    pub fn emit(&mut self, instruction: impl Display) {
        self.out.push_str(&format!("    {}\n", instruction));
    }

    /// Appends a flush-left label line.
    pub fn emit_label(&mut self, label: &str) {
        self.out.push_str(&format!("{}:\n", label));
    }

    /// A label unique across the whole program.
    pub fn new_label(&mut self) -> String {
        let label = format!("L{}", self.label_counter);
        self.label_counter += 1;
        label
    }

    /// `ERR "message"` followed by `STOP`.
    pub fn emit_abort(&mut self, message: &str) {
        self.emit(format!("ERR \"{}\"", message));
        self.emit("STOP");
    }

    /// Aborts unless the condition computed by `test` is false. The
    /// instructions in `test` must leave exactly one value on the stack.
    pub fn emit_guard(&mut self, test: &[String], message: &str) {
        let ok = self.new_label();

        for instruction in test {
            self.emit(instruction);
        }
        self.emit(format!("JZ {}", ok));
        self.emit_abort(message);
        self.emit_label(&ok);
    }

    pub fn kind_of(&self, id: ExprId) -> Kind {
        self.ast.kind_of(id)
    }

    pub fn ident_name(&self, id: IdentId) -> &'a str {
        &self.ast.ident(id).name
    }

    /// The symbol the type checker linked to `id`.
    pub fn symbol_of(&self, id: IdentId) -> Result<&'a Symbol, CodegenError> {
        self.ast
            .ident(id)
            .symbol
            .and_then(|symbol| self.scopes.symbol(symbol))
            .ok_or_else(|| CodegenError::UnresolvedSymbol {
                name: self.ident_name(id).to_string(),
            })
    }

    /// `PUSHG` or `PUSHL` of a variable's slot.
    pub fn push_variable(&mut self, symbol: &Symbol) -> Result<(), CodegenError> {
        match symbol.role {
            SymbolRole::Global => self.emit(format!("PUSHG {}", symbol.offset)),
            SymbolRole::Local | SymbolRole::Param => self.emit(format!("PUSHL {}", symbol.offset)),
            SymbolRole::Func | SymbolRole::Proc => {
                return Err(CodegenError::NotAVariable {
                    name: symbol.name.clone(),
                })
            }
        }
        Ok(())
    }

    /// `STOREG` or `STOREL` into a variable's slot.
    pub fn store_variable(&mut self, symbol: &Symbol) -> Result<(), CodegenError> {
        match symbol.role {
            SymbolRole::Global => self.emit(format!("STOREG {}", symbol.offset)),
            SymbolRole::Local | SymbolRole::Param => {
                self.emit(format!("STOREL {}", symbol.offset))
            }
            SymbolRole::Func | SymbolRole::Proc => {
                return Err(CodegenError::NotAVariable {
                    name: symbol.name.clone(),
                })
            }
        }
        Ok(())
    }

    pub fn bounds_of(&self, symbol: &Symbol) -> Result<(i64, i64), CodegenError> {
        symbol.bounds.ok_or_else(|| CodegenError::MissingBounds {
            name: symbol.name.clone(),
        })
    }

    /// Allocates heap storage for every array in `declarations` and stores
    /// its base address in the array's own slot.
    pub fn allocate_arrays(&mut self, declarations: &[VarDecl]) -> Result<(), CodegenError> {
        for declaration in declarations {
            if declaration.ty.bounds().is_none() {
                continue;
            }

            for name in &declaration.names {
                let symbol = self.symbol_of(*name)?;
                let count = declaration.ty.element_count().ok_or_else(|| {
                    CodegenError::ArrayTooLarge {
                        name: symbol.name.clone(),
                    }
                })?;
                self.emit(format!("PUSHI {}", count));
                self.emit("ALLOCN");
                self.store_variable(symbol)?;
            }
        }
        Ok(())
    }

    /// Consumes the generator, returning the generated text.
    pub fn finish(self) -> String {
        self.out
    }
}

/// Generates VM assembly for a program that type checked without errors.
pub fn compile(ast: &Ast, scopes: &ScopeManager) -> Result<String, CodegenError> {
    let mut compiler = Compiler::new(ast, scopes);
    let program = &ast.program;

    compiler.emit("START");
    let globals = program.global_count();
    if globals > 0 {
        compiler.emit(format!("PUSHN {}", globals));
    }
    compiler.allocate_arrays(&program.globals)?;

    gen_statement(&mut compiler, program.body)?;
    compiler.emit("STOP");

    for subprogram in &program.subprograms {
        gen_subprogram(&mut compiler, subprogram)?;
    }

    log::debug!(
        "generated {} lines of VM code",
        compiler.out.lines().count()
    );

    Ok(compiler.finish())
}

pub fn gen_subprogram(compiler: &mut Compiler, decl: &SubprogramDecl) -> Result<(), CodegenError> {
    let symbol = compiler.symbol_of(decl.name)?;
    let label = symbol.label().ok_or_else(|| CodegenError::NotCallable {
        name: symbol.name.clone(),
    })?;
    log::debug!("generating {}", label);

    compiler.emit_label(&label);

    let locals = decl.local_count();
    if locals > 0 {
        compiler.emit(format!("PUSHN {}", locals));
    }
    compiler.allocate_arrays(&decl.locals)?;

    gen_statement(compiler, decl.body)?;
    compiler.emit("RETURN");

    Ok(())
}
