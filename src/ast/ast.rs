use std::ops::{Index, IndexMut};

use crate::{type_checker::scope::SymbolId, Span};

use super::{
    expressions::Expr,
    statements::Stmt,
    types::{Kind, TypeSpec},
};

/// Index of an expression node in the [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub u32);

/// Index of a statement node in the [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StmtId(pub u32);

/// Index of an identifier occurrence in the [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentId(pub u32);

/// An identifier occurrence.
///
/// `symbol` is the back-link filled in by the type checker once the name has
/// been declared or resolved. The symbol itself is owned by the scope manager.
#[derive(Debug, Clone)]
pub struct Ident {
    pub name: String,
    pub span: Span,
    pub symbol: Option<SymbolId>,
}

#[derive(Debug, Clone)]
pub struct ExprNode {
    pub expr: Expr,
    pub span: Span,
    /// Inferred kind, written by the type checker.
    pub kind: Kind,
}

#[derive(Debug, Clone)]
pub struct StmtNode {
    pub stmt: Stmt,
    pub span: Span,
}

/// Owns every node of one program.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    exprs: Vec<ExprNode>,
    stmts: Vec<StmtNode>,
    idents: Vec<Ident>,
}

impl Arena {
    pub fn new() -> Self {
        Arena::default()
    }

    pub fn alloc_expr(&mut self, expr: Expr, span: Span) -> ExprId {
        self.exprs.push(ExprNode {
            expr,
            span,
            kind: Kind::Void,
        });
        ExprId((self.exprs.len() - 1) as u32)
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt, span: Span) -> StmtId {
        self.stmts.push(StmtNode { stmt, span });
        StmtId((self.stmts.len() - 1) as u32)
    }

    pub fn alloc_ident(&mut self, name: String, span: Span) -> IdentId {
        self.idents.push(Ident {
            name,
            span,
            symbol: None,
        });
        IdentId((self.idents.len() - 1) as u32)
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn exprs(&self) -> impl Iterator<Item = (ExprId, &ExprNode)> {
        self.exprs
            .iter()
            .enumerate()
            .map(|(index, node)| (ExprId(index as u32), node))
    }

    pub fn idents(&self) -> impl Iterator<Item = (IdentId, &Ident)> {
        self.idents
            .iter()
            .enumerate()
            .map(|(index, ident)| (IdentId(index as u32), ident))
    }

    /// Clears every annotation so the tree can be checked again from scratch.
    pub fn reset_annotations(&mut self) {
        for node in self.exprs.iter_mut() {
            node.kind = Kind::Void;
        }
        for ident in self.idents.iter_mut() {
            ident.symbol = None;
        }
    }
}

impl Index<ExprId> for Arena {
    type Output = ExprNode;

    fn index(&self, id: ExprId) -> &Self::Output {
        &self.exprs[id.0 as usize]
    }
}

impl IndexMut<ExprId> for Arena {
    fn index_mut(&mut self, id: ExprId) -> &mut Self::Output {
        &mut self.exprs[id.0 as usize]
    }
}

impl Index<StmtId> for Arena {
    type Output = StmtNode;

    fn index(&self, id: StmtId) -> &Self::Output {
        &self.stmts[id.0 as usize]
    }
}

impl IndexMut<StmtId> for Arena {
    fn index_mut(&mut self, id: StmtId) -> &mut Self::Output {
        &mut self.stmts[id.0 as usize]
    }
}

impl Index<IdentId> for Arena {
    type Output = Ident;

    fn index(&self, id: IdentId) -> &Self::Output {
        &self.idents[id.0 as usize]
    }
}

impl IndexMut<IdentId> for Arena {
    fn index_mut(&mut self, id: IdentId) -> &mut Self::Output {
        &mut self.idents[id.0 as usize]
    }
}

/// `a, b, c: type` in a `var` section or a parameter list.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub names: Vec<IdentId>,
    pub ty: TypeSpec,
    pub span: Span,
}

/// Whether a subprogram returns a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubprogramKind {
    Function { return_kind: Kind },
    Procedure,
}

/// A function or procedure declaration with its body.
#[derive(Debug, Clone)]
pub struct SubprogramDecl {
    pub name: IdentId,
    pub kind: SubprogramKind,
    pub params: Vec<VarDecl>,
    pub locals: Vec<VarDecl>,
    /// Always a `Stmt::Compound`.
    pub body: StmtId,
    pub span: Span,
}

impl SubprogramDecl {
    pub fn is_function(&self) -> bool {
        matches!(self.kind, SubprogramKind::Function { .. })
    }

    pub fn return_kind(&self) -> Kind {
        match self.kind {
            SubprogramKind::Function { return_kind } => return_kind,
            SubprogramKind::Procedure => Kind::Void,
        }
    }

    pub fn param_count(&self) -> usize {
        self.params.iter().map(|decl| decl.names.len()).sum()
    }

    pub fn local_count(&self) -> usize {
        self.locals.iter().map(|decl| decl.names.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct Program {
    pub name: IdentId,
    pub globals: Vec<VarDecl>,
    pub subprograms: Vec<SubprogramDecl>,
    /// Always a `Stmt::Compound`.
    pub body: StmtId,
    pub span: Span,
}

impl Program {
    pub fn global_count(&self) -> usize {
        self.globals.iter().map(|decl| decl.names.len()).sum()
    }
}

/// A parsed program and the arena holding its nodes.
#[derive(Debug, Clone)]
pub struct Ast {
    pub program: Program,
    pub arena: Arena,
}

impl Ast {
    pub fn expr(&self, id: ExprId) -> &ExprNode {
        &self.arena[id]
    }

    pub fn stmt(&self, id: StmtId) -> &StmtNode {
        &self.arena[id]
    }

    pub fn ident(&self, id: IdentId) -> &Ident {
        &self.arena[id]
    }

    /// The annotated kind of an expression.
    pub fn kind_of(&self, id: ExprId) -> Kind {
        self.arena[id].kind
    }
}
