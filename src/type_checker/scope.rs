//! Lexical scopes and the symbols they own.
//!
//! Scopes form a tree stored in an arena: the root (global) scope is always
//! `ScopeId(0)` and every callable body gets a child of the scope it was
//! declared in. Symbols are owned here and referred to from the tree by
//! [`SymbolId`].
//!
//! Variables live in role-specific key spaces so a parameter and a local of
//! the same name never collide inside one scope. Callables are not lexically
//! scoped: they are always registered in the root under their signature
//! encoding, which is what makes program-wide overloading work.

use std::collections::HashMap;

use crate::{
    ast::types::{Kind, Signature, TypeSpec},
    errors::diagnostics::{Diagnostics, SemanticError},
    Position,
};

/// Name of the built-in output procedure.
pub const WRITE: &str = "write";

/// Scalar kinds `write` is overloaded for.
pub const WRITE_KINDS: [Kind; 3] = [Kind::Int, Kind::Real, Kind::Bool];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolRole {
    Param,
    Global,
    Local,
    Func,
    Proc,
}

impl SymbolRole {
    pub fn is_callable(self) -> bool {
        matches!(self, SymbolRole::Func | SymbolRole::Proc)
    }

    /// Prefix of the entry label of a callable with this role.
    pub fn label_prefix(self) -> &'static str {
        match self {
            SymbolRole::Func => "f",
            _ => "p",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SymbolKey {
    Param(String),
    Local(String),
    Global(String),
    /// Role prefix plus signature encoding, e.g. `pwrite@Int`.
    Callable(String),
}

impl SymbolKey {
    fn callable(role: SymbolRole, encoding: &str) -> SymbolKey {
        SymbolKey::Callable(format!("{}{}", role.label_prefix(), encoding))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub role: SymbolRole,
    /// Variable kind, or the return kind of a callable.
    pub data_kind: Kind,
    /// Frame offset; meaningful for `Param`, `Global` and `Local` only.
    pub offset: i32,
    /// Present for `Func` and `Proc` only.
    pub signature: Option<Signature>,
    /// Declared bounds of array variables.
    pub bounds: Option<(i64, i64)>,
    pub position: Position,
    /// Pre-registered by the compiler rather than declared in source.
    pub builtin: bool,
}

impl Symbol {
    /// Entry label of a callable, e.g. `fmax@Int,Int`.
    pub fn label(&self) -> Option<String> {
        self.signature
            .as_ref()
            .map(|signature| format!("{}{}", self.role.label_prefix(), signature.encode()))
    }

    pub fn param_count(&self) -> usize {
        self.signature
            .as_ref()
            .map(Signature::param_count)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
    table: HashMap<SymbolKey, SymbolId>,
    local_counter: i32,
    param_counter: i32,
}

impl Scope {
    fn new(parent: Option<ScopeId>) -> Self {
        Scope {
            parent,
            children: vec![],
            table: HashMap::new(),
            local_counter: 0,
            param_counter: -1,
        }
    }

    /// Number of slots handed out to locals (or globals, for the root).
    pub fn local_slots(&self) -> i32 {
        self.local_counter
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Owner of every scope and symbol of one compilation.
#[derive(Debug, Clone)]
pub struct ScopeManager {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    current: ScopeId,
}

impl Default for ScopeManager {
    fn default() -> Self {
        ScopeManager::new()
    }
}

impl ScopeManager {
    pub const ROOT: ScopeId = ScopeId(0);

    /// A manager holding only an empty root scope.
    pub fn new() -> Self {
        ScopeManager {
            scopes: vec![Scope::new(None)],
            symbols: vec![],
            current: ScopeManager::ROOT,
        }
    }

    /// A manager whose root already holds the `write` overloads.
    pub fn with_builtins() -> Self {
        let mut manager = ScopeManager::new();
        let mut diagnostics = Diagnostics::new();

        for kind in WRITE_KINDS {
            let id = manager.declare_callable(
                SymbolRole::Proc,
                Signature::new(WRITE, vec![kind], Kind::Void),
                Position::null(),
                &mut diagnostics,
            );
            if let Some(id) = id {
                manager.symbols[id.0 as usize].builtin = true;
            }
        }

        manager
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.0 as usize]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(index, symbol)| (SymbolId(index as u32), symbol))
    }

    /// Opens a child of the current scope and makes it current.
    pub fn enter_scope(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        let parent = self.current;

        self.scopes.push(Scope::new(Some(parent)));
        self.scope_mut(parent).children.push(id);
        self.current = id;

        log::trace!("entered scope {:?} (parent {:?})", id, parent);
        id
    }

    /// Makes the parent of the current scope current again. The closed scope
    /// and its symbols are kept.
    pub fn exit_scope(&mut self) {
        let parent = self.scope(self.current).parent;
        if let Some(parent) = parent {
            log::trace!("left scope {:?}", self.current);
            self.current = parent;
        }
    }

    fn push_symbol(&mut self, scope: ScopeId, key: SymbolKey, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        log::trace!(
            "declared {:?} '{}' ({}) at offset {} in scope {:?}",
            symbol.role,
            symbol.name,
            symbol.data_kind,
            symbol.offset,
            scope
        );

        self.symbols.push(symbol);
        self.scope_mut(scope).table.insert(key, id);
        id
    }

    /// Declares a parameter, global or local in the current scope.
    ///
    /// Only the current scope is searched for a clash. On a clash the first
    /// declaration wins, a redefinition error is recorded and no offset is
    /// consumed.
    pub fn declare_variable(
        &mut self,
        name: &str,
        role: SymbolRole,
        ty: &TypeSpec,
        position: Position,
        diagnostics: &mut Diagnostics,
    ) -> Option<SymbolId> {
        let key = match role {
            SymbolRole::Param => SymbolKey::Param(name.to_string()),
            SymbolRole::Local => SymbolKey::Local(name.to_string()),
            SymbolRole::Global => SymbolKey::Global(name.to_string()),
            SymbolRole::Func | SymbolRole::Proc => {
                log::warn!("'{}' declared as a variable with role {:?}", name, role);
                return None;
            }
        };

        if self.scope(self.current).table.contains_key(&key) {
            diagnostics.error(
                SemanticError::VariableRedefinition {
                    name: name.to_string(),
                },
                position,
            );
            return None;
        }

        let offset = match role {
            SymbolRole::Param => {
                let scope = self.scope_mut(self.current);
                let offset = scope.param_counter;
                scope.param_counter -= 1;
                offset
            }
            SymbolRole::Global => {
                let root = self.scope_mut(ScopeManager::ROOT);
                let offset = root.local_counter;
                root.local_counter += 1;
                offset
            }
            _ => {
                let scope = self.scope_mut(self.current);
                let offset = scope.local_counter;
                scope.local_counter += 1;
                offset
            }
        };

        let symbol = Symbol {
            name: name.to_string(),
            role,
            data_kind: ty.kind(),
            offset,
            signature: None,
            bounds: ty.bounds(),
            position,
            builtin: false,
        };

        Some(self.push_symbol(self.current, key, symbol))
    }

    /// Registers a function or procedure in the root scope under its
    /// signature encoding.
    pub fn declare_callable(
        &mut self,
        role: SymbolRole,
        signature: Signature,
        position: Position,
        diagnostics: &mut Diagnostics,
    ) -> Option<SymbolId> {
        let encoding = signature.encode();
        let key = SymbolKey::callable(role, &encoding);

        if self.scope(ScopeManager::ROOT).table.contains_key(&key) {
            let error = match role {
                SymbolRole::Func => SemanticError::FunctionRedefinition { name: encoding },
                _ => SemanticError::ProcedureRedefinition { name: encoding },
            };
            diagnostics.error(error, position);
            return None;
        }

        let symbol = Symbol {
            name: signature.name.clone(),
            role,
            data_kind: signature.return_kind,
            offset: 0,
            signature: Some(signature),
            bounds: None,
            position,
            builtin: false,
        };

        Some(self.push_symbol(ScopeManager::ROOT, key, symbol))
    }

    /// Resolves a variable without recording anything on a miss.
    pub fn find_variable(&self, name: &str) -> Option<SymbolId> {
        let local = SymbolKey::Local(name.to_string());
        let param = SymbolKey::Param(name.to_string());

        let mut scope = Some(self.current);
        while let Some(id) = scope {
            let table = &self.scope(id).table;

            if let Some(symbol) = table.get(&local).or_else(|| table.get(&param)) {
                return Some(*symbol);
            }

            scope = self.scope(id).parent;
        }

        self.scope(ScopeManager::ROOT)
            .table
            .get(&SymbolKey::Global(name.to_string()))
            .copied()
    }

    /// Resolves a variable: locals then parameters of the current scope and
    /// of each ancestor, then globals. Records an error on a miss.
    pub fn lookup_variable(
        &self,
        name: &str,
        position: Position,
        diagnostics: &mut Diagnostics,
    ) -> Option<SymbolId> {
        let found = self.find_variable(name);

        if found.is_none() {
            diagnostics.error(
                SemanticError::UndeclaredVariable {
                    name: name.to_string(),
                },
                position,
            );
        }

        found
    }

    /// Resolves a callable by exact signature without recording anything on
    /// a miss.
    pub fn find_callable(&self, name: &str, role: SymbolRole, param_kinds: &[Kind]) -> Option<SymbolId> {
        let encoding = Signature::encode_parts(name, param_kinds);

        self.scope(ScopeManager::ROOT)
            .table
            .get(&SymbolKey::callable(role, &encoding))
            .copied()
    }

    /// Whether some callable of `role` named `name` takes `param_kinds.len()`
    /// parameters matching every non-`Void` entry of `param_kinds`.
    pub fn has_callable_like(&self, name: &str, role: SymbolRole, param_kinds: &[Kind]) -> bool {
        self.symbols.iter().any(|symbol| {
            let Some(signature) = symbol.signature.as_ref() else {
                return false;
            };

            symbol.role == role
                && signature.name == name
                && signature.param_count() == param_kinds.len()
                && signature
                    .param_kinds
                    .iter()
                    .zip(param_kinds)
                    .all(|(declared, given)| given.is_void() || declared == given)
        })
    }

    /// Resolves a callable by exact signature. Records an error naming the
    /// attempted signature on a miss.
    ///
    /// A `Void` parameter kind stands for an argument that was already
    /// reported. Such a call never resolves, but the error is only recorded
    /// when no callable of the same name and arity could have matched.
    pub fn lookup_callable(
        &self,
        name: &str,
        role: SymbolRole,
        param_kinds: &[Kind],
        position: Position,
        diagnostics: &mut Diagnostics,
    ) -> Option<SymbolId> {
        if param_kinds.iter().any(|kind| kind.is_void()) {
            if !self.has_callable_like(name, role, param_kinds) {
                self.report_undeclared_callable(name, role, param_kinds, position, diagnostics);
            }
            return None;
        }

        let found = self.find_callable(name, role, param_kinds);

        if found.is_none() {
            self.report_undeclared_callable(name, role, param_kinds, position, diagnostics);
        }

        found
    }

    fn report_undeclared_callable(
        &self,
        name: &str,
        role: SymbolRole,
        param_kinds: &[Kind],
        position: Position,
        diagnostics: &mut Diagnostics,
    ) {
        let signature = Signature::encode_parts(name, param_kinds);
        let error = match role {
            SymbolRole::Func => SemanticError::UndeclaredFunction { signature },
            _ => SemanticError::UndeclaredProcedure { signature },
        };
        diagnostics.error(error, position);
    }
}
