//! Parser building the syntax tree of one program.
//!
//! Expressions use a Pratt parser: NUD (null denotation) handlers for prefix
//! positions and LED (left denotation) handlers for infix operators, each
//! registered with a binding power. Statements are dispatched on their first
//! token through a third lookup table. Declarations (program header, `var`
//! sections, subprograms, types) are parsed by plain recursive descent.
//!
//! Every node is allocated in the [`Arena`](crate::ast::ast::Arena) owned by
//! the parser and handed over inside the resulting [`Ast`](crate::ast::ast::Ast).
//! The first syntax error aborts parsing.

pub mod decl;
pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;
