//! Semantic analysis.
//!
//! A single depth-first walk over the tree that:
//!
//! - declares globals, callables, parameters and locals as it meets them
//! - resolves every identifier and links it to its symbol
//! - annotates every expression with its [`Kind`](crate::ast::types::Kind)
//! - validates statements, including the return-write convention of functions
//!
//! Problems are recorded in a [`Diagnostics`](crate::errors::diagnostics::Diagnostics)
//! sink and never stop the walk. An expression whose kind cannot be determined
//! is annotated `Void`, and no further diagnostic is raised because of it.

pub mod scope;
pub mod type_checker;
