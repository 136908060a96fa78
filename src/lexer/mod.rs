//! Lexical analysis.
//!
//! Turns source text into a flat list of [`tokens::Token`]s terminated by an
//! `EOF` token. Every token carries its line and column so later stages can
//! report problems where they occur. Whitespace and both comment forms
//! (`{ ... }` and `// ...`) are skipped.

pub mod lexer;
pub mod tokens;
