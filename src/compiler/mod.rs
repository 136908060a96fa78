//! Code generation for the stack virtual machine.
//!
//! Runs only on a tree the type checker accepted. It trusts the kind
//! annotations and symbol offsets already in place and never re-derives
//! them: every identifier must carry its symbol link.
//!
//! Output is plain text, one instruction per line, instructions indented
//! and labels flush-left.

pub mod compiler;
pub mod expr;
pub mod stmt;

#[cfg(test)]
mod tests;
