//! Error types and error handling for the compiler.
//!
//! This module defines the error types used throughout the compilation
//! process. It includes:
//!
//! - Syntax errors with source position information, which abort the pipeline
//! - The semantic diagnostic sink (errors and warnings) filled by the type checker
//! - Helpful error messages and suggestions

pub mod diagnostics;
pub mod errors;

#[cfg(test)]
mod tests;
