/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: the node arena, node ids and program/declaration structure
/// - expressions: expression node variants and operators
/// - statements: statement node variants
/// - types: the kind model (`Kind`), declared types and callable signatures
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
