//! C source code parser
//!
//! This module transforms C source text into an Abstract Syntax Tree (AST):
//! - [`lexer`]: Tokenization (source text → tokens)
//! - [`parse`]: Parsing (tokens → AST), split over `declarations`,
//!   `statements` and `expressions`
//! - [`ast`]: AST node definitions
//! - [`arrays`]: Per-function array table for static bounds checks
//!
//! # Supported C Subset
//!
//! - Types: `int`, `float`, `char`, `double` (and `void` for return types)
//! - Locals: scalars and fixed-size one-dimensional arrays
//! - Statements: declarations, assignments, `if`/`else if`/`else`, `while`,
//!   `for`, `break`, `continue`, `return`
//! - Expressions: arithmetic, comparison, logical, bitwise, shifts, calls
//! - Preprocessor lines are skipped; globals are skipped with a warning
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent parser with precedence climbing for binary operators.
//! No external parser generator dependencies.

pub mod arrays;
pub mod ast;
mod declarations;
mod expressions;
pub mod lexer;
pub mod parse;
mod printer;
mod statements;

pub use parse::{ParseError, Parser};
