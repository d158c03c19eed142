//! # Introduction
//!
//! cvhdl translates functions written in a restricted subset of C into
//! synthesizable VHDL. Each C function becomes one entity with a clock and
//! reset, one input port per parameter and a `result` output, implemented
//! by a single clocked process.
//!
//! ## Translation pipeline
//!
//! ```text
//! Source → Lexer → Parser → AST → Call annotation → Code generation → VHDL
//! ```
//!
//! 1. [`parser`]: tokenises the source and builds an AST. Array bounds
//!    with literal indices and `break`/`continue` placement are checked here.
//! 2. [`codegen::annotate`]: numbers every call, one hardware instance each.
//! 3. [`codegen`]: emits entities and architectures. Scalar locals become
//!    process variables so that statements within one clock edge see each
//!    other's updates.
//! 4. [`driver`]: ties the steps together; [`diagnostics`] formats errors
//!    and warnings for the binary.
//!
//! ## Supported C subset
//!
//! Types: `int`, `float`, `char`, `double`, and `void` returns.
//! Locals: scalars and fixed-size arrays with optional constant initializers.
//! Control flow: `if/else if/else`, `while`, `for`, `break`, `continue`,
//! `return`. Calls to other functions of the same file.
//!
//! ```
//! use cvhdl::codegen::GeneratorOptions;
//!
//! let vhdl = cvhdl::driver::translate(
//!     "int add(int a, int b) { return a + b; }",
//!     &GeneratorOptions::default(),
//! )
//! .unwrap();
//! assert!(vhdl.contains("entity add is"));
//! assert!(vhdl.contains("result <= a + b;"));
//! ```

pub mod cmdline;
pub mod codegen;
pub mod diagnostics;
pub mod driver;
pub mod parser;
