//! # tealang
//!
//! tealang is a small, statically-flavored scripting language with a
//! tree-walking interpreter written in Rust.
//! Programs are lexed, parsed into an AST and evaluated against nested
//! namespaces. Values carry datatypes from a single-rooted hierarchy,
//! functions and operators dispatch over overloaded signatures, and control
//! flow is driven by a behavior flag instead of unwinding.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use tracing::debug;

use crate::{
    error::Error,
    interpreter::{evaluator::core::Context, lexer::lex, parser::core::parse},
};

/// Defines the structure of parsed code.
///
/// This module declares the `Node` enum and the literal, type and parameter
/// types that represent a program as a tree. The AST is built by the parser,
/// read by the evaluator and walked by the graph exporter.
///
/// # Responsibilities
/// - Defines one node variant per language construct.
/// - Attaches line numbers to nodes for error reporting.
/// - Exposes labels, shapes and children of every vertex for rendering.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// Parse errors and runtime errors are separate enums; every variant carries
/// the source line. `Error` unifies both for the public entry points.
pub mod error;
/// Graphviz export of the AST.
pub mod graph;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation and the runtime value
/// model.
///
/// # Responsibilities
/// - Coordinates the lexer, parser, evaluator and value types.
/// - Provides entry points for parsing and evaluating user code.
pub mod interpreter;
/// Interpreter instances, script loading and the interactive shell.
pub mod repl;
/// General utilities for safe numeric conversion.
///
/// Conversions between `i64`, `u32`, `usize` and `f64` that fail instead of
/// silently losing data.
pub mod util;

/// Runs a program in a fresh context.
///
/// The program is parsed completely before anything is evaluated, so a syntax
/// error anywhere means no statement runs.
///
/// # Parameters
/// - `source`: The program text.
/// - `auto_print`: Print the program's final value to stdout unless it is
///   `null`.
///
/// # Errors
/// Returns the first parse or runtime error.
///
/// # Examples
/// ```
/// use tealang::get_result;
///
/// let source = "let result = 2 + 2;";
/// assert!(get_result(source, false).is_ok());
///
/// // 'x' is not defined
/// let source = "let y = x + 1;";
/// assert!(get_result(source, false).is_err());
/// ```
pub fn get_result(source: &str, auto_print: bool) -> Result<(), Error> {
    let mut context = Context::new();
    let program = parse(&lex(source))?;
    debug!("program parsed");

    let value = context.eval(&program)?;
    if auto_print && !value.is_null() {
        println!("{value}");
    }
    Ok(())
}
