use thiserror::Error;

/// Parsing errors.
///
/// Defines all error types that can occur during lexing and parsing of source
/// code. Parse errors include unrecognized input, unexpected tokens, missing
/// operands or operators, unbalanced brackets and malformed statements.
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during evaluation. Runtime
/// errors include unresolved names, failed casts, failed signature matches,
/// mutation of constants and division by zero.
pub mod runtime_error;

pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;

/// Any error surfaced by the public entry points.
///
/// Parse and runtime failures keep their own taxonomies; this enum only
/// carries them to the caller together with file access failures of `load`.
#[derive(Debug, Error)]
pub enum Error {
    /// The program could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The program failed while it was evaluated.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    /// A script file could not be read.
    #[error("Failed to read the input file '{path}': {source}")]
    Io {
        /// The path that was requested.
        path:   String,
        /// The underlying failure.
        #[source]
        source: std::io::Error,
    },
}
