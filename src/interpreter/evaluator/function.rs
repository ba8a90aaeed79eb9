/// Call dispatch and builtin registration.
///
/// Resolves operators and function values, binds arguments through the
/// first matching signature and runs the body in an activation namespace.
/// Also holds the table of builtin functions.
pub mod core;

/// Builtins that inspect values: `typeof` and `len`.
pub mod builtin;

/// Builtins that talk to the outside world: `print` and `read`.
pub mod print;
