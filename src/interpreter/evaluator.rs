/// Core evaluation logic and context management.
///
/// Contains the runtime `Context`, the control-flow `Behavior` signal and the
/// dispatch over AST node variants.
pub mod core;

/// Evaluation of control flow.
///
/// Sequences, branches, loops, matches and controllers. These nodes are the
/// only consumers of the behavior state set by `return`, `break`, `continue`
/// and `fallthrough`.
pub mod control;

/// Declarations and assignments.
///
/// Binds evaluated values to names in the current namespace or updates the
/// namespace that owns them.
pub mod statement;

/// Function and operator calls.
///
/// Signature dispatch, activation namespaces and the builtin function table.
pub mod function;

/// Builtin binary operators.
///
/// Arithmetic, power, comparison and logic operators registered into the
/// builtin namespace.
pub mod binary;

/// Builtin unary operators.
///
/// Negation, identity and logical NOT.
pub mod unary;
