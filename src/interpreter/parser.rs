/// Parser entry points and the token cursor.
///
/// Contains `parse`, the public `parse_term` and `parse_sequence` wrappers,
/// whitespace stripping and the `Cursor` every sub-parser advances.
pub mod core;

/// Expression parsing.
///
/// A shunting-yard parser over operands and an operator stack that handles
/// precedence, unary operators, casts, calls and tuples.
pub mod term;

/// Statement and sequence parsing.
///
/// Dispatches on the leading token of each statement and enforces the `;`
/// terminator.
pub mod statement;

/// `let`/`var` declarations and assignments.
pub mod declaration;

/// Branches, loops and matches.
pub mod block;

/// Function literals, function declarations and operator definitions.
pub mod function;

/// Helpers shared by the sub-parsers.
///
/// Identifier and type expression parsing, term lists, block bodies and
/// string unescaping.
pub mod utils;
