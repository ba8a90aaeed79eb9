/// Registration of the builtin binary operators and shared operand helpers.
pub mod core;

/// `+ - * / %` on numbers and `+` on strings.
pub mod scalar;

/// `^` on numbers.
pub mod power;

/// Relational and equality operators.
pub mod comparison;

/// Boolean and bitwise operators.
pub mod logic;
