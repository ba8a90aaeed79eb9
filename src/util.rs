/// Numeric conversion helpers.
///
/// This module provides safe functions for converting between integer and
/// floating-point types without risking silent data loss. The `int` and
/// `float` datatypes use them for their casts, and the power operator uses
/// them to validate exponents.
pub mod num;
