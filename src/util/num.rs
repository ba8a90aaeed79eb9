use crate::{error::RuntimeError, interpreter::evaluator::core::EvalResult};

/// Largest integer magnitude exactly representable as an `f64` (`2^53 - 1`).
pub const MAX_SAFE_U64_INT: u64 = 9_007_199_254_740_991;

/// Safely converts an `i64` to `f64` if and only if it is exactly
/// representable.
///
/// ## Errors
/// Returns `RuntimeError::InvalidCast` if the value exceeds
/// `MAX_SAFE_U64_INT` in absolute value.
///
/// ## Example
/// ```
/// use tealang::util::num::{MAX_SAFE_U64_INT, i64_to_f64_checked};
///
/// assert_eq!(i64_to_f64_checked(42, 1).unwrap(), 42.0);
///
/// let big = MAX_SAFE_U64_INT as i64 + 1;
/// assert!(i64_to_f64_checked(big, 1).is_err());
/// ```
#[allow(clippy::cast_precision_loss)]
pub fn i64_to_f64_checked(value: i64, line: usize) -> EvalResult<f64> {
    if value.unsigned_abs() > MAX_SAFE_U64_INT {
        return Err(RuntimeError::InvalidCast { from: "int".to_string(),
                                               to: "float".to_string(),
                                               details: format!("{value} is not exactly representable"),
                                               line });
    }
    Ok(value as f64)
}

/// Converts an `f64` to `i64`, dropping the fractional part.
///
/// ## Errors
/// Returns `RuntimeError::InvalidCast` for NaN, infinities and values outside
/// the `i64` range.
///
/// ## Example
/// ```
/// use tealang::util::num::f64_to_i64_truncated;
///
/// assert_eq!(f64_to_i64_truncated(3.9, 1).unwrap(), 3);
/// assert_eq!(f64_to_i64_truncated(-2.5, 1).unwrap(), -2);
/// assert!(f64_to_i64_truncated(f64::NAN, 1).is_err());
/// ```
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn f64_to_i64_truncated(value: f64, line: usize) -> EvalResult<i64> {
    let truncated = value.trunc();
    if !truncated.is_finite() || truncated < i64::MIN as f64 || truncated >= i64::MAX as f64 {
        return Err(RuntimeError::InvalidCast { from: "float".to_string(),
                                               to: "int".to_string(),
                                               details: format!("{value} is out of range"),
                                               line });
    }
    Ok(truncated as i64)
}

/// Safely converts an `i64` to `u32`, as needed by integer exponentiation.
///
/// ## Errors
/// Returns `RuntimeError::Overflow` if the value is negative or too large.
///
/// ## Example
/// ```
/// use tealang::util::num::i64_to_u32_checked;
///
/// assert_eq!(i64_to_u32_checked(10, 1).unwrap(), 10);
/// assert!(i64_to_u32_checked(-1, 1).is_err());
/// ```
pub fn i64_to_u32_checked(value: i64, line: usize) -> EvalResult<u32> {
    u32::try_from(value).map_err(|_| RuntimeError::Overflow { line })
}

/// Safely converts a `usize` to `i64`, as needed when reporting lengths.
///
/// ## Errors
/// Returns `RuntimeError::Overflow` if the value does not fit.
pub fn usize_to_i64_checked(value: usize, line: usize) -> EvalResult<i64> {
    i64::try_from(value).map_err(|_| RuntimeError::Overflow { line })
}
