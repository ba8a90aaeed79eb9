use std::cmp::Ordering;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary::core::{number, operands},
            core::{Context, EvalResult},
        },
        value::core::{Data, Value},
    },
};

/// `a < b`.
pub fn less(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    relation(ctx, line, Ordering::is_lt)
}

/// `a > b`.
pub fn greater(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    relation(ctx, line, Ordering::is_gt)
}

/// `a <= b`.
pub fn less_equal(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    relation(ctx, line, Ordering::is_le)
}

/// `a >= b`.
pub fn greater_equal(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    relation(ctx, line, Ordering::is_ge)
}

/// `a == b`: same unwrapped type and equal payload.
pub fn equal(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    let (a, b) = operands(ctx, line)?;
    Ok(ctx.types.make_bool(a.equal_to(&b)))
}

/// `a != b`.
pub fn not_equal(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    let (a, b) = operands(ctx, line)?;
    Ok(ctx.types.make_bool(!a.equal_to(&b)))
}

/// Orders the bound operands and tests the ordering.
///
/// Integers compare exactly, strings lexicographically; mixed numbers are
/// compared as floats.
///
/// # Errors
/// `TypeMismatch` if a NaN makes the operands unordered.
fn relation(ctx: &Context, line: usize, test: fn(Ordering) -> bool) -> EvalResult<Value> {
    let (a, b) = operands(ctx, line)?;

    let ordering = match (&a.data, &b.data) {
        (Data::Integer(x), Data::Integer(y)) => x.cmp(y),
        (Data::String(x), Data::String(y)) => x.cmp(y),
        _ => number(&a, line)?.partial_cmp(&number(&b, line)?)
                              .ok_or_else(|| RuntimeError::TypeMismatch { expected: "ordered numbers".to_string(),
                                                                         found: "NaN".to_string(),
                                                                         line })?,
    };
    Ok(ctx.types.make_bool(test(ordering)))
}
