use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary::core::operands,
            core::{Context, EvalResult},
        },
        value::core::{Data, Value},
    },
};

/// `a && b`. Both operands are evaluated before the call.
pub fn and(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    let (a, b) = operands(ctx, line)?;
    Ok(ctx.types.make_bool(a.as_bool(line)? && b.as_bool(line)?))
}

/// `a || b`.
pub fn or(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    let (a, b) = operands(ctx, line)?;
    Ok(ctx.types.make_bool(a.as_bool(line)? || b.as_bool(line)?))
}

/// `a ^| b`, exclusive or.
pub fn xor(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    let (a, b) = operands(ctx, line)?;
    Ok(ctx.types.make_bool(a.as_bool(line)? ^ b.as_bool(line)?))
}

/// `a & b`: bitwise on integers, logical on booleans.
pub fn bit_and(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    bitwise(ctx, line, |x, y| x & y, |x, y| x & y)
}

/// `a | b`: bitwise on integers, logical on booleans.
pub fn bit_or(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    bitwise(ctx, line, |x, y| x | y, |x, y| x | y)
}

fn bitwise(ctx: &Context,
           line: usize,
           on_int: fn(i64, i64) -> i64,
           on_bool: fn(bool, bool) -> bool)
           -> EvalResult<Value> {
    let (a, b) = operands(ctx, line)?;
    match (&a.data, &b.data) {
        (Data::Integer(x), Data::Integer(y)) => Ok(ctx.types.make_int(on_int(*x, *y))),
        (Data::Bool(x), Data::Bool(y)) => Ok(ctx.types.make_bool(on_bool(*x, *y))),
        _ => Err(RuntimeError::TypeMismatch { expected: "two ints or two bools".to_string(),
                                              found: format!("{}, {}", a.type_name(), b.type_name()),
                                              line }),
    }
}
