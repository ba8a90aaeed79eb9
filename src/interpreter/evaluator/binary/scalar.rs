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

#[derive(Clone, Copy, Debug)]
enum Arithmetic {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// `a + b` on numbers.
pub fn add(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    arithmetic(ctx, Arithmetic::Add, line)
}

/// `a - b` on numbers.
pub fn sub(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    arithmetic(ctx, Arithmetic::Sub, line)
}

/// `a * b` on numbers.
pub fn mul(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    arithmetic(ctx, Arithmetic::Mul, line)
}

/// `a / b` on numbers; integer division truncates.
pub fn div(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    arithmetic(ctx, Arithmetic::Div, line)
}

/// `a % b` on numbers.
pub fn rem(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    arithmetic(ctx, Arithmetic::Rem, line)
}

/// `a + b` on strings.
pub fn concat(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    let (a, b) = operands(ctx, line)?;
    Ok(ctx.types.make_string(&format!("{a}{b}")))
}

/// Evaluates an arithmetic operator on the bound operands.
///
/// Two integers stay integers, with overflow checked. Any float operand
/// promotes both sides to `float`.
///
/// # Errors
/// - `DivisionByZero` for `/` and `%` with a zero divisor.
/// - `Overflow` if an integer result does not fit.
fn arithmetic(ctx: &Context, op: Arithmetic, line: usize) -> EvalResult<Value> {
    let (a, b) = operands(ctx, line)?;

    if let (Data::Integer(x), Data::Integer(y)) = (&a.data, &b.data) {
        return Ok(ctx.types.make_int(integer(op, *x, *y, line)?));
    }

    let (x, y) = (number(&a, line)?, number(&b, line)?);
    let result = match op {
        Arithmetic::Add => x + y,
        Arithmetic::Sub => x - y,
        Arithmetic::Mul => x * y,
        Arithmetic::Div | Arithmetic::Rem if y == 0.0 => {
            return Err(RuntimeError::DivisionByZero { line });
        },
        Arithmetic::Div => x / y,
        Arithmetic::Rem => x % y,
    };
    Ok(ctx.types.make_float(result))
}

fn integer(op: Arithmetic, x: i64, y: i64, line: usize) -> EvalResult<i64> {
    let result = match op {
        Arithmetic::Add => x.checked_add(y),
        Arithmetic::Sub => x.checked_sub(y),
        Arithmetic::Mul => x.checked_mul(y),
        Arithmetic::Div | Arithmetic::Rem if y == 0 => {
            return Err(RuntimeError::DivisionByZero { line });
        },
        Arithmetic::Div => x.checked_div(y),
        Arithmetic::Rem => x.checked_rem(y),
    };
    result.ok_or(RuntimeError::Overflow { line })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_arithmetic_is_checked() {
        assert_eq!(integer(Arithmetic::Div, 7, 2, 1).unwrap(), 3);
        assert_eq!(integer(Arithmetic::Rem, -7, 2, 1).unwrap(), -1);
        assert_eq!(integer(Arithmetic::Add, i64::MAX, 1, 4).unwrap_err(),
                   RuntimeError::Overflow { line: 4 });
        assert_eq!(integer(Arithmetic::Rem, 1, 0, 2).unwrap_err(),
                   RuntimeError::DivisionByZero { line: 2 });
    }
}
