use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary::core::{number, operands},
            core::{Context, EvalResult},
        },
        value::core::{Data, Value},
    },
    util::num::{i64_to_f64_checked, i64_to_u32_checked},
};

/// Evaluates `a ^ b`.
///
/// An integer raised to a non-negative integer stays an integer, with
/// overflow checked. A negative integer exponent and every float operand
/// produce a `float`.
///
/// # Example
/// ```
/// use tealang::interpreter::{evaluator::core::Context, lexer::lex, parser::core::parse};
///
/// let mut context = Context::new();
/// let mut eval = |source: &str| context.eval(&parse(&lex(source)).unwrap()).unwrap().to_string();
///
/// assert_eq!(eval("2 ^ 10;"), "1024");
/// assert_eq!(eval("2 ^ 3 ^ 2;"), "512");
/// assert_eq!(eval("2 ^ -1;"), "0.5");
/// ```
pub fn power(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    let (a, b) = operands(ctx, line)?;

    match (&a.data, &b.data) {
        (Data::Integer(base), Data::Integer(exponent)) if *exponent >= 0 => {
            let exponent = i64_to_u32_checked(*exponent, line)?;
            let result = base.checked_pow(exponent)
                             .ok_or(RuntimeError::Overflow { line })?;
            Ok(ctx.types.make_int(result))
        },
        (Data::Integer(base), Data::Integer(exponent)) => {
            let base = i64_to_f64_checked(*base, line)?;
            let exponent = i64_to_f64_checked(*exponent, line)?;
            Ok(ctx.types.make_float(base.powf(exponent)))
        },
        _ => Ok(ctx.types.make_float(number(&a, line)?.powf(number(&b, line)?))),
    }
}
