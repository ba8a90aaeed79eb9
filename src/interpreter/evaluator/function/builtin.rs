use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::{Data, Value},
    },
    util::num::usize_to_i64_checked,
};

/// Returns the name of the argument's type.
///
/// The `any<T>` wrapper added by the parameter is removed first, so the
/// reported type is the one the caller passed in; `null` reports `null`.
///
/// # Parameters
/// - `ctx`: The context, with `data` bound in the current namespace.
/// - `line`: Line number of the call.
///
/// # Returns
/// A `string` value such as `int` or `array<float>`.
///
/// # Example
/// ```
/// use tealang::interpreter::{evaluator::core::Context, lexer::lex, parser::core::parse};
///
/// let mut context = Context::new();
/// let ast = parse(&lex("typeof((1.5, 2.5));")).unwrap();
///
/// assert_eq!(context.eval(&ast).unwrap().to_string(), "array<float>");
/// ```
pub fn type_of(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    let data = ctx.argument("data", line)?;
    Ok(ctx.types.make_string(&data.unwrapped().type_name()))
}

/// Returns the number of elements of an array.
///
/// # Parameters
/// - `ctx`: The context, with `items` bound in the current namespace.
/// - `line`: Line number of the call.
///
/// # Returns
/// An `int` value.
pub fn len(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    let items = ctx.argument("items", line)?;
    match &items.data {
        Data::Array(elements) => Ok(ctx.types.make_int(usize_to_i64_checked(elements.len(), line)?)),
        _ => Err(RuntimeError::TypeMismatch { expected: "array".to_string(),
                                              found: items.type_name(),
                                              line }),
    }
}
