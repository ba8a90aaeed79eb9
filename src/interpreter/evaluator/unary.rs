use tracing::debug;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{Context, EvalResult},
            function::core::{Kind, native_signature},
        },
        value::{
            core::{Data, Value},
            namespace::Namespace,
            types::Types,
        },
    },
};

/// Registers the unary operators.
///
/// They share their symbols with the binary operators; the one-parameter
/// signatures are appended after the binary ones, and arity alone decides
/// which signature binds.
pub fn load(namespace: &mut Namespace, types: &Types) {
    for kind in [Kind::Int, Kind::Float] {
        let signature = native_signature(types, "unary", &[("a", kind)], Some(kind), negate);
        namespace.define_operator("-", signature, None);
        let signature = native_signature(types, "unary", &[("a", kind)], Some(kind), identity);
        namespace.define_operator("+", signature, None);
    }
    let signature = native_signature(types, "unary", &[("a", Kind::Bool)], Some(Kind::Bool), not);
    namespace.define_operator("!", signature, None);

    debug!("registered builtin unary operators");
}

/// Arithmetic negation, `-a`.
///
/// # Errors
/// `Overflow` when negating `i64::MIN`.
pub fn negate(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    let a = ctx.argument("a", line)?.unwrapped();
    match a.data {
        Data::Integer(i) => {
            let negated = i.checked_neg().ok_or(RuntimeError::Overflow { line })?;
            Ok(ctx.types.make_int(negated))
        },
        Data::Float(x) => Ok(ctx.types.make_float(-x.into_inner())),
        _ => Err(RuntimeError::TypeMismatch { expected: "number".to_string(),
                                              found: a.type_name(),
                                              line }),
    }
}

/// Unary plus; returns the operand.
pub fn identity(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    ctx.argument("a", line).map(|a| a.unwrapped())
}

/// Logical negation, `!a`.
pub fn not(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    let a = ctx.argument("a", line)?;
    Ok(ctx.types.make_bool(!a.as_bool(line)?))
}
