use tracing::debug;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::{
            binary::{comparison, logic, power, scalar},
            core::{Context, EvalResult},
            function::core::{Kind, native_signature},
        },
        value::{
            core::{Data, Value},
            function::NativeFn,
            namespace::Namespace,
            types::Types,
        },
    },
    util::num::i64_to_f64_checked,
};

/// Operand type pairs accepted by the numeric operators, in dispatch order.
const NUMERIC_PAIRS: [(Kind, Kind); 4] = [(Kind::Int, Kind::Int),
                                          (Kind::Float, Kind::Float),
                                          (Kind::Int, Kind::Float),
                                          (Kind::Float, Kind::Int)];

/// Registers `symbol(a: left, b: right)` in the builtin namespace.
fn define(namespace: &mut Namespace,
          types: &Types,
          symbol: &str,
          operands: (Kind, Kind),
          returns: Option<Kind>,
          function: NativeFn) {
    let signature = native_signature(types,
                                     "binary",
                                     &[("a", operands.0), ("b", operands.1)],
                                     returns,
                                     function);
    namespace.define_operator(symbol, signature, None);
}

/// The result kind of arithmetic on two numbers.
const fn promoted(operands: (Kind, Kind)) -> Kind {
    match operands {
        (Kind::Int, Kind::Int) => Kind::Int,
        _ => Kind::Float,
    }
}

/// Registers every builtin binary operator.
///
/// Numeric operators get one signature per operand pair so that mixed
/// `int`/`float` arithmetic promotes to `float`.
pub fn load(namespace: &mut Namespace, types: &Types) {
    let arithmetic: [(&str, NativeFn); 5] = [("+", scalar::add),
                                             ("-", scalar::sub),
                                             ("*", scalar::mul),
                                             ("/", scalar::div),
                                             ("%", scalar::rem)];
    for (symbol, function) in arithmetic {
        for operands in NUMERIC_PAIRS {
            define(namespace, types, symbol, operands, Some(promoted(operands)), function);
        }
    }
    define(namespace,
           types,
           "+",
           (Kind::String, Kind::String),
           Some(Kind::String),
           scalar::concat);

    for operands in NUMERIC_PAIRS {
        define(namespace, types, "^", operands, None, power::power);
    }

    let relational: [(&str, NativeFn); 4] = [("<", comparison::less),
                                             (">", comparison::greater),
                                             ("<=", comparison::less_equal),
                                             (">=", comparison::greater_equal)];
    for (symbol, function) in relational {
        for operands in NUMERIC_PAIRS {
            define(namespace, types, symbol, operands, Some(Kind::Bool), function);
        }
        define(namespace,
               types,
               symbol,
               (Kind::String, Kind::String),
               Some(Kind::Bool),
               function);
    }
    define(namespace, types, "==", (Kind::Any, Kind::Any), Some(Kind::Bool), comparison::equal);
    define(namespace, types, "!=", (Kind::Any, Kind::Any), Some(Kind::Bool), comparison::not_equal);

    let boolean: [(&str, NativeFn); 3] = [("&&", logic::and), ("||", logic::or), ("^|", logic::xor)];
    for (symbol, function) in boolean {
        define(namespace, types, symbol, (Kind::Bool, Kind::Bool), Some(Kind::Bool), function);
    }
    for (symbol, function) in [("&", logic::bit_and as NativeFn), ("|", logic::bit_or)] {
        define(namespace, types, symbol, (Kind::Int, Kind::Int), Some(Kind::Int), function);
        define(namespace, types, symbol, (Kind::Bool, Kind::Bool), Some(Kind::Bool), function);
    }

    debug!("registered builtin binary operators");
}

/// Reads the bound operands `a` and `b` of a binary native.
pub(crate) fn operands(ctx: &Context, line: usize) -> EvalResult<(Value, Value)> {
    Ok((ctx.argument("a", line)?.unwrapped(), ctx.argument("b", line)?.unwrapped()))
}

/// Reads a numeric payload as `f64`.
///
/// # Errors
/// `InvalidCast` for integers that are not exactly representable and
/// `TypeMismatch` for non-numeric values.
pub(crate) fn number(value: &Value, line: usize) -> EvalResult<f64> {
    match value.data {
        Data::Integer(i) => i64_to_f64_checked(i, line),
        Data::Float(x) => Ok(x.into_inner()),
        _ => Err(RuntimeError::TypeMismatch { expected: "number".to_string(),
                                              found: value.type_name(),
                                              line }),
    }
}
