use std::rc::Rc;

use tracing::{debug, error, trace};

use crate::{
    ast::Node,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            core::{Behavior, Context, EvalResult},
            function::{builtin, print},
        },
        value::{
            core::{Data, Value},
            datatype::{DatatypeRef, Typeflag},
            function::{Function, NativeFn, Signature},
            namespace::{Item, Namespace, SearchSpace, unknown},
            types::Types,
        },
    },
};

/// Deepest nesting of function and operator calls.
pub const MAX_CALL_DEPTH: usize = 5_000;

/// Remaining native stack that triggers growth before a call body runs.
const STACK_RED_ZONE: usize = 256 * 1024;
/// Size of each newly allocated stack segment.
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// A builtin datatype named by a registration table.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Kind {
    Any,
    Int,
    Float,
    String,
    Bool,
    Array,
}

impl Kind {
    pub(crate) const fn resolve(self, types: &Types) -> &DatatypeRef {
        match self {
            Self::Any => &types.any,
            Self::Int => &types.int,
            Self::Float => &types.float,
            Self::String => &types.string,
            Self::Bool => &types.boolean,
            Self::Array => &types.array,
        }
    }
}

/// Builds a signature whose body is a native function.
pub(crate) fn native_signature(types: &Types,
                               name: &'static str,
                               parameters: &[(&str, Kind)],
                               returns: Option<Kind>,
                               function: NativeFn)
                               -> Signature {
    let parameters = parameters.iter()
                               .map(|(alias, kind)| types.parameter(alias, kind.resolve(types)))
                               .collect();
    Signature { parameters,
                body: Rc::new(Node::Adapter { name, function }),
                returns: returns.map(|kind| Typeflag::new(kind.resolve(types).clone())) }
}

/// Defines builtin functions by generating a lookup table and a name list.
///
/// Each entry provides:
/// - a string name,
/// - the parameter names and kinds,
/// - the declared return kind,
/// - a function pointer implementing the builtin.
///
/// Consecutive entries with the same name become the signatures of one
/// function, tried in table order.
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                parameters: $parameters:expr,
                returns: $returns:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        struct BuiltinDef {
            name:       &'static str,
            parameters: &'static [(&'static str, Kind)],
            returns:    Option<Kind>,
            func:       NativeFn,
        }
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name, parameters: $parameters, returns: $returns, func: $func },
            )*
        ];
        /// Names of every builtin function, in table order.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    "print"  => { parameters: &[("text", Kind::Any)], returns: None, func: print::print },
    "print"  => { parameters: &[], returns: None, func: print::print },
    "read"   => { parameters: &[("text", Kind::String)], returns: Some(Kind::String), func: print::read },
    "read"   => { parameters: &[], returns: Some(Kind::String), func: print::read },
    "typeof" => { parameters: &[("data", Kind::Any)], returns: Some(Kind::String), func: builtin::type_of },
    "len"    => { parameters: &[("items", Kind::Array)], returns: Some(Kind::Int), func: builtin::len },
}

/// Registers every builtin function as a constant `func` value.
pub fn load(namespace: &mut Namespace, types: &Types) {
    let mut functions: Vec<(&'static str, Vec<Signature>)> = Vec::new();
    for def in BUILTIN_TABLE {
        let signature = native_signature(types, def.name, def.parameters, def.returns, def.func);
        match functions.last_mut() {
            Some((name, signatures)) if *name == def.name => signatures.push(signature),
            _ => functions.push((def.name, vec![signature])),
        }
    }

    for (name, signatures) in functions {
        let function = Function { signatures,
                                  source: None };
        let value = types.make_function(function)
                         .renamed(name)
                         .with_constant(true);
        if let Err(e) = namespace.store(Item::Value(value), 0) {
            error!("failed to register builtin {name}: {e}");
        }
    }
    debug!("registered builtin functions {:?}", BUILTIN_FUNCTIONS);
}

impl Context {
    /// Evaluates an operator application.
    ///
    /// Every operator stored under the symbol is collected, nearest namespace
    /// first; the arguments are evaluated once and offered to each operator's
    /// signatures in turn.
    pub(crate) fn eval_operation(&mut self, symbol: &str, arguments: &[Node], line: usize) -> EvalResult<Value> {
        let arguments = self.eval_all(arguments)?;
        self.apply_operator(symbol, arguments, line)
    }

    /// Applies an operator to already evaluated arguments.
    ///
    /// # Errors
    /// - `UnknownOperator` if no namespace defines the symbol.
    /// - `NoMatchingSignature` if no signature accepts the arguments.
    /// - Any error raised by the selected body.
    pub fn apply_operator(&mut self, symbol: &str, arguments: Vec<Value>, line: usize) -> EvalResult<Value> {
        let operators = self.namespace.borrow().find_operators(symbol);
        if operators.is_empty() {
            return Err(unknown(SearchSpace::Operator, symbol.to_string(), line));
        }

        for operator in &operators {
            if let Some(result) = self.call(&operator.function, &arguments, line)? {
                return Ok(result);
            }
        }
        Err(no_match(symbol, &arguments, line))
    }

    /// Evaluates a call of a function value.
    ///
    /// # Errors
    /// - `UnknownIdentifier` if the name is not bound.
    /// - `NotCallable` if the bound value is not a function.
    /// - `NoMatchingSignature` if no signature accepts the arguments.
    pub(crate) fn eval_function_call(&mut self, name: &str, arguments: &[Node], line: usize) -> EvalResult<Value> {
        let callee = self.eval(&Node::Identifier { name: name.to_string(),
                                                   line })?;
        let Data::Function(function) = &callee.data else {
            return Err(RuntimeError::NotCallable { name: name.to_string(),
                                                   found: callee.type_name(),
                                                   line });
        };
        let function = function.clone();

        let arguments = self.eval_all(arguments)?;
        match self.call(&function, &arguments, line)? {
            Some(result) => Ok(result),
            None => Err(no_match(name, &arguments, line)),
        }
    }

    /// Calls the first signature of `function` that accepts `arguments`.
    ///
    /// The body runs in a fresh namespace whose parent is the function's
    /// captured namespace and which holds the bound parameters. Behavior is
    /// reset afterwards, so a `return` never leaks out of the call.
    ///
    /// # Returns
    /// `None` if no signature accepts the arguments, otherwise the result.
    ///
    /// Nested calls deeper than `MAX_CALL_DEPTH` fail; the native stack
    /// grows on the heap as calls nest, so the limit is reached before it
    /// runs out.
    ///
    /// # Errors
    /// Errors of the body, `RecursionLimit` past the maximum depth, and
    /// `ReturnTypeMismatch` if the result is not a kind of the declared
    /// return type.
    pub fn call(&mut self, function: &Function, arguments: &[Value], line: usize) -> EvalResult<Option<Value>> {
        for (index, signature) in function.signatures.iter().enumerate() {
            let bound = match signature.bind(arguments, line) {
                Ok(bound) => bound,
                Err(mismatch) => {
                    trace!(index, %mismatch, "signature skipped");
                    continue;
                },
            };
            trace!(index, "signature selected");

            let activation = Namespace::new_ref(function.source.clone());
            {
                let mut namespace = activation.borrow_mut();
                for value in bound {
                    namespace.store(Item::Value(value), line)?;
                }
            }

            if self.call_depth >= MAX_CALL_DEPTH {
                return Err(RuntimeError::RecursionLimit { limit: MAX_CALL_DEPTH,
                                                          line });
            }
            self.call_depth += 1;
            let caller_line = std::mem::replace(&mut self.call_line, line);
            let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
                self.substitute(activation, |ctx| ctx.eval(&signature.body))
            });
            self.call_line = caller_line;
            self.call_depth -= 1;
            self.behavior = Behavior::Default;
            let result = result?;

            if let Some(returns) = &signature.returns {
                let conforms = result.unwrapped()
                                     .typeflag
                                     .is_some_and(|found| found.kind_of(returns));
                if !conforms {
                    return Err(RuntimeError::ReturnTypeMismatch { expected: returns.to_string(),
                                                                  found: result.type_name(),
                                                                  line });
                }
            }
            return Ok(Some(result));
        }
        Ok(None)
    }
}

fn no_match(name: &str, arguments: &[Value], line: usize) -> RuntimeError {
    let arguments = arguments.iter()
                             .map(Value::type_name)
                             .collect::<Vec<_>>()
                             .join(", ");
    RuntimeError::NoMatchingSignature { name: name.to_string(),
                                        arguments,
                                        line }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::{lexer::lex, parser::core::parse};

    fn run(context: &mut Context, source: &str) -> EvalResult<Value> {
        let ast = parse(&lex(source)).expect("source should parse");
        context.eval(&ast)
    }

    #[test]
    fn builtins_share_one_value_per_name() {
        let context = Context::new();
        let print = context.optional_argument("print").unwrap();
        let Data::Function(function) = &print.data else {
            panic!("print should be a function");
        };
        assert_eq!(function.signatures.len(), 2);
        assert!(print.constant);
    }

    #[test]
    fn first_matching_signature_wins() {
        let mut context = Context::new();
        run(&mut context,
            "operator . (a: int, b: int): string { return \"ints\"; }
             operator . (a: any, b: any): string { return \"anything\"; }")
            .unwrap();
        let result = context.apply_operator(".",
                                            vec![context.types.make_int(1), context.types.make_int(2)],
                                            1);
        assert_eq!(result.unwrap().to_string(), "ints");

        let result = context.apply_operator(".",
                                            vec![context.types.make_string("a"), context.types.make_int(2)],
                                            1);
        assert_eq!(result.unwrap().to_string(), "anything");
    }

    #[test]
    fn nearest_operator_is_tried_first() {
        let mut context = Context::new();
        let result = run(&mut context,
                         "{ operator + (a: int, b: int): int { return 0; } 1 + 2; }").unwrap();
        assert_eq!(result.to_string(), "0");

        let outside = run(&mut context, "1 + 2;").unwrap();
        assert_eq!(outside.to_string(), "3");

        let fallback = run(&mut context,
                           "{ operator + (a: string, b: int): string { return a; } 1.5 + 2.5; }").unwrap();
        assert_eq!(fallback.to_string(), "4");
    }

    #[test]
    fn unmatched_arguments_are_reported_with_their_types() {
        let mut context = Context::new();
        let error = run(&mut context, "true + 1;").unwrap_err();
        assert_eq!(error,
                   RuntimeError::NoMatchingSignature { name: "+".to_string(),
                                                       arguments: "bool, int".to_string(),
                                                       line: 1 });
    }

    #[test]
    fn return_type_is_enforced_after_the_body_ran() {
        let mut context = Context::new();
        let error = run(&mut context, "func f(): int { return \"no\"; } f();").unwrap_err();
        assert!(matches!(error, RuntimeError::ReturnTypeMismatch { .. }));
    }

    #[test]
    fn calls_do_not_leak_return_behavior() {
        let mut context = Context::new();
        let result = run(&mut context, "func f() { return 1; } f(); 2;").unwrap();
        assert_eq!(result.to_string(), "2");
        assert_eq!(context.behavior, Behavior::Default);
    }

    #[test]
    fn moderate_recursion_completes() {
        let mut context = Context::new();
        let source = "func down(n: int): int { if n == 0 { return 0; } return down(n - 1) + 1; } down(500);";
        assert_eq!(run(&mut context, source).unwrap().to_string(), "500");
        assert_eq!(context.call_depth, 0);
    }

    #[test]
    fn runaway_recursion_is_an_error() {
        let mut context = Context::new();
        let source = format!("func down(n: int): int {{ if n == 0 {{ return 0; }} return down(n - 1); }}\ndown({});",
                             MAX_CALL_DEPTH * 2);
        let error = run(&mut context, &source).unwrap_err();
        assert_eq!(error,
                   RuntimeError::RecursionLimit { limit: MAX_CALL_DEPTH,
                                                  line:  1 });

        assert_eq!(context.call_depth, 0);
        assert_eq!(run(&mut context, "down(3);").unwrap().to_string(), "0");
    }
}
