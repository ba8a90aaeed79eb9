use std::{fmt, rc::Rc};

use thiserror::Error;

use crate::{
    ast::Node,
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::{
            core::{Data, Value},
            datatype::Typeflag,
            namespace::NamespaceRef,
        },
    },
};

/// Native implementation of a builtin.
///
/// Natives find their bound arguments by name in the current namespace
/// (see `Context::argument`) and receive the line of the call.
pub type NativeFn = fn(&mut Context, usize) -> EvalResult<Value>;

/// Why a signature did not accept an argument list.
///
/// Never shown to users directly: dispatch moves on to the next signature
/// and reports `NoMatchingSignature` if none accepts.
#[derive(Debug, Error)]
pub enum SignatureMismatch {
    /// More arguments than parameters.
    #[error("expected at most {expected} arguments, got {found}")]
    TooManyArguments {
        /// Number of parameters.
        expected: usize,
        /// Number of arguments.
        found:    usize,
    },
    /// An argument whose type is not a kind of the parameter's type.
    #[error("argument '{name}' expects {expected}, got {found}")]
    IncompatibleArgument {
        /// The parameter name.
        name:     String,
        /// The parameter type.
        expected: String,
        /// The argument type.
        found:    String,
    },
    /// A parameter without argument and without default.
    #[error("missing argument '{name}'")]
    MissingArgument {
        /// The parameter name.
        name: String,
    },
    /// The argument could not be cast into the parameter type.
    #[error(transparent)]
    Cast(#[from] RuntimeError),
}

/// One overload: parameter specs, body and declared return type.
///
/// A parameter spec is a value whose typeflag is the accepted type and whose
/// name is the binding name. A spec that carries data is optional, the data
/// being its default.
#[derive(Debug, Clone)]
pub struct Signature {
    /// The parameter specs, in positional order.
    pub parameters: Vec<Value>,
    /// The body; a sequence for user code, an adapter for builtins.
    pub body:       Rc<Node>,
    /// The declared return type.
    pub returns:    Option<Typeflag>,
}

impl Signature {
    /// Binds an argument list to the parameters.
    ///
    /// Arguments are matched positionally. `null` is accepted by every
    /// parameter and then cast; other arguments must be a kind of the
    /// parameter type. Every bound value is renamed to its parameter and is
    /// mutable.
    ///
    /// # Errors
    /// The first reason the argument list does not fit.
    pub fn bind(&self, arguments: &[Value], line: usize) -> Result<Vec<Value>, SignatureMismatch> {
        if arguments.len() > self.parameters.len() {
            return Err(SignatureMismatch::TooManyArguments { expected: self.parameters.len(),
                                                             found:    arguments.len(), });
        }

        let mut bound = Vec::with_capacity(self.parameters.len());
        for (index, parameter) in self.parameters.iter().enumerate() {
            let value = match arguments.get(index) {
                Some(argument) => bind_one(parameter, argument, line)?,
                None if !matches!(parameter.data, Data::Null) => bind_one(parameter, parameter, line)?,
                None => {
                    return Err(SignatureMismatch::MissingArgument { name: parameter.name.clone() });
                },
            };
            bound.push(value.renamed(&parameter.name).with_constant(false));
        }
        Ok(bound)
    }
}

fn bind_one(parameter: &Value, argument: &Value, line: usize) -> Result<Value, SignatureMismatch> {
    let Some(expected) = &parameter.typeflag else {
        return Ok(argument.clone());
    };
    if argument.is_null() {
        return Ok(expected.cast(argument, line)?);
    }

    let found = argument.unwrapped();
    let compatible = found.typeflag
                          .as_ref()
                          .is_some_and(|typeflag| typeflag.kind_of(expected));
    if !compatible {
        return Err(SignatureMismatch::IncompatibleArgument { name:     parameter.name.clone(),
                                                             expected: expected.to_string(),
                                                             found:    found.type_name(), });
    }
    Ok(expected.cast(&found, line)?)
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parameters = self.parameters
                             .iter()
                             .map(|p| format!("{}: {}", p.name, p.type_name()))
                             .collect::<Vec<_>>();
        write!(f, "({})", parameters.join(", "))?;
        if let Some(returns) = &self.returns {
            write!(f, " -> {returns}")?;
        }
        Ok(())
    }
}

/// A callable: its overloads plus the namespace it closes over.
#[derive(Clone)]
pub struct Function {
    /// The overloads, tried in order.
    pub signatures: Vec<Signature>,
    /// Parent of every activation namespace; `None` for builtins.
    pub source:     Option<NamespaceRef>,
}

// The captured namespace usually contains the function itself.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
         .field("signatures", &self.signatures.len())
         .field("closure", &self.source.is_some())
         .finish()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let signatures = self.signatures
                             .iter()
                             .map(|s| format!("func{s}"))
                             .collect::<Vec<_>>();
        write!(f, "{}", signatures.join(" | "))
    }
}

/// A function stored under an operator symbol.
#[derive(Debug, Clone)]
pub struct Operator {
    /// The symbol, such as `+`.
    pub symbol:   String,
    /// The overloads.
    pub function: Rc<Function>,
    /// Whether the operator may be replaced through an update.
    pub constant: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::Literal,
        interpreter::value::types::Types,
    };

    fn signature(parameters: Vec<Value>) -> Signature {
        Signature { parameters,
                    body: Rc::new(Node::literal(Literal::Null, 1)),
                    returns: None }
    }

    #[test]
    fn binds_positionally_and_renames() {
        let types = Types::new();
        let signature = signature(vec![types.parameter("a", &types.int),
                                       types.parameter("b", &types.string)]);
        let bound = signature.bind(&[types.make_int(1).with_constant(true), types.make_string("x")], 1)
                             .unwrap();

        assert_eq!(bound[0].name, "a");
        assert!(!bound[0].constant);
        assert_eq!(bound[1].to_string(), "x");
    }

    #[test]
    fn rejects_wrong_types_and_counts() {
        let types = Types::new();
        let signature = signature(vec![types.parameter("a", &types.int)]);

        assert!(matches!(signature.bind(&[types.make_string("x")], 1),
                         Err(SignatureMismatch::IncompatibleArgument { .. })));
        assert!(matches!(signature.bind(&[types.make_int(1), types.make_int(2)], 1),
                         Err(SignatureMismatch::TooManyArguments { expected: 1, found: 2 })));
        assert!(matches!(signature.bind(&[], 1),
                         Err(SignatureMismatch::MissingArgument { .. })));
    }

    #[test]
    fn int_is_not_a_kind_of_float() {
        let types = Types::new();
        let signature = signature(vec![types.parameter("a", &types.float)]);
        assert!(signature.bind(&[types.make_int(1)], 1).is_err());
    }

    #[test]
    fn null_is_cast_and_defaults_fill_gaps() {
        let types = Types::new();
        let mut optional = types.parameter("b", &types.int);
        optional.data = Data::Integer(10);
        let signature = signature(vec![types.parameter("a", &types.int), optional]);

        let bound = signature.bind(&[Value::null()], 1).unwrap();
        assert_eq!(bound[0].to_string(), "0");
        assert_eq!(bound[1].to_string(), "10");
    }

    #[test]
    fn any_parameters_wrap_the_argument() {
        let types = Types::new();
        let signature = signature(vec![types.parameter("a", &types.any)]);
        let bound = signature.bind(&[types.make_float(2.5)], 1).unwrap();

        assert_eq!(bound[0].type_name(), "any<float>");
        assert_eq!(bound[0].unwrapped().type_name(), "float");
        assert_eq!(bound[0].to_string(), "2.5");
    }
}
