use std::{
    fmt,
    io::{self, BufRead, Write},
    mem,
    rc::Rc,
};

use tracing::{debug, trace};

use crate::{
    ast::{Conditional, Literal, Node, Parameter, TypeExpr},
    error::RuntimeError,
    interpreter::{
        evaluator::{binary, function, unary},
        value::{
            core::{Data, Value},
            datatype::Typeflag,
            function::{Function, Signature},
            namespace::{Item, Namespace, NamespaceRef, SearchSpace, unknown},
            types::{self, Types},
        },
    },
};

/// Result type used by the evaluator.
///
/// All evaluation functions return either a value of type `T` or a
/// `RuntimeError` describing the failure.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// The transient control-flow signal.
///
/// Set by `Controller` nodes, consumed by sequences, loops and matches, and
/// cleared at call boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behavior {
    /// Normal evaluation.
    #[default]
    Default,
    /// Skip the rest of the loop body.
    Continue,
    /// Leave the innermost loop.
    Break,
    /// Leave the innermost function call.
    Return,
    /// Run the next case of a match.
    Fallthrough,
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::Continue => "continue",
            Self::Break => "break",
            Self::Return => "return",
            Self::Fallthrough => "fallthrough",
        };
        write!(f, "{name}")
    }
}

/// Result of a guarded body.
///
/// A false guard is not an error: branches move on to their next arm and
/// loops stop.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The guard held and the body produced this value.
    Value(Value),
    /// The guard was false; the body did not run.
    ConditionNotMet,
}

/// Stores the runtime evaluation context.
///
/// The context owns the scope chain and the I/O handles of the builtins.
/// The builtin namespace is the root of every chain; the global namespace is
/// its only child and is where top level code declares names.
///
/// ## Usage
///
/// `Context` is created once and reused across evaluations, so names declared
/// by one program stay visible to the next.
pub struct Context {
    /// The namespace new names are stored in.
    pub namespace:        NamespaceRef,
    /// The namespace top level code runs in.
    pub global_namespace: NamespaceRef,
    /// The current control-flow signal.
    pub behavior:         Behavior,
    /// Handles to the builtin datatypes.
    pub types:            Types,
    pub(crate) call_line: usize,
    pub(crate) call_depth: usize,
    output:               Box<dyn Write>,
    input:                Box<dyn BufRead>,
}

#[allow(clippy::new_without_default)]
impl Context {
    /// Creates a context with the standard namespace loaded.
    ///
    /// Builtin datatypes, operators and functions are registered into a root
    /// namespace; the returned context evaluates in a fresh child of it.
    /// Output goes to stdout and `read` consumes stdin.
    #[must_use]
    pub fn new() -> Self {
        let types = Types::new();
        let builtin = Namespace::new_ref(None);
        {
            let mut namespace = builtin.borrow_mut();
            types::load(&mut namespace, &types);
            binary::core::load(&mut namespace, &types);
            unary::load(&mut namespace, &types);
            function::core::load(&mut namespace, &types);
        }
        let global = Namespace::new_ref(Some(builtin));

        Self { namespace: global.clone(),
               global_namespace: global,
               behavior: Behavior::Default,
               types,
               call_line: 0,
               call_depth: 0,
               output: Box::new(io::stdout()),
               input: Box::new(io::BufReader::new(io::stdin())) }
    }

    /// Redirects the output of `print` and `read` prompts.
    #[must_use]
    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.output = output;
        self
    }

    /// Replaces the input `read` consumes.
    #[must_use]
    pub fn with_input(mut self, input: Box<dyn BufRead>) -> Self {
        self.input = input;
        self
    }

    pub(crate) fn output(&mut self) -> &mut dyn Write {
        self.output.as_mut()
    }

    pub(crate) fn input(&mut self) -> &mut dyn BufRead {
        self.input.as_mut()
    }

    /// Evaluates a node and returns the resulting value.
    ///
    /// This is the main entry point for evaluation. Statements that produce
    /// nothing meaningful evaluate to `null`.
    ///
    /// # Parameters
    /// - `node`: The node to evaluate.
    ///
    /// # Returns
    /// The value of the node, or the first runtime error.
    ///
    /// # Example
    /// ```
    /// use tealang::interpreter::{evaluator::core::Context, lexer::lex, parser::core::parse};
    ///
    /// let mut context = Context::new();
    /// let ast = parse(&lex("var x = 2; x = x * 21; x;")).unwrap();
    ///
    /// assert_eq!(context.eval(&ast).unwrap().to_string(), "42");
    /// ```
    pub fn eval(&mut self, node: &Node) -> EvalResult<Value> {
        match node {
            Node::Literal { value, .. } => Ok(self.eval_literal(value)),
            Node::Identifier { name, line } => self.lookup(name, *line),
            Node::Operation { symbol,
                              arguments,
                              line, } => self.eval_operation(symbol, arguments, *line),
            Node::FunctionCall { name,
                                 arguments,
                                 line, } => self.eval_function_call(name, arguments, *line),
            Node::Tuple { elements, line } => {
                let elements = self.eval_all(elements)?;
                self.types.make_array(elements, *line)
            },
            Node::Typecast { datatype,
                             arguments,
                             line, } => self.eval_typecast(datatype, arguments, *line),
            Node::Declaration { aliases,
                                constant,
                                values,
                                line, } => self.eval_declaration(aliases, *constant, values, *line),
            Node::Assignment { aliases,
                               operator,
                               values,
                               line, } => {
                self.eval_assignment(aliases, operator.as_deref(), values, *line)
            },
            Node::Sequence { statements,
                             substitute,
                             .. } => self.eval_sequence(statements, *substitute),
            Node::Branch { conditionals,
                           otherwise,
                           .. } => self.eval_branch(conditionals, otherwise.as_deref()),
            Node::Loop { conditional, post, .. } => self.eval_loop(conditional, post.as_deref()),
            Node::Match { scrutinee,
                          cases,
                          default,
                          .. } => self.eval_match(scrutinee, cases, default.as_deref()),
            Node::FunctionLiteral { parameters,
                                    returns,
                                    body,
                                    line, } => {
                let signature = self.build_signature(parameters, returns.as_ref(), body, *line)?;
                let function = Function { signatures: vec![signature],
                                          source:     Some(self.namespace.clone()), };
                Ok(self.types.make_function(function))
            },
            Node::OperatorDefinition { symbol,
                                       parameters,
                                       returns,
                                       body,
                                       line, } => {
                let signature = self.build_signature(parameters, returns.as_ref(), body, *line)?;
                let source = Some(self.namespace.clone());
                self.namespace
                    .borrow_mut()
                    .define_operator(symbol, signature, source);
                debug!(symbol, line, "user operator defined");
                Ok(Value::null())
            },
            Node::Controller { behavior,
                               value,
                               .. } => self.eval_controller(*behavior, value.as_deref()),
            Node::Adapter { name, function } => {
                let line = self.call_line;
                trace!(name, line, "native call");
                function(self, line)
            },
        }
    }

    /// Evaluates nodes in order, stopping at the first error.
    pub fn eval_all(&mut self, nodes: &[Node]) -> EvalResult<Vec<Value>> {
        nodes.iter().map(|node| self.eval(node)).collect()
    }

    fn eval_literal(&self, literal: &Literal) -> Value {
        match literal {
            Literal::Null => Value::null(),
            Literal::Integer(i) => self.types.make_int(*i),
            Literal::Float(x) => self.types.make_float(*x),
            Literal::Bool(b) => self.types.make_bool(*b),
            Literal::String(s) => self.types.make_string(s),
        }
    }

    fn lookup(&self, name: &str, line: usize) -> EvalResult<Value> {
        match self.namespace.borrow().find(SearchSpace::Identifier, name) {
            Some(Item::Value(value)) => Ok(value.dereferenced()),
            _ => Err(unknown(SearchSpace::Identifier, name.to_string(), line)),
        }
    }

    fn eval_typecast(&mut self, datatype: &TypeExpr, arguments: &[Node], line: usize) -> EvalResult<Value> {
        let typeflag = self.resolve_type(datatype, line)?;
        let value = match arguments.first() {
            Some(argument) => self.eval(argument)?,
            None => Value::null(),
        };
        typeflag.cast(&value, line)
    }

    /// Resolves a type expression through the datatype search space.
    ///
    /// # Errors
    /// Returns `RuntimeError::UnknownType` if the type or one of its
    /// parameters is not declared.
    pub fn resolve_type(&self, datatype: &TypeExpr, line: usize) -> EvalResult<Typeflag> {
        let found = self.namespace
                        .borrow()
                        .find(SearchSpace::Datatype, &datatype.name);
        let Some(Item::Datatype(resolved)) = found else {
            return Err(unknown(SearchSpace::Datatype, datatype.name.clone(), line));
        };
        let parameters = datatype.parameters
                                 .iter()
                                 .map(|parameter| self.resolve_type(parameter, line))
                                 .collect::<EvalResult<Vec<_>>>()?;
        Ok(Typeflag::with_parameters(resolved, parameters))
    }

    fn build_signature(&self,
                       parameters: &[Parameter],
                       returns: Option<&TypeExpr>,
                       body: &Rc<Node>,
                       line: usize)
                       -> EvalResult<Signature> {
        let parameters = parameters.iter()
                                   .map(|parameter| {
                                       let typeflag = self.resolve_type(&parameter.datatype, line)?;
                                       Ok(Value::new(typeflag, Data::Null).renamed(&parameter.name))
                                   })
                                   .collect::<EvalResult<Vec<_>>>()?;
        let returns = returns.map(|returns| self.resolve_type(returns, line))
                             .transpose()?;
        Ok(Signature { parameters,
                       body: body.clone(),
                       returns })
    }

    /// Evaluates a guarded body.
    ///
    /// The condition must produce a `bool`. When it is `true` the body runs
    /// in a fresh child namespace.
    ///
    /// # Returns
    /// `Outcome::ConditionNotMet` when the condition is `false`, otherwise
    /// the body's value.
    ///
    /// # Errors
    /// Returns `RuntimeError::ExpectedBoolean` for a non-boolean condition,
    /// or any error of the condition or body.
    pub fn eval_conditional(&mut self, conditional: &Conditional) -> EvalResult<Outcome> {
        let condition = self.eval(&conditional.condition)?;
        if !condition.as_bool(conditional.line)? {
            return Ok(Outcome::ConditionNotMet);
        }
        let scope = self.child_scope();
        let value = self.substitute(scope, |ctx| ctx.eval(&conditional.body))?;
        Ok(Outcome::Value(value))
    }

    /// Creates a namespace below the current one.
    #[must_use]
    pub fn child_scope(&self) -> NamespaceRef {
        Namespace::new_ref(Some(self.namespace.clone()))
    }

    /// Runs `f` with `namespace` as the current namespace.
    ///
    /// The previous namespace is restored afterwards, whether `f` succeeds or
    /// fails, and the finished scope is offered to `Namespace::release`.
    pub fn substitute<T>(&mut self,
                         namespace: NamespaceRef,
                         f: impl FnOnce(&mut Self) -> EvalResult<T>)
                         -> EvalResult<T> {
        let previous = mem::replace(&mut self.namespace, namespace);
        trace!("scope pushed");
        let result = f(self);
        let scope = mem::replace(&mut self.namespace, previous);
        Namespace::release(&scope);
        trace!("scope popped");
        result
    }

    /// Reads a bound argument of a native function.
    ///
    /// # Errors
    /// Returns `RuntimeError::MissingArgument` if the name is not bound.
    pub fn argument(&self, name: &str, line: usize) -> EvalResult<Value> {
        self.optional_argument(name)
            .ok_or_else(|| RuntimeError::MissingArgument { name: name.to_string(),
                                                           line })
    }

    /// Reads a bound argument that only some signatures declare.
    #[must_use]
    pub fn optional_argument(&self, name: &str) -> Option<Value> {
        match self.namespace.borrow().find(SearchSpace::Identifier, name) {
            Some(Item::Value(value)) => Some(value),
            _ => None,
        }
    }
}
