use std::{fmt, rc::Rc};

use crate::interpreter::{evaluator::core::Behavior, value::function::NativeFn};

/// Represents a literal value in the language.
///
/// `Literal` covers the raw constants that can appear directly in source
/// code. Each one becomes a typed runtime value when evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// The `null` keyword; a value without a type.
    Null,
    /// A 64-bit signed integer literal.
    Integer(i64),
    /// A 64-bit floating-point literal.
    Float(f64),
    /// A boolean literal value: `true` or `false`.
    Bool(bool),
    /// A string literal with escapes already resolved.
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// A type as written in source: a name plus optional parameters, such as
/// `int` or `array<int>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeExpr {
    /// Name of the datatype.
    pub name:       String,
    /// Parametrizing types inside `<...>`.
    pub parameters: Vec<Self>,
}

impl TypeExpr {
    /// Creates a type expression without parameters.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self { name:       name.to_string(),
               parameters: Vec::new(), }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.parameters.is_empty() {
            let parameters = self.parameters
                                 .iter()
                                 .map(ToString::to_string)
                                 .collect::<Vec<_>>();
            write!(f, "<{}>", parameters.join(", "))?;
        }
        Ok(())
    }
}

/// One declared parameter of a function or operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Name the argument is bound to inside the body.
    pub name:     String,
    /// The type arguments must conform to.
    pub datatype: TypeExpr,
}

/// A guarded body: the body runs in a fresh scope when the condition holds.
///
/// Used as the arms of a `Branch` and as the head of a `Loop`.
#[derive(Debug, Clone)]
pub struct Conditional {
    /// Expression that must evaluate to a `bool`.
    pub condition: Box<Node>,
    /// Sequence evaluated when the condition is `true`.
    pub body:      Box<Node>,
    /// Line number in the source code.
    pub line:      usize,
}

/// One `case <value> { ... }` arm of a `match`.
#[derive(Debug, Clone)]
pub struct Case {
    /// Expression compared for equality against the scrutinee.
    pub value: Box<Node>,
    /// Sequence evaluated when the comparison holds or a previous case fell
    /// through.
    pub body:  Box<Node>,
    /// Line number in the source code.
    pub line:  usize,
}

/// An abstract syntax tree (AST) node.
///
/// The set of variants is closed: the evaluator matches on it exhaustively.
/// Trees are built once by the parser and only read afterwards; function
/// bodies are shared through `Rc` so that evaluated function values can keep
/// them alive.
#[derive(Debug, Clone)]
pub enum Node {
    /// A literal constant.
    Literal {
        /// The constant value.
        value: Literal,
        /// Line number in the source code.
        line:  usize,
    },
    /// Reference to a value by name.
    Identifier {
        /// Name of the value.
        name: String,
        /// Line number in the source code.
        line: usize,
    },
    /// Application of an operator looked up by symbol.
    Operation {
        /// The operator symbol, such as `+` or `&&`.
        symbol:    String,
        /// One operand for unary and two for binary operators.
        arguments: Vec<Self>,
        /// Line number in the source code.
        line:      usize,
    },
    /// Call of a function value looked up by name.
    FunctionCall {
        /// Name of the function being called.
        name:      String,
        /// Arguments to the function.
        arguments: Vec<Self>,
        /// Line number in the source code.
        line:      usize,
    },
    /// A parenthesised list such as `(1, 2, 3)`, evaluated into an array.
    Tuple {
        /// The element expressions.
        elements: Vec<Self>,
        /// Line number in the source code.
        line:     usize,
    },
    /// Conversion of a value into a datatype.
    Typecast {
        /// The target type.
        datatype:  TypeExpr,
        /// Zero or one expression; none casts `null`.
        arguments: Vec<Self>,
        /// Line number in the source code.
        line:      usize,
    },
    /// `let`/`var` declaration of one or more names.
    Declaration {
        /// The declared names.
        aliases:  Vec<String>,
        /// `true` for `let`, `false` for `var`.
        constant: bool,
        /// One initializer per name.
        values:   Vec<Self>,
        /// Line number in the source code.
        line:     usize,
    },
    /// Assignment to one or more existing names.
    Assignment {
        /// The assigned names.
        aliases:  Vec<String>,
        /// Operator combined with the current value, for `+=` and friends.
        operator: Option<String>,
        /// One value per name.
        values:   Vec<Self>,
        /// Line number in the source code.
        line:     usize,
    },
    /// Statements evaluated in order.
    Sequence {
        /// The statements.
        statements: Vec<Self>,
        /// Whether the sequence runs in its own child namespace.
        substitute: bool,
        /// Line number in the source code.
        line:       usize,
    },
    /// `if` / `else if` / `else`.
    Branch {
        /// The guarded arms, tried in order.
        conditionals: Vec<Conditional>,
        /// The `else` body.
        otherwise:    Option<Box<Self>>,
        /// Line number in the source code.
        line:         usize,
    },
    /// `for` loop.
    Loop {
        /// Condition and body of one iteration.
        conditional: Conditional,
        /// Statement run after every iteration, including after `continue`.
        post:        Option<Box<Self>>,
        /// Line number in the source code.
        line:        usize,
    },
    /// `match` over a scrutinee.
    Match {
        /// The value compared against every case.
        scrutinee: Box<Self>,
        /// The cases, in source order.
        cases:     Vec<Case>,
        /// The `default` body.
        default:   Option<Box<Self>>,
        /// Line number in the source code.
        line:      usize,
    },
    /// A function value built from parameters, return type and body.
    FunctionLiteral {
        /// The declared parameters.
        parameters: Vec<Parameter>,
        /// The declared return type.
        returns:    Option<TypeExpr>,
        /// The body, shared with the function values built from it.
        body:       Rc<Self>,
        /// Line number in the source code.
        line:       usize,
    },
    /// `operator` definition; a function literal stored under a symbol.
    OperatorDefinition {
        /// The operator symbol.
        symbol:     String,
        /// The declared parameters.
        parameters: Vec<Parameter>,
        /// The declared return type.
        returns:    Option<TypeExpr>,
        /// The body, shared with the function values built from it.
        body:       Rc<Self>,
        /// Line number in the source code.
        line:       usize,
    },
    /// `return`, `break`, `continue` or `fallthrough`.
    Controller {
        /// The behavior set after the value is evaluated.
        behavior: Behavior,
        /// The returned expression.
        value:    Option<Box<Self>>,
        /// Line number in the source code.
        line:     usize,
    },
    /// Body of a builtin implemented in Rust.
    Adapter {
        /// Name used in graphs and logs.
        name:     &'static str,
        /// The native implementation; it reads its arguments from the
        /// activation namespace.
        function: NativeFn,
    },
}

/// A reference to anything that appears as a vertex in the AST graph.
#[derive(Debug, Clone, Copy)]
pub enum GraphNode<'a> {
    /// A regular node.
    Node(&'a Node),
    /// An arm of a branch or the head of a loop.
    Conditional(&'a Conditional),
    /// An arm of a match.
    Case(&'a Case),
}

impl Node {
    /// Returns the line number associated with this node.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        match self {
            Self::Literal { line, .. }
            | Self::Identifier { line, .. }
            | Self::Operation { line, .. }
            | Self::FunctionCall { line, .. }
            | Self::Tuple { line, .. }
            | Self::Typecast { line, .. }
            | Self::Declaration { line, .. }
            | Self::Assignment { line, .. }
            | Self::Sequence { line, .. }
            | Self::Branch { line, .. }
            | Self::Loop { line, .. }
            | Self::Match { line, .. }
            | Self::FunctionLiteral { line, .. }
            | Self::OperatorDefinition { line, .. }
            | Self::Controller { line, .. } => *line,
            Self::Adapter { .. } => 0,
        }
    }

    /// Creates a literal node.
    #[must_use]
    pub const fn literal(value: Literal, line: usize) -> Self {
        Self::Literal { value, line }
    }
}

impl<'a> GraphNode<'a> {
    /// The text shown for this vertex.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            GraphNode::Conditional(_) => "Conditional".to_string(),
            GraphNode::Case(_) => "Case".to_string(),
            GraphNode::Node(node) => match node {
                Node::Literal { value, .. } => format!("Literal {value}"),
                Node::Identifier { name, .. } => format!("Identifier {name}"),
                Node::Operation { symbol, arguments, .. } => {
                    format!("Operation {symbol} ({})", arguments.len())
                },
                Node::FunctionCall { name, .. } => format!("Call {name}"),
                Node::Tuple { elements, .. } => format!("Tuple ({})", elements.len()),
                Node::Typecast { datatype, .. } => format!("Cast to {datatype}"),
                Node::Declaration { aliases, constant, .. } => {
                    let keyword = if *constant { "let" } else { "var" };
                    format!("Declare {keyword} {}", aliases.join(", "))
                },
                Node::Assignment { aliases, operator, .. } => match operator {
                    Some(op) => format!("Assign {} {op}=", aliases.join(", ")),
                    None => format!("Assign {}", aliases.join(", ")),
                },
                Node::Sequence { substitute, .. } => format!("Sequence (sub={substitute})"),
                Node::Branch { .. } => "Branch".to_string(),
                Node::Loop { .. } => "Loop".to_string(),
                Node::Match { .. } => "Match".to_string(),
                Node::FunctionLiteral { parameters, returns, .. } => {
                    format!("Function {}", signature_label(parameters, returns.as_ref()))
                },
                Node::OperatorDefinition { symbol,
                                           parameters,
                                           returns,
                                           .. } => {
                    format!("Define {symbol} as {}", signature_label(parameters, returns.as_ref()))
                },
                Node::Controller { behavior, .. } => format!("Controller ({behavior})"),
                Node::Adapter { name, .. } => format!("Adapter {name}"),
            },
        }
    }

    /// The Graphviz shape used for this vertex.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            GraphNode::Conditional(_) => "parallelogram",
            GraphNode::Case(_) => "oval",
            GraphNode::Node(node) => match node {
                Node::Sequence { .. } => "house",
                Node::Branch { .. } | Node::Match { .. } => "diamond",
                Node::Literal { .. } | Node::Identifier { .. } => "box",
                _ => "oval",
            },
        }
    }

    /// The ordered children of this vertex.
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        match self {
            GraphNode::Conditional(conditional) => {
                vec![GraphNode::Node(&conditional.condition), GraphNode::Node(&conditional.body)]
            },
            GraphNode::Case(case) => vec![GraphNode::Node(&case.value), GraphNode::Node(&case.body)],
            GraphNode::Node(node) => match node {
                Node::Literal { .. } | Node::Identifier { .. } | Node::Adapter { .. } => Vec::new(),
                Node::Operation { arguments, .. }
                | Node::FunctionCall { arguments, .. }
                | Node::Typecast { arguments, .. } => arguments.iter().map(GraphNode::Node).collect(),
                Node::Tuple { elements, .. } => elements.iter().map(GraphNode::Node).collect(),
                Node::Declaration { values, .. } | Node::Assignment { values, .. } => {
                    values.iter().map(GraphNode::Node).collect()
                },
                Node::Sequence { statements, .. } => {
                    statements.iter().map(GraphNode::Node).collect()
                },
                Node::Branch { conditionals,
                               otherwise,
                               .. } => {
                    let mut children = conditionals.iter()
                                                   .map(GraphNode::Conditional)
                                                   .collect::<Vec<_>>();
                    if let Some(otherwise) = otherwise {
                        children.push(GraphNode::Node(otherwise));
                    }
                    children
                },
                Node::Loop { conditional, post, .. } => {
                    let mut children = vec![GraphNode::Conditional(conditional)];
                    if let Some(post) = post {
                        children.push(GraphNode::Node(post));
                    }
                    children
                },
                Node::Match { scrutinee,
                              cases,
                              default,
                              .. } => {
                    let mut children = vec![GraphNode::Node(scrutinee)];
                    children.extend(cases.iter().map(GraphNode::Case));
                    if let Some(default) = default {
                        children.push(GraphNode::Node(default));
                    }
                    children
                },
                Node::FunctionLiteral { body, .. } | Node::OperatorDefinition { body, .. } => {
                    vec![GraphNode::Node(body)]
                },
                Node::Controller { value, .. } => {
                    value.iter().map(|value| GraphNode::Node(value)).collect()
                },
            },
        }
    }
}

fn signature_label(parameters: &[Parameter], returns: Option<&TypeExpr>) -> String {
    let parameters = parameters.iter()
                               .map(|p| format!("{}: {}", p.name, p.datatype))
                               .collect::<Vec<_>>()
                               .join(", ");
    match returns {
        Some(returns) => format!("({parameters}) -> {returns}"),
        None => format!("({parameters}) -> ()"),
    }
}
