/// The evaluator module executes AST nodes and computes results.
///
/// The evaluator walks the AST against a chain of namespaces, dispatches
/// operators and function calls over their signatures, and steers control
/// flow with a behavior flag that statements set and enclosing nodes
/// inspect.
///
/// # Responsibilities
/// - Evaluates every node variant.
/// - Registers the builtin operators and functions.
/// - Reports runtime errors such as failed casts or unmatched signatures.
pub mod evaluator;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer reads the raw source text and produces tokens, each carrying a
/// kind, its text and its line. Input that matches no kind becomes a token
/// without a kind, which the parser reports.
pub mod lexer;
/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// Expressions are parsed with shunting-yard; statements and blocks by
/// recursive descent driven by the leading keyword.
///
/// # Responsibilities
/// - Converts tokens into AST nodes.
/// - Enforces statement terminators and balanced brackets.
/// - Reports syntax errors with the offending token and its line.
pub mod parser;
/// The value module defines the runtime data model.
///
/// Values pair a payload with an optional typeflag. Datatypes form a tree
/// rooted at `any`; namespaces store values, operators and datatypes in
/// separate search spaces.
pub mod value;
