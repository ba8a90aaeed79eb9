use tracing::trace;

use crate::{
    ast::Node,
    error::ParseError,
    interpreter::{
        evaluator::core::Behavior,
        lexer::TokenKind,
        parser::{
            block::{parse_branch, parse_loop, parse_match},
            core::{Cursor, ParseResult},
            declaration::{is_assignment, parse_assignment, parse_declaration},
            function::{parse_function_declaration, parse_operator_definition},
            term::parse_term,
            utils::parse_body,
        },
    },
};

/// Parses statements until the end of input or an unmatched `}`.
///
/// The closing `}` is left for the caller. Empty statements (a lone `;`) are
/// skipped.
///
/// # Parameters
/// - `cursor`: Cursor at the first statement.
/// - `substitute`: Whether the sequence opens its own scope when evaluated.
///
/// # Returns
/// A `Node::Sequence` holding the statements in source order.
///
/// # Errors
/// The first error of any statement, or `MissingTerminator` when a simple
/// statement is not followed by `;`.
pub fn parse_statements(cursor: &mut Cursor, substitute: bool) -> ParseResult<Node> {
    let line = cursor.line();
    let mut statements = Vec::new();

    while let Some(token) = cursor.peek() {
        if token.is_kind(TokenKind::RightBlock) {
            break;
        }
        if token.is_kind(TokenKind::Statement) {
            cursor.next();
            continue;
        }

        let (statement, block) = parse_statement(cursor)?;
        if !block {
            expect_terminator(cursor)?;
        }
        statements.push(statement);
    }

    trace!(count = statements.len(), substitute, "parsed sequence");
    Ok(Node::Sequence { statements,
                        substitute,
                        line })
}

/// Parses a single statement.
///
/// Returns the statement and whether it ended with a block, in which case no
/// `;` is required after it.
fn parse_statement(cursor: &mut Cursor) -> ParseResult<(Node, bool)> {
    let Some(token) = cursor.peek() else {
        return Err(ParseError::end_of_input("a statement", cursor.line()));
    };

    if token.is_kind(TokenKind::LeftBlock) {
        return Ok((parse_body(cursor, true)?, true));
    }
    if !token.is_kind(TokenKind::Identifier) {
        return Ok((parse_term(cursor)?, false));
    }

    let statement = match token.text.as_str() {
        "let" | "var" => (parse_declaration(cursor)?, false),
        "return" => (parse_return(cursor)?, false),
        "break" | "continue" | "fallthrough" => (parse_controller(cursor)?, false),
        "if" => (parse_branch(cursor)?, true),
        "for" => (parse_loop(cursor)?, true),
        "match" => (parse_match(cursor)?, true),
        "operator" => (parse_operator_definition(cursor)?, true),
        "func" if cursor.peek_nth(1)
                        .is_some_and(|next| next.is_kind(TokenKind::Identifier)) =>
        {
            (parse_function_declaration(cursor)?, true)
        },
        _ if is_assignment(cursor) => (parse_assignment(cursor)?, false),
        _ => (parse_term(cursor)?, false),
    };
    Ok(statement)
}

/// `return`, optionally followed by a value.
fn parse_return(cursor: &mut Cursor) -> ParseResult<Node> {
    let line = cursor.line();
    cursor.next();

    let ends = match cursor.peek() {
        None => true,
        Some(token) => token.is_kind(TokenKind::Statement) || token.is_kind(TokenKind::RightBlock),
    };
    let value = if ends { None } else { Some(Box::new(parse_term(cursor)?)) };

    Ok(Node::Controller { behavior: Behavior::Return,
                          value,
                          line })
}

fn parse_controller(cursor: &mut Cursor) -> ParseResult<Node> {
    let line = cursor.line();
    let behavior = match cursor.next().map(|token| token.text.as_str()) {
        Some("break") => Behavior::Break,
        Some("continue") => Behavior::Continue,
        _ => Behavior::Fallthrough,
    };
    Ok(Node::Controller { behavior,
                          value: None,
                          line })
}

/// Consumes the `;` after a simple statement.
///
/// The end of input also terminates a statement.
fn expect_terminator(cursor: &mut Cursor) -> ParseResult<()> {
    match cursor.peek() {
        None => Ok(()),
        Some(token) if token.is_kind(TokenKind::Statement) => {
            cursor.next();
            Ok(())
        },
        Some(token) => Err(ParseError::MissingTerminator { token: token.text.clone(),
                                                           line:  token.line, }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{lexer::lex, parser::core::parse};

    fn statements(source: &str) -> Vec<Node> {
        match parse(&lex(source)).unwrap() {
            Node::Sequence { statements, .. } => statements,
            other => panic!("expected a sequence, got {other:?}"),
        }
    }

    #[test]
    fn dispatches_on_the_leading_token() {
        let parsed = statements("let a = 1; a = 2; a += 1; { a; } if a { } for { break; } match a { } \
                                 func f() { } operator .(a, b) { return a; } return; f();");
        let kinds = parsed.iter()
                          .map(|node| match node {
                              Node::Declaration { .. } => "declaration",
                              Node::Assignment { .. } => "assignment",
                              Node::Sequence { .. } => "sequence",
                              Node::Branch { .. } => "branch",
                              Node::Loop { .. } => "loop",
                              Node::Match { .. } => "match",
                              Node::OperatorDefinition { .. } => "operator",
                              Node::Controller { .. } => "controller",
                              Node::FunctionCall { .. } => "call",
                              _ => "other",
                          })
                          .collect::<Vec<_>>();

        assert_eq!(kinds,
                   ["declaration",
                    "assignment",
                    "assignment",
                    "sequence",
                    "branch",
                    "loop",
                    "match",
                    "declaration",
                    "operator",
                    "controller",
                    "call"]);
    }

    #[test]
    fn empty_statements_are_skipped() {
        assert_eq!(statements(";;1;;").len(), 1);
        assert!(statements("").is_empty());
    }

    #[test]
    fn last_statement_may_omit_terminator() {
        assert_eq!(statements("1; 2").len(), 2);
    }

    #[test]
    fn simple_statements_need_terminators() {
        assert!(matches!(parse(&lex("let a = 1 let b = 2;")),
                         Err(ParseError::MissingTerminator { .. })));
        assert!(matches!(parse(&lex("{ 1 }")), Err(ParseError::MissingTerminator { .. })));
        assert!(parse(&lex("{ 1; }")).is_ok());
    }

    #[test]
    fn return_with_and_without_value() {
        let parsed = statements("return; return 1 + 2;");
        assert!(matches!(&parsed[0], Node::Controller { behavior: Behavior::Return, value: None, .. }));
        assert!(matches!(&parsed[1], Node::Controller { behavior: Behavior::Return, value: Some(_), .. }));
    }

    #[test]
    fn stray_closing_brace_is_rejected() {
        assert!(matches!(parse(&lex("1; }")), Err(ParseError::UnexpectedToken { .. })));
    }
}
