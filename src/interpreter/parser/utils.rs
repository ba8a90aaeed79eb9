use crate::{
    ast::{Node, TypeExpr},
    error::ParseError,
    interpreter::{
        lexer::TokenKind,
        parser::{
            core::{Cursor, ParseResult, is_keyword},
            statement::parse_statements,
            term::parse_term,
        },
    },
};

/// Parses a plain identifier and returns its name and line.
///
/// # Parameters
/// - `cursor`: Cursor positioned at an identifier.
/// - `what`: What the identifier names, used in error messages.
///
/// # Errors
/// - `ReservedKeyword` if the identifier is a keyword.
/// - `UnexpectedToken` or `UnexpectedEndOfInput` otherwise.
pub(in crate::interpreter::parser) fn parse_identifier(cursor: &mut Cursor, what: &str)
                                                       -> ParseResult<(String, usize)> {
    match cursor.peek() {
        Some(token) if token.is_kind(TokenKind::Identifier) => {
            if is_keyword(&token.text) {
                return Err(ParseError::ReservedKeyword { name: token.text.clone(),
                                                         line: token.line, });
            }
            cursor.next();
            Ok((token.text.clone(), token.line))
        },
        Some(token) => Err(ParseError::unexpected(&token.text, what, token.line)),
        None => Err(ParseError::end_of_input(what, cursor.line())),
    }
}

/// Parses a type expression such as `int` or `array<array<int>>`.
///
/// Grammar: `type := identifier ("<" type ("," type)* ">")?`
///
/// `func` is the one keyword that also names a type.
pub(in crate::interpreter::parser) fn parse_type(cursor: &mut Cursor) -> ParseResult<TypeExpr> {
    let name = if cursor.eat(TokenKind::Identifier, "func") {
        "func".to_string()
    } else {
        parse_identifier(cursor, "a type name")?.0
    };
    let mut parameters = Vec::new();

    if cursor.eat(TokenKind::Operator, "<") {
        loop {
            parameters.push(parse_type(cursor)?);
            if !cursor.eat(TokenKind::Separator, ",") {
                break;
            }
        }
        cursor.expect(TokenKind::Operator, ">")?;
    }
    Ok(TypeExpr { name, parameters })
}

/// Parses one or more comma-separated expressions.
///
/// Grammar: `terms := term ("," term)*`
pub(in crate::interpreter::parser) fn parse_term_list(cursor: &mut Cursor) -> ParseResult<Vec<Node>> {
    let mut terms = vec![parse_term(cursor)?];
    while cursor.eat(TokenKind::Separator, ",") {
        terms.push(parse_term(cursor)?);
    }
    Ok(terms)
}

/// Parses `{ statements }`.
///
/// # Parameters
/// - `cursor`: Cursor positioned at `{`.
/// - `substitute`: Whether the resulting sequence opens its own scope.
pub(in crate::interpreter::parser) fn parse_body(cursor: &mut Cursor, substitute: bool) -> ParseResult<Node> {
    cursor.expect(TokenKind::LeftBlock, "{")?;
    let body = parse_statements(cursor, substitute)?;
    cursor.expect(TokenKind::RightBlock, "}")?;
    Ok(body)
}

/// Resolves the escapes of a string token and strips its quotes.
///
/// Supported escapes are `\n`, `\t`, `\r`, `\\`, `\"` and `\0`.
///
/// # Errors
/// `InvalidLiteral` for any other escape.
///
/// # Example
/// ```
/// use tealang::interpreter::parser::utils::unescape;
///
/// assert_eq!(unescape(r#""a\tb\"c\"""#, 1).unwrap(), "a\tb\"c\"");
/// assert!(unescape(r#""\q""#, 1).is_err());
/// ```
pub fn unescape(token: &str, line: usize) -> ParseResult<String> {
    let inner = token.strip_prefix('"')
                     .and_then(|rest| rest.strip_suffix('"'))
                     .ok_or_else(|| ParseError::InvalidLiteral { token: token.to_string(),
                                                                 line })?;

    let mut text = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }
        let escaped = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('\\') => '\\',
            Some('"') => '"',
            Some('0') => '\0',
            _ => {
                return Err(ParseError::InvalidLiteral { token: token.to_string(),
                                                        line });
            },
        };
        text.push(escaped);
    }
    Ok(text)
}
