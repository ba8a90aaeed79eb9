use crate::{
    ast::{Case, Conditional, Literal, Node},
    error::ParseError,
    interpreter::{
        lexer::TokenKind,
        parser::{
            core::{Cursor, ParseResult},
            declaration::{is_assignment, parse_assignment, parse_declaration},
            term::parse_term,
            utils::parse_body,
        },
    },
};

/// Parses `if`/`else if`/`else`.
///
/// Grammar:
/// ```text
/// branch := "if" term block ("else" "if" term block)* ("else" block)?
/// ```
pub fn parse_branch(cursor: &mut Cursor) -> ParseResult<Node> {
    let line = cursor.line();
    cursor.expect(TokenKind::Identifier, "if")?;

    let mut conditionals = vec![parse_conditional(cursor)?];
    let mut otherwise = None;
    while cursor.eat(TokenKind::Identifier, "else") {
        if cursor.eat(TokenKind::Identifier, "if") {
            conditionals.push(parse_conditional(cursor)?);
            continue;
        }
        otherwise = Some(Box::new(parse_body(cursor, true)?));
        break;
    }

    Ok(Node::Branch { conditionals,
                      otherwise,
                      line })
}

/// `term block`; the body gets its scope from the conditional itself.
fn parse_conditional(cursor: &mut Cursor) -> ParseResult<Conditional> {
    let line = cursor.line();
    let condition = parse_term(cursor)?;
    let body = parse_body(cursor, false)?;
    Ok(Conditional { condition: Box::new(condition),
                     body: Box::new(body),
                     line })
}

/// Parses a `for` loop.
///
/// Three forms are accepted:
/// ```text
/// for block                       // runs until break or return
/// for term block                  // runs while term holds
/// for init? ; term? ; post? block // three clauses, any may be empty
/// ```
///
/// The three-clause form becomes a scoped sequence holding the initializer
/// and the loop, so names declared by `init` are visible to the condition,
/// the body and `post`, and vanish after the loop.
///
/// # Errors
/// `InvalidLoopHeader` if a header with `;` does not have three clauses.
pub fn parse_loop(cursor: &mut Cursor) -> ParseResult<Node> {
    let line = cursor.line();
    cursor.expect(TokenKind::Identifier, "for")?;

    if !has_clauses(cursor) {
        let condition = if cursor.at_kind(TokenKind::LeftBlock) {
            Node::literal(Literal::Bool(true), line)
        } else {
            parse_term(cursor)?
        };
        let body = parse_body(cursor, false)?;
        return Ok(Node::Loop { conditional: Conditional { condition: Box::new(condition),
                                                          body: Box::new(body),
                                                          line },
                               post: None,
                               line });
    }

    let init = if cursor.at_kind(TokenKind::Statement) { None } else { Some(parse_clause(cursor)?) };
    if !cursor.eat(TokenKind::Statement, ";") {
        return Err(ParseError::InvalidLoopHeader { line });
    }

    let condition = if cursor.at_kind(TokenKind::Statement) {
        Node::literal(Literal::Bool(true), line)
    } else {
        parse_term(cursor)?
    };
    if !cursor.eat(TokenKind::Statement, ";") {
        return Err(ParseError::InvalidLoopHeader { line });
    }

    let post = if cursor.at_kind(TokenKind::LeftBlock) { None } else { Some(Box::new(parse_clause(cursor)?)) };
    if !cursor.at_kind(TokenKind::LeftBlock) {
        return Err(ParseError::InvalidLoopHeader { line });
    }
    let body = parse_body(cursor, false)?;

    let mut statements = Vec::with_capacity(2);
    statements.extend(init);
    statements.push(Node::Loop { conditional: Conditional { condition: Box::new(condition),
                                                            body: Box::new(body),
                                                            line },
                                 post,
                                 line });
    Ok(Node::Sequence { statements,
                        substitute: true,
                        line })
}

/// Returns `true` if a `;` appears outside parentheses before the loop body.
fn has_clauses(cursor: &Cursor) -> bool {
    let mut depth = 0usize;
    let mut offset = 0;
    while let Some(token) = cursor.peek_nth(offset) {
        match token.kind {
            Some(TokenKind::LeftParen) => depth += 1,
            Some(TokenKind::RightParen) => depth = depth.saturating_sub(1),
            Some(TokenKind::Statement) if depth == 0 => return true,
            Some(TokenKind::LeftBlock | TokenKind::RightBlock) if depth == 0 => return false,
            _ => {},
        }
        offset += 1;
    }
    false
}

/// The initializer or post statement of a three-clause loop header.
fn parse_clause(cursor: &mut Cursor) -> ParseResult<Node> {
    if cursor.at_keyword("let") || cursor.at_keyword("var") {
        return parse_declaration(cursor);
    }
    if is_assignment(cursor) {
        return parse_assignment(cursor);
    }
    parse_term(cursor)
}

/// Parses a `match`.
///
/// Grammar:
/// ```text
/// match := "match" term "{" ("case" term block)* ("default" block)? "}"
/// ```
pub fn parse_match(cursor: &mut Cursor) -> ParseResult<Node> {
    let line = cursor.line();
    cursor.expect(TokenKind::Identifier, "match")?;
    let scrutinee = parse_term(cursor)?;
    cursor.expect(TokenKind::LeftBlock, "{")?;

    let mut cases = Vec::new();
    while cursor.at_keyword("case") {
        let case_line = cursor.line();
        cursor.next();
        let value = parse_term(cursor)?;
        let body = parse_body(cursor, true)?;
        cases.push(Case { value: Box::new(value),
                          body:  Box::new(body),
                          line:  case_line, });
    }

    let default = if cursor.eat(TokenKind::Identifier, "default") {
        Some(Box::new(parse_body(cursor, true)?))
    } else {
        None
    };
    cursor.expect(TokenKind::RightBlock, "}")?;

    Ok(Node::Match { scrutinee: Box::new(scrutinee),
                     cases,
                     default,
                     line })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::{lexer::lex, parser::core::strip_whitespace};

    fn parse_with(source: &str, parser: fn(&mut Cursor) -> ParseResult<Node>) -> ParseResult<Node> {
        let tokens = strip_whitespace(&lex(source))?;
        let mut cursor = Cursor::new(&tokens);
        let node = parser(&mut cursor)?;
        assert!(cursor.peek().is_none(), "trailing tokens after {source}");
        Ok(node)
    }

    #[test]
    fn branch_chains() {
        let Node::Branch { conditionals, otherwise, .. } =
            parse_with("if a { 1; } else if b { 2; } else if c { 3; } else { 4; }", parse_branch).unwrap()
        else {
            panic!("expected a branch");
        };
        assert_eq!(conditionals.len(), 3);
        assert!(matches!(otherwise.as_deref(), Some(Node::Sequence { substitute: true, .. })));
    }

    #[test]
    fn conditional_loop() {
        let node = parse_with("for i < 10 { i += 1; }", parse_loop).unwrap();
        assert!(matches!(node, Node::Loop { post: None, .. }));

        let node = parse_with("for { break; }", parse_loop).unwrap();
        let Node::Loop { conditional, .. } = node else {
            panic!("expected a loop");
        };
        assert!(matches!(*conditional.condition, Node::Literal { value: Literal::Bool(true), .. }));
    }

    #[test]
    fn three_clause_loop_is_scoped() {
        let node = parse_with("for var i = 0; i < 3; i += 1 { print(i); }", parse_loop).unwrap();
        let Node::Sequence { statements, substitute, .. } = node else {
            panic!("expected a sequence");
        };
        assert!(substitute);
        assert!(matches!(statements[0], Node::Declaration { .. }));
        assert!(matches!(statements[1], Node::Loop { post: Some(_), .. }));
    }

    #[test]
    fn empty_clauses() {
        let Node::Sequence { statements, .. } = parse_with("for ;; { break; }", parse_loop).unwrap() else {
            panic!("expected a sequence");
        };
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0], Node::Loop { post: None, .. }));
    }

    #[test]
    fn parentheses_hide_separators() {
        assert!(matches!(parse_with("for f(1, 2) { }", parse_loop), Ok(Node::Loop { .. })));
    }

    #[test]
    fn malformed_loop_headers() {
        assert!(matches!(parse_with("for a; b { }", parse_loop), Err(ParseError::InvalidLoopHeader { .. })));
        assert!(matches!(parse_with("for a; b; c; d { }", parse_loop),
                         Err(ParseError::InvalidLoopHeader { .. })));
    }

    #[test]
    fn match_cases() {
        let node = parse_with("match x { case 1 { a; } case 2 { fallthrough; } default { b; } }", parse_match).unwrap();
        let Node::Match { cases, default, .. } = node else {
            panic!("expected a match");
        };
        assert_eq!(cases.len(), 2);
        assert!(default.is_some());
        assert!(parse_with("match x { case 1 { } default { } case 2 { } }", parse_match).is_err());
    }
}
