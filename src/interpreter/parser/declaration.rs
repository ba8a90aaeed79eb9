use crate::{
    ast::{Node, TypeExpr},
    error::ParseError,
    interpreter::{
        lexer::TokenKind,
        parser::{
            core::{Cursor, ParseResult, is_keyword},
            utils::{parse_identifier, parse_term_list, parse_type},
        },
    },
};

/// Operators that assign to names, optionally combined with the old value.
const ASSIGNMENT_OPERATORS: &[&str] = &["=", "+=", "-=", "*=", "/=", "%=", "^="];

/// Parses `let` or `var` declarations.
///
/// Grammar (informal):
/// ```text
/// declaration := ("let" | "var") names ("=" terms)?
/// names       := name (":" type)? ("," name (":" type)?)*
/// ```
///
/// A type annotation applies to the names listed before it that have no type
/// yet, so `var a, b: int` declares two integers. Typed initializers are
/// wrapped in a cast; a declaration without initializers casts `null` into
/// each declared type.
///
/// # Errors
/// - `ArityMismatch` if the number of names and values differ.
/// - `MissingTypeAnnotation` if there are no values and a name has no type.
pub fn parse_declaration(cursor: &mut Cursor) -> ParseResult<Node> {
    let line = cursor.line();
    let constant = cursor.next().is_some_and(|token| token.text == "let");

    let mut aliases = Vec::new();
    let mut types: Vec<Option<TypeExpr>> = Vec::new();
    loop {
        let (alias, _) = parse_identifier(cursor, "a name to declare")?;
        aliases.push(alias);
        types.push(None);

        if cursor.eat(TokenKind::Operator, ":") {
            let datatype = parse_type(cursor)?;
            for slot in types.iter_mut().rev().take_while(|slot| slot.is_none()) {
                *slot = Some(datatype.clone());
            }
        }
        if !cursor.eat(TokenKind::Separator, ",") {
            break;
        }
    }

    let values = if cursor.eat(TokenKind::Operator, "=") {
        let values = parse_term_list(cursor)?;
        if values.len() != aliases.len() {
            return Err(ParseError::ArityMismatch { expected: aliases.len(),
                                                   found: values.len(),
                                                   line });
        }
        values.into_iter()
              .zip(&types)
              .map(|(value, datatype)| match datatype {
                  Some(datatype) => Node::Typecast { datatype: datatype.clone(),
                                                     arguments: vec![value],
                                                     line },
                  None => value,
              })
              .collect()
    } else {
        aliases.iter()
               .zip(types)
               .map(|(alias, datatype)| {
                   let datatype = datatype.ok_or_else(|| ParseError::MissingTypeAnnotation {
                       alias: alias.clone(),
                       line,
                   })?;
                   Ok(Node::Typecast { datatype,
                                       arguments: Vec::new(),
                                       line })
               })
               .collect::<ParseResult<Vec<_>>>()?
    };

    Ok(Node::Declaration { aliases,
                           constant,
                           values,
                           line })
}

/// Returns `true` if the cursor is at `name ("," name)*` followed by an
/// assignment operator. Consumes nothing.
pub fn is_assignment(cursor: &Cursor) -> bool {
    let mut offset = 0;
    loop {
        match cursor.peek_nth(offset) {
            Some(token) if token.is_kind(TokenKind::Identifier) && !is_keyword(&token.text) => offset += 1,
            _ => return false,
        }
        match cursor.peek_nth(offset) {
            Some(token) if token.is(TokenKind::Separator, ",") => offset += 1,
            Some(token) => {
                return token.is_kind(TokenKind::Operator) && ASSIGNMENT_OPERATORS.contains(&token.text.as_str());
            },
            None => return false,
        }
    }
}

/// Parses `names op terms`, where `op` is `=` or an update operator such as
/// `+=`.
///
/// # Errors
/// `ArityMismatch` if the number of names and values differ.
pub fn parse_assignment(cursor: &mut Cursor) -> ParseResult<Node> {
    let line = cursor.line();
    let mut aliases = vec![parse_identifier(cursor, "a name to assign")?.0];
    while cursor.eat(TokenKind::Separator, ",") {
        aliases.push(parse_identifier(cursor, "a name to assign")?.0);
    }

    let operator = match cursor.next() {
        Some(token) if ASSIGNMENT_OPERATORS.contains(&token.text.as_str()) => {
            token.text.strip_suffix('=').filter(|op| !op.is_empty()).map(str::to_string)
        },
        Some(token) => return Err(ParseError::unexpected(&token.text, "an assignment operator", token.line)),
        None => return Err(ParseError::end_of_input("an assignment operator", line)),
    };

    let values = parse_term_list(cursor)?;
    if values.len() != aliases.len() {
        return Err(ParseError::ArityMismatch { expected: aliases.len(),
                                               found: values.len(),
                                               line });
    }

    Ok(Node::Assignment { aliases,
                          operator,
                          values,
                          line })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::{lexer::lex, parser::core::strip_whitespace};

    fn declaration(source: &str) -> ParseResult<Node> {
        let tokens = strip_whitespace(&lex(source))?;
        parse_declaration(&mut Cursor::new(&tokens))
    }

    fn cast_names(values: &[Node]) -> Vec<String> {
        values.iter()
              .map(|value| match value {
                  Node::Typecast { datatype, arguments, .. } => format!("{datatype}/{}", arguments.len()),
                  _ => "plain".to_string(),
              })
              .collect()
    }

    #[test]
    fn annotation_applies_to_preceding_names() {
        let Node::Declaration { aliases,
                                constant,
                                values,
                                .. } = declaration("var a, b: int, c: string").unwrap()
        else {
            panic!("expected a declaration");
        };
        assert_eq!(aliases, ["a", "b", "c"]);
        assert!(!constant);
        assert_eq!(cast_names(&values), ["int/0", "int/0", "string/0"]);
    }

    #[test]
    fn typed_values_are_cast() {
        let Node::Declaration { values, constant, .. } = declaration("let a: float, b = 1, 2").unwrap() else {
            panic!("expected a declaration");
        };
        assert!(constant);
        assert_eq!(cast_names(&values), ["float/1", "plain"]);
    }

    #[test]
    fn parameterized_types() {
        let Node::Declaration { values, .. } = declaration("var xs: array<int>").unwrap() else {
            panic!("expected a declaration");
        };
        assert_eq!(cast_names(&values), ["array<int>/0"]);
    }

    #[test]
    fn rejects_malformed_declarations() {
        assert!(matches!(declaration("var a"), Err(ParseError::MissingTypeAnnotation { .. })));
        assert!(matches!(declaration("let a, b = 1"), Err(ParseError::ArityMismatch { .. })));
        assert!(matches!(declaration("let if = 1"), Err(ParseError::ReservedKeyword { .. })));
    }

    #[test]
    fn detects_assignments() {
        let check = |source: &str| {
            let tokens = strip_whitespace(&lex(source)).unwrap();
            is_assignment(&Cursor::new(&tokens))
        };
        assert!(check("a = 1"));
        assert!(check("a, b = b, a"));
        assert!(check("a ^= 2"));
        assert!(!check("a == 1"));
        assert!(!check("f(a, b)"));
        assert!(!check("a, 1"));
    }

    #[test]
    fn update_operators() {
        let tokens = strip_whitespace(&lex("a, b -= 1, 2")).unwrap();
        let Node::Assignment { aliases, operator, .. } = parse_assignment(&mut Cursor::new(&tokens)).unwrap() else {
            panic!("expected an assignment");
        };
        assert_eq!(aliases, ["a", "b"]);
        assert_eq!(operator.as_deref(), Some("-"));
    }
}
