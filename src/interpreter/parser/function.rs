use std::rc::Rc;

use crate::{
    ast::{Node, Parameter, TypeExpr},
    error::ParseError,
    interpreter::{
        lexer::TokenKind,
        parser::{
            core::{Cursor, ParseResult},
            term::priority,
            utils::{parse_body, parse_identifier, parse_type},
        },
    },
};

/// Everything after the name of a function or operator.
struct Definition {
    parameters: Vec<Parameter>,
    returns:    Option<TypeExpr>,
    body:       Rc<Node>,
}

/// Parses `(parameters) (":" type)? block`.
///
/// Parameters without a type take the type written after the following
/// names, as in `(a, b: int)`; trailing names without any type are `any`.
fn parse_definition(cursor: &mut Cursor) -> ParseResult<Definition> {
    cursor.expect(TokenKind::LeftParen, "(")?;

    let mut parameters = Vec::new();
    let mut pending = Vec::new();
    if !cursor.at_kind(TokenKind::RightParen) {
        loop {
            let (name, _) = parse_identifier(cursor, "a parameter name")?;
            pending.push(name);
            if cursor.eat(TokenKind::Operator, ":") {
                let datatype = parse_type(cursor)?;
                parameters.extend(pending.drain(..).map(|name| Parameter { name,
                                                                           datatype: datatype.clone() }));
            }
            if !cursor.eat(TokenKind::Separator, ",") {
                break;
            }
        }
    }
    parameters.extend(pending.into_iter().map(|name| Parameter { name,
                                                                 datatype: TypeExpr::named("any") }));
    cursor.expect(TokenKind::RightParen, ")")?;

    let returns = if cursor.eat(TokenKind::Operator, ":") { Some(parse_type(cursor)?) } else { None };
    let body = parse_body(cursor, false)?;

    Ok(Definition { parameters,
                    returns,
                    body: Rc::new(body) })
}

/// Parses an anonymous function used as a value, `func (a: int) { ... }`.
pub fn parse_function_literal(cursor: &mut Cursor) -> ParseResult<Node> {
    let line = cursor.line();
    cursor.expect(TokenKind::Identifier, "func")?;
    let Definition { parameters,
                     returns,
                     body, } = parse_definition(cursor)?;
    Ok(Node::FunctionLiteral { parameters,
                               returns,
                               body,
                               line })
}

/// Parses `func name(...) { ... }`.
///
/// The declaration binds a constant, so a named function cannot be replaced
/// later in the same scope.
pub fn parse_function_declaration(cursor: &mut Cursor) -> ParseResult<Node> {
    let line = cursor.line();
    cursor.expect(TokenKind::Identifier, "func")?;
    let (name, _) = parse_identifier(cursor, "a function name")?;
    let Definition { parameters,
                     returns,
                     body, } = parse_definition(cursor)?;

    let function = Node::FunctionLiteral { parameters,
                                           returns,
                                           body,
                                           line };
    Ok(Node::Declaration { aliases: vec![name],
                           constant: true,
                           values: vec![function],
                           line })
}

/// Parses `operator <symbol>(...) { ... }`.
///
/// # Errors
/// `UnexpectedToken` if the symbol cannot be used inside an expression, like
/// `=` or `:`.
pub fn parse_operator_definition(cursor: &mut Cursor) -> ParseResult<Node> {
    let line = cursor.line();
    cursor.expect(TokenKind::Identifier, "operator")?;

    let symbol = match cursor.next() {
        Some(token) if token.is_kind(TokenKind::Operator) && token.text != ":" && priority(&token.text, false).is_some() => {
            token.text.clone()
        },
        Some(token) => return Err(ParseError::unexpected(&token.text, "an operator symbol", token.line)),
        None => return Err(ParseError::end_of_input("an operator symbol", line)),
    };

    let Definition { parameters,
                     returns,
                     body, } = parse_definition(cursor)?;
    Ok(Node::OperatorDefinition { symbol,
                                  parameters,
                                  returns,
                                  body,
                                  line })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::{lexer::lex, parser::core::strip_whitespace};

    fn parse_with(source: &str, parser: fn(&mut Cursor) -> ParseResult<Node>) -> ParseResult<Node> {
        let tokens = strip_whitespace(&lex(source))?;
        parser(&mut Cursor::new(&tokens))
    }

    fn describe(parameters: &[Parameter]) -> Vec<String> {
        parameters.iter()
                  .map(|p| format!("{}: {}", p.name, p.datatype))
                  .collect()
    }

    #[test]
    fn parameter_groups_share_types() {
        let node = parse_with("func (a, b: int, c: string, d) { }", parse_function_literal).unwrap();
        let Node::FunctionLiteral { parameters, returns, .. } = node else {
            panic!("expected a function literal");
        };
        assert_eq!(describe(&parameters), ["a: int", "b: int", "c: string", "d: any"]);
        assert!(returns.is_none());
    }

    #[test]
    fn declarations_bind_constants() {
        let node = parse_with("func square(x: int): int { return x * x; }", parse_function_declaration).unwrap();
        let Node::Declaration { aliases,
                                constant,
                                values,
                                .. } = node
        else {
            panic!("expected a declaration");
        };
        assert_eq!(aliases, ["square"]);
        assert!(constant);
        assert!(matches!(&values[0], Node::FunctionLiteral { returns: Some(_), .. }));
    }

    #[test]
    fn operator_definitions() {
        let node = parse_with("operator +(a: string, b: int): string { return a; }", parse_operator_definition).unwrap();
        assert!(matches!(node, Node::OperatorDefinition { ref symbol, .. } if symbol == "+"));

        assert!(parse_with("operator =(a, b) { }", parse_operator_definition).is_err());
        assert!(parse_with("operator foo(a, b) { }", parse_operator_definition).is_err());
    }

    #[test]
    fn parameters_cannot_be_keywords() {
        assert!(matches!(parse_with("func (if) { }", parse_function_literal),
                         Err(ParseError::ReservedKeyword { .. })));
    }
}
