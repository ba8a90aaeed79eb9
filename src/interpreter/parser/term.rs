use tracing::trace;

use crate::{
    ast::{GraphNode, Literal, Node, TypeExpr},
    error::ParseError,
    interpreter::{
        lexer::{Token, TokenKind},
        parser::{
            core::{Cursor, ParseResult, is_keyword},
            function::parse_function_literal,
            utils::unescape,
        },
    },
};

/// Priority of an operator; higher binds tighter.
///
/// Returns `None` for symbols that cannot appear inside an expression, such
/// as `=` or `+=`.
#[must_use]
pub fn priority(symbol: &str, unary: bool) -> Option<u8> {
    let priority = match symbol {
        "+" | "-" if unary => 9,
        "&" | "|" => 8,
        "!" => 7,
        "^" => 6,
        "*" | "/" | "." => 5,
        "+" | "-" | ":" => 4,
        "%" => 3,
        "<" | ">" | "<=" | ">=" | "==" | "!=" => 2,
        "&&" | "||" | "^|" => 1,
        _ => return None,
    };
    Some(priority)
}

const CAST_PRIORITY: u8 = 4;

/// What the previous token of the expression was.
///
/// Decides whether `+` and `-` are unary and catches two operands in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Previous {
    Start,
    Operand,
    Operator,
    Open,
    Separator,
}

#[derive(Debug)]
enum Frame {
    Operator {
        symbol:   String,
        arity:    usize,
        priority: u8,
        line:     usize,
    },
    Cast {
        datatype: String,
        line:     usize,
    },
    Group {
        depth:    usize,
        elements: Vec<Node>,
    },
    Call {
        name:      String,
        depth:     usize,
        arguments: Vec<Node>,
        line:      usize,
    },
}

/// The two stacks of the shunting-yard algorithm.
///
/// Group and call frames remember how many operands existed when they were
/// opened; everything above that depth belongs to them.
struct TermParser {
    operands: Vec<Node>,
    stack:    Vec<Frame>,
    previous: Previous,
}

/// Parses one expression.
///
/// Implements shunting-yard with an operand stack and an operator stack.
/// Operators reduce everything on the stack with equal or higher priority
/// before being pushed, except the binding operators (unary operators and
/// `^`), which reduce nothing and therefore associate to the right.
///
/// Grammar (informal):
/// ```text
/// term    := operand (binary operand | ":" type-name)*
/// operand := unary* primary
/// primary := number | string | "true" | "false" | "null" | identifier
///          | identifier "(" terms? ")" | "(" term ")" | "(" terms ")"
///          | "func" function-literal
/// ```
///
/// Parsing stops without consuming at `;`, `{`, `}`, at a `,` that is not
/// inside parentheses, and at the end of input.
///
/// # Errors
/// - `MissingOperand` / `MissingOperator` for malformed operator sequences.
/// - `UnbalancedParentheses` for unmatched `(` or `)`.
/// - `EmptyExpression` if there is nothing to parse.
pub fn parse_term(cursor: &mut Cursor) -> ParseResult<Node> {
    let start_line = cursor.line();
    let mut parser = TermParser { operands: Vec::new(),
                                  stack:    Vec::new(),
                                  previous: Previous::Start, };

    while let Some(token) = cursor.peek() {
        match token.kind {
            Some(TokenKind::Separator) => {
                if !parser.separate(token.line)? {
                    break;
                }
                cursor.next();
            },
            Some(TokenKind::LeftParen) => {
                parser.check_operand_position(token)?;
                parser.stack.push(Frame::Group { depth:    parser.operands.len(),
                                                 elements: Vec::new(), });
                parser.previous = Previous::Open;
                cursor.next();
            },
            Some(TokenKind::RightParen) => {
                parser.close(token.line)?;
                cursor.next();
            },
            Some(TokenKind::Number) => {
                cursor.next();
                let node = match parser.negate_minimum(token) {
                    Some(node) => node,
                    None => number(token)?,
                };
                parser.push_operand(node, token)?;
            },
            Some(TokenKind::String) => {
                cursor.next();
                let text = unescape(&token.text, token.line)?;
                parser.push_operand(Node::literal(Literal::String(text), token.line), token)?;
            },
            Some(TokenKind::Identifier) => parser.identifier(cursor, token)?,
            Some(TokenKind::Operator) => parser.operator(cursor, token)?,
            _ => break,
        }
    }

    parser.finish(start_line)
}

fn number(token: &Token) -> ParseResult<Node> {
    let invalid = || ParseError::InvalidLiteral { token: token.text.clone(),
                                                  line:  token.line, };
    let literal = if token.text.contains('.') {
        Literal::Float(token.text.parse::<f64>().map_err(|_| invalid())?)
    } else {
        Literal::Integer(token.text.parse::<i64>().map_err(|_| invalid())?)
    };
    Ok(Node::literal(literal, token.line))
}

impl TermParser {
    /// Operands above the innermost open group or call.
    fn floor(&self) -> usize {
        self.stack
            .iter()
            .rev()
            .find_map(|frame| match frame {
                Frame::Group { depth, .. } | Frame::Call { depth, .. } => Some(*depth),
                Frame::Operator { .. } | Frame::Cast { .. } => None,
            })
            .unwrap_or(0)
    }

    /// Folds a pending unary `-` into `9223372036854775808`, the one integer
    /// literal that only fits an `i64` once negated.
    fn negate_minimum(&mut self, token: &Token) -> Option<Node> {
        if token.text.parse::<u64>().ok()? != i64::MIN.unsigned_abs() {
            return None;
        }
        match self.stack.last() {
            Some(Frame::Operator { symbol, arity: 1, .. }) if symbol == "-" => {},
            _ => return None,
        }
        self.stack.pop();
        Some(Node::literal(Literal::Integer(i64::MIN), token.line))
    }

    fn check_operand_position(&self, token: &Token) -> ParseResult<()> {
        if self.previous == Previous::Operand {
            return Err(ParseError::MissingOperator { token: token.text.clone(),
                                                     line:  token.line, });
        }
        Ok(())
    }

    fn push_operand(&mut self, node: Node, token: &Token) -> ParseResult<()> {
        self.check_operand_position(token)?;
        self.operands.push(node);
        self.previous = Previous::Operand;
        Ok(())
    }

    fn identifier(&mut self, cursor: &mut Cursor, token: &Token) -> ParseResult<()> {
        let literal = match token.text.as_str() {
            "true" => Some(Literal::Bool(true)),
            "false" => Some(Literal::Bool(false)),
            "null" => Some(Literal::Null),
            _ => None,
        };
        if let Some(literal) = literal {
            cursor.next();
            return self.push_operand(Node::literal(literal, token.line), token);
        }

        if token.text == "func" {
            self.check_operand_position(token)?;
            let function = parse_function_literal(cursor)?;
            return self.push_operand(function, token);
        }
        if is_keyword(&token.text) {
            return Err(ParseError::ReservedKeyword { name: token.text.clone(),
                                                     line: token.line, });
        }

        cursor.next();
        if cursor.at_kind(TokenKind::LeftParen) {
            self.check_operand_position(token)?;
            cursor.next();
            self.stack.push(Frame::Call { name:      token.text.clone(),
                                          depth:     self.operands.len(),
                                          arguments: Vec::new(),
                                          line:      token.line, });
            self.previous = Previous::Open;
            return Ok(());
        }

        let node = Node::Identifier { name: token.text.clone(),
                                      line: token.line, };
        self.push_operand(node, token)
    }

    fn operator(&mut self, cursor: &mut Cursor, token: &Token) -> ParseResult<()> {
        let symbol = token.text.as_str();
        if symbol == ":" {
            return self.cast(cursor, token);
        }

        let unary = symbol == "!" || (matches!(symbol, "+" | "-") && self.previous != Previous::Operand);
        let Some(priority) = priority(symbol, unary) else {
            return Err(ParseError::unexpected(symbol, "an expression operator", token.line));
        };

        if unary {
            self.check_operand_position(token)?;
        } else if self.previous != Previous::Operand {
            return Err(ParseError::MissingOperand { operator: symbol.to_string(),
                                                    expected: 2,
                                                    found:    0,
                                                    line:     token.line, });
        }

        if !unary && symbol != "^" {
            self.reduce_while(priority)?;
        }
        cursor.next();
        self.stack.push(Frame::Operator { symbol: symbol.to_string(),
                                          arity: if unary { 1 } else { 2 },
                                          priority,
                                          line: token.line });
        self.previous = Previous::Operator;
        Ok(())
    }

    /// Handles `operand:type`.
    ///
    /// The cast is a pending operator at the priority of binary `+`: it
    /// reduces what binds at least as tightly before it, and waits for
    /// tighter operators after it, so `7:float / 2` casts the quotient.
    fn cast(&mut self, cursor: &mut Cursor, token: &Token) -> ParseResult<()> {
        if self.previous != Previous::Operand {
            return Err(ParseError::MissingOperand { operator: ":".to_string(),
                                                    expected: 1,
                                                    found:    0,
                                                    line:     token.line, });
        }
        cursor.next();
        let name = match cursor.peek() {
            Some(name) if name.is_kind(TokenKind::Identifier) && (name.text == "func" || !is_keyword(&name.text)) => {
                cursor.next();
                name.text.clone()
            },
            Some(other) => return Err(ParseError::unexpected(&other.text, "a type name after ':'", other.line)),
            None => return Err(ParseError::end_of_input("a type name after ':'", token.line)),
        };

        self.reduce_while(CAST_PRIORITY)?;
        self.stack.push(Frame::Cast { datatype: name,
                                      line:     token.line, });
        Ok(())
    }

    fn pop_operands(&mut self, symbol: &str, arity: usize, line: usize) -> ParseResult<Vec<Node>> {
        let available = self.operands.len() - self.floor();
        if available < arity {
            return Err(ParseError::MissingOperand { operator: symbol.to_string(),
                                                    expected: arity,
                                                    found: available,
                                                    line });
        }
        Ok(self.operands.split_off(self.operands.len() - arity))
    }

    fn reduce(&mut self, symbol: String, arity: usize, line: usize) -> ParseResult<()> {
        let arguments = self.pop_operands(&symbol, arity, line)?;
        trace!(symbol, arity, "reduce");
        self.operands.push(Node::Operation { symbol,
                                             arguments,
                                             line });
        Ok(())
    }

    /// Reduces stacked operators and casts whose priority is at least
    /// `minimum`.
    fn reduce_while(&mut self, minimum: u8) -> ParseResult<()> {
        loop {
            let pending = match self.stack.last() {
                Some(Frame::Operator { priority, .. }) => *priority,
                Some(Frame::Cast { .. }) => CAST_PRIORITY,
                _ => break,
            };
            if pending < minimum {
                break;
            }
            match self.stack.pop() {
                Some(Frame::Operator { symbol, arity, line, .. }) => self.reduce(symbol, arity, line)?,
                Some(Frame::Cast { datatype, line }) => self.reduce_cast(&datatype, line)?,
                _ => {},
            }
        }
        Ok(())
    }

    fn reduce_cast(&mut self, datatype: &str, line: usize) -> ParseResult<()> {
        let arguments = self.pop_operands(":", 1, line)?;
        trace!(datatype, "reduce cast");
        self.operands.push(Node::Typecast { datatype: TypeExpr::named(datatype),
                                            arguments,
                                            line });
        Ok(())
    }

    /// Reduces every operator above the innermost group or call frame.
    ///
    /// Returns `false` if there is no such frame.
    fn reduce_to_frame(&mut self) -> ParseResult<bool> {
        self.reduce_while(0)?;
        Ok(!self.stack.is_empty())
    }

    /// Moves the single operand above a frame into its element list.
    fn take_element(&mut self, depth: usize, line: usize) -> ParseResult<Option<Node>> {
        match self.operands.len() - depth {
            0 => Ok(None),
            1 => Ok(self.operands.pop()),
            _ => Err(ParseError::MissingOperator { token: ",".to_string(),
                                                   line }),
        }
    }

    /// Handles `,`. Returns `false` at the top level, where the comma ends
    /// the expression instead.
    fn separate(&mut self, line: usize) -> ParseResult<bool> {
        if !self.stack
                .iter()
                .any(|frame| matches!(frame, Frame::Group { .. } | Frame::Call { .. }))
        {
            return Ok(false);
        }
        self.reduce_to_frame()?;

        let depth = self.floor();
        let element = self.take_element(depth, line)?
                          .ok_or(ParseError::EmptyExpression { line })?;
        match self.stack.last_mut() {
            Some(Frame::Group { elements, .. }) => elements.push(element),
            Some(Frame::Call { arguments, .. }) => arguments.push(element),
            _ => return Err(ParseError::UnbalancedParentheses { line }),
        }
        self.previous = Previous::Separator;
        Ok(true)
    }

    /// Handles `)`.
    fn close(&mut self, line: usize) -> ParseResult<()> {
        if !self.reduce_to_frame()? {
            return Err(ParseError::UnbalancedParentheses { line });
        }

        let node = match self.stack.pop() {
            Some(Frame::Group { depth, mut elements }) => {
                let last = self.take_element(depth, line)?
                               .ok_or(ParseError::EmptyExpression { line })?;
                if elements.is_empty() {
                    last
                } else {
                    elements.push(last);
                    Node::Tuple { elements, line }
                }
            },
            Some(Frame::Call { name,
                               depth,
                               mut arguments,
                               line: call_line, }) => {
                match self.take_element(depth, line)? {
                    Some(argument) => arguments.push(argument),
                    None if !arguments.is_empty() => return Err(ParseError::EmptyExpression { line }),
                    None => {},
                }
                Node::FunctionCall { name,
                                     arguments,
                                     line: call_line }
            },
            _ => return Err(ParseError::UnbalancedParentheses { line }),
        };

        self.operands.push(node);
        self.previous = Previous::Operand;
        Ok(())
    }

    fn finish(mut self, line: usize) -> ParseResult<Node> {
        while let Some(frame) = self.stack.pop() {
            match frame {
                Frame::Operator { symbol, arity, line, .. } => self.reduce(symbol, arity, line)?,
                Frame::Cast { datatype, line } => self.reduce_cast(&datatype, line)?,
                Frame::Group { .. } | Frame::Call { .. } => {
                    return Err(ParseError::UnbalancedParentheses { line });
                },
            }
        }

        match self.operands.len() {
            0 => Err(ParseError::EmptyExpression { line }),
            1 => self.operands
                     .pop()
                     .ok_or(ParseError::EmptyExpression { line }),
            _ => {
                let token = self.operands
                                .last()
                                .map(|node| GraphNode::Node(node).label())
                                .unwrap_or_default();
                Err(ParseError::MissingOperator { token, line })
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::{lexer::lex, parser::core::strip_whitespace};

    /// Renders a term as an s-expression.
    fn render(node: &Node) -> String {
        match node {
            Node::Literal { value, .. } => value.to_string(),
            Node::Identifier { name, .. } => name.clone(),
            Node::Operation { symbol, arguments, .. } | Node::FunctionCall { name: symbol, arguments, .. } => {
                let arguments = arguments.iter().map(render).collect::<Vec<_>>();
                if arguments.is_empty() {
                    format!("({symbol})")
                } else {
                    format!("({symbol} {})", arguments.join(" "))
                }
            },
            Node::Tuple { elements, .. } => {
                format!("[{}]", elements.iter().map(render).collect::<Vec<_>>().join(" "))
            },
            Node::Typecast { datatype, arguments, .. } => {
                format!("(:{datatype} {})", arguments.iter().map(render).collect::<String>())
            },
            Node::FunctionLiteral { parameters, .. } => format!("func/{}", parameters.len()),
            other => format!("{other:?}"),
        }
    }

    fn term(source: &str) -> ParseResult<(String, usize)> {
        let tokens = strip_whitespace(&lex(source))?;
        let mut cursor = Cursor::new(&tokens);
        let node = parse_term(&mut cursor)?;
        Ok((render(&node), cursor.position()))
    }

    fn shape(source: &str) -> String {
        term(source).unwrap().0
    }

    #[test]
    fn precedence_and_grouping() {
        assert_eq!(shape("1+2*3"), "(+ 1 (* 2 3))");
        assert_eq!(shape("(1+2)*3"), "(* (+ 1 2) 3)");
        assert_eq!(shape("1-2-3"), "(- (- 1 2) 3)");
        assert_eq!(shape("a < b && c != d"), "(&& (< a b) (!= c d))");
        assert_eq!(shape("a % b + c"), "(% a (+ b c))");
    }

    #[test]
    fn unary_operators() {
        assert_eq!(shape("-3+4"), "(+ (- 3) 4)");
        assert_eq!(shape("3--4"), "(- 3 (- 4))");
        assert_eq!(shape("!a == b"), "(== (! a) b)");
        assert_eq!(shape("-2^2"), "(- (^ 2 2))");
        assert_eq!(shape("2*-x"), "(* 2 (- x))");
    }

    #[test]
    fn power_binds_to_the_right() {
        assert_eq!(shape("2^3^2"), "(^ 2 (^ 3 2))");
        assert_eq!(shape("2^3*4"), "(* (^ 2 3) 4)");
    }

    #[test]
    fn casts_wait_for_tighter_operators() {
        assert_eq!(shape("x:float"), "(:float x)");
        assert_eq!(shape("1+2:float"), "(:float (+ 1 2))");
        assert_eq!(shape("7:float/2"), "(:float (/ 7 2))");
        assert_eq!(shape("x:int^2"), "(:int (^ x 2))");
        assert_eq!(shape("x:int+2"), "(+ (:int x) 2)");
        assert_eq!(shape("x:int%2"), "(% (:int x) 2)");
        assert_eq!(shape("x:int:string"), "(:string (:int x))");
        assert_eq!(shape("-x:int"), "(:int (- x))");
        assert_eq!(shape("(x:int)*2"), "(* (:int x) 2)");
        assert_eq!(shape("f(a:int, b)"), "(f (:int a) b)");
        assert_eq!(shape("f:func"), "(:func f)");
    }

    #[test]
    fn calls_and_tuples() {
        assert_eq!(shape("f()"), "(f)");
        assert_eq!(shape("f(1, g(2), 3+4)"), "(f 1 (g 2) (+ 3 4))");
        assert_eq!(shape("(1, 2, 3)"), "[1 2 3]");
        assert_eq!(shape("f((1, 2))"), "(f [1 2])");
        assert_eq!(shape("func(a, b) { return a; }"), "func/2");
    }

    #[test]
    fn smallest_integer_is_written_negated() {
        assert_eq!(shape("-9223372036854775808"), "-9223372036854775808");
        assert_eq!(shape("1 - -9223372036854775808"), "(- 1 -9223372036854775808)");
        assert!(matches!(term("9223372036854775808"), Err(ParseError::InvalidLiteral { .. })));
        assert!(matches!(term("1 - 9223372036854775808"), Err(ParseError::InvalidLiteral { .. })));
    }

    #[test]
    fn literals() {
        assert_eq!(shape("true"), "true");
        assert_eq!(shape("null"), "null");
        assert_eq!(shape("2.5"), "2.5");
        assert_eq!(shape("\"a\\nb\""), "\"a\\nb\"");
    }

    #[test]
    fn stops_at_delimiters_without_consuming() {
        assert_eq!(term("a + 1; b").unwrap(), ("(+ a 1)".to_string(), 3));
        assert_eq!(term("x { }").unwrap(), ("x".to_string(), 1));
        assert_eq!(term("1, 2").unwrap(), ("1".to_string(), 1));
    }

    #[test]
    fn malformed_terms() {
        assert!(matches!(term("1 +"), Err(ParseError::MissingOperand { .. })));
        assert!(matches!(term("* 2"), Err(ParseError::MissingOperand { .. })));
        assert!(matches!(term("1 2"), Err(ParseError::MissingOperator { .. })));
        assert!(matches!(term("(1 + 2"), Err(ParseError::UnbalancedParentheses { .. })));
        assert!(matches!(term("1 + 2)"), Err(ParseError::UnbalancedParentheses { .. })));
        assert!(matches!(term("()"), Err(ParseError::EmptyExpression { .. })));
        assert!(matches!(term("f(1,)"), Err(ParseError::EmptyExpression { .. })));
        assert!(matches!(term(";"), Err(ParseError::EmptyExpression { .. })));
        assert!(matches!(term("x:"), Err(ParseError::UnexpectedEndOfInput { .. })));
        assert!(matches!(term("x = 1"), Err(ParseError::UnexpectedToken { .. })));
        assert!(matches!(term("let"), Err(ParseError::ReservedKeyword { .. })));
    }
}
