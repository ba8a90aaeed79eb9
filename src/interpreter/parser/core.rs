use tracing::debug;

use crate::{
    ast::Node,
    error::ParseError,
    interpreter::{
        lexer::{Token, TokenKind},
        parser::{statement::parse_statements, term},
    },
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Words with a meaning of their own; never usable as names.
pub const KEYWORDS: &[&str] = &["let",
                                "var",
                                "return",
                                "break",
                                "continue",
                                "fallthrough",
                                "if",
                                "else",
                                "for",
                                "match",
                                "case",
                                "default",
                                "func",
                                "operator",
                                "true",
                                "false",
                                "null"];

/// Returns `true` if `word` is a keyword.
#[must_use]
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// A position in a whitespace-free token slice.
///
/// Every sub-parser takes the cursor by mutable reference and advances it
/// past what it consumed; nothing else carries parser state.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    tokens:   &'a [Token],
    position: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `tokens`.
    #[must_use]
    pub const fn new(tokens: &'a [Token]) -> Self {
        Self { tokens,
               position: 0 }
    }

    /// Number of tokens consumed so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// The next token, without consuming it.
    #[must_use]
    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    /// The token `n` positions ahead, without consuming anything.
    #[must_use]
    pub fn peek_nth(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.position + n)
    }

    /// Consumes and returns the next token.
    pub fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// The line of the next token, or of the last one at end of input.
    #[must_use]
    pub fn line(&self) -> usize {
        self.peek()
            .or_else(|| self.tokens.last())
            .map_or(1, |token| token.line)
    }

    /// Returns `true` if the next token has the given kind and text.
    #[must_use]
    pub fn at(&self, kind: TokenKind, text: &str) -> bool {
        self.peek().is_some_and(|token| token.is(kind, text))
    }

    /// Returns `true` if the next token has the given kind.
    #[must_use]
    pub fn at_kind(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|token| token.is_kind(kind))
    }

    /// Returns `true` if the next token is the given keyword.
    #[must_use]
    pub fn at_keyword(&self, keyword: &str) -> bool {
        self.at(TokenKind::Identifier, keyword)
    }

    /// Consumes the next token if it has the given kind and text.
    pub fn eat(&mut self, kind: TokenKind, text: &str) -> bool {
        if self.at(kind, text) {
            self.position += 1;
            return true;
        }
        false
    }

    /// Consumes a token of the given kind and text or fails.
    ///
    /// # Errors
    /// `UnexpectedToken` naming `expected`, or `UnexpectedEndOfInput`.
    pub fn expect(&mut self, kind: TokenKind, text: &str) -> ParseResult<&'a Token> {
        let expected = format!("'{text}'");
        match self.peek() {
            Some(token) if token.is(kind, text) => {
                self.position += 1;
                Ok(token)
            },
            Some(token) => Err(ParseError::unexpected(&token.text, &expected, token.line)),
            None => Err(ParseError::end_of_input(&expected, self.line())),
        }
    }
}

/// Removes whitespace tokens and rejects unrecognized input.
///
/// # Errors
/// `UnrecognizedToken` for the first token without a kind.
pub fn strip_whitespace(tokens: &[Token]) -> ParseResult<Vec<Token>> {
    let mut significant = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token.kind {
            None => {
                return Err(ParseError::UnrecognizedToken { token: token.text.clone(),
                                                           line:  token.line, });
            },
            Some(TokenKind::Whitespace | TokenKind::Comment) => {},
            Some(_) => significant.push(token.clone()),
        }
    }
    Ok(significant)
}

/// Parses a whole program.
///
/// The result is a sequence that does not open a scope of its own, so the
/// program's declarations land in the namespace it is evaluated in.
///
/// # Parameters
/// - `tokens`: Tokens as produced by the lexer, whitespace included.
///
/// # Returns
/// The root `Node::Sequence`.
///
/// # Errors
/// The first syntax error, including a `}` without matching `{`.
///
/// # Example
/// ```
/// use tealang::{
///     ast::Node,
///     interpreter::{lexer::lex, parser::core::parse},
/// };
///
/// let ast = parse(&lex("let x = 1; x + 2;")).unwrap();
/// let Node::Sequence { statements, substitute, .. } = ast else {
///     panic!("expected a sequence");
/// };
///
/// assert_eq!(statements.len(), 2);
/// assert!(!substitute);
/// assert!(parse(&lex("1 + ;")).is_err());
/// ```
pub fn parse(tokens: &[Token]) -> ParseResult<Node> {
    let tokens = strip_whitespace(tokens)?;
    let mut cursor = Cursor::new(&tokens);
    let program = parse_statements(&mut cursor, false)?;

    if let Some(token) = cursor.peek() {
        return Err(ParseError::unexpected(&token.text, "a statement", token.line));
    }
    debug!(tokens = tokens.len(), "parsed program");
    Ok(program)
}

/// Parses one expression from the start of a whitespace-free token slice.
///
/// Parsing stops before `;`, `{`, `}` or a top-level `,`.
///
/// # Returns
/// The expression and the number of tokens it consumed.
pub fn parse_term(tokens: &[Token]) -> ParseResult<(Node, usize)> {
    let mut cursor = Cursor::new(tokens);
    let node = term::parse_term(&mut cursor)?;
    Ok((node, cursor.position()))
}

/// Parses statements from the start of a whitespace-free token slice.
///
/// Parsing stops at the end of input or before an unmatched `}`.
///
/// # Returns
/// The sequence and the number of tokens it consumed.
pub fn parse_sequence(tokens: &[Token], substitute: bool) -> ParseResult<(Node, usize)> {
    let mut cursor = Cursor::new(tokens);
    let node = parse_statements(&mut cursor, substitute)?;
    Ok((node, cursor.position()))
}
