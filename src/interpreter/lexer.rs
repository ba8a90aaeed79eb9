use logos::Logos;

/// The lexical category of a token.
///
/// Kinds are mutually exclusive. Comments are matched first and never leave
/// the lexer; whitespace is kept so that a token stream can be rendered back,
/// and is stripped by the parser before any grammar rule runs.
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[logos(extras = LexerExtras)]
pub enum TokenKind {
    /// `# Comments` up to, but not including, the next newline.
    #[token("#", skip_comment)]
    Comment,
    /// Blanks, tabs and newlines.
    #[regex(r"[ \t\r\f\n]+", |lex| {
        let newlines     = lex.slice().matches('\n').count();
        lex.extras.line += newlines;
        TokenKind::Whitespace
    })]
    Whitespace,
    /// `(`
    #[token("(")]
    LeftParen,
    /// `)`
    #[token(")")]
    RightParen,
    /// Operator symbols such as `+`, `<=`, `&&`, `^|` or the cast marker `:`.
    #[regex(r"[+\-*/=:<>!%^&|.]")]
    #[regex(r"[+\-*/^%<>=!]=")]
    #[token("||")]
    #[token("^|")]
    #[token("&&")]
    Operator,
    /// `,`
    #[token(",")]
    Separator,
    /// Numeric literal tokens, such as `42`, `3.5` or `2.`.
    #[regex(r"[0-9]+(\.[0-9]*)?")]
    Number,
    /// Identifier tokens; names and keywords such as `x`, `let` or `int`.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,
    /// Double quoted string literals with backslash escapes.
    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    String,
    /// `;`
    #[token(";")]
    Statement,
    /// `{`
    #[token("{")]
    LeftBlock,
    /// `}`
    #[token("}")]
    RightBlock,
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number for error reporting.
#[derive(Default)]
pub struct LexerExtras {
    /// The current line number in the source being tokenized.
    pub line: usize,
}

/// A single lexeme: its kind, the exact source text and the line it ends on.
///
/// `kind` is `None` when the input matched no kind at all. Such tokens are
/// kept in the stream so that the parser can report them instead of silently
/// dropping input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The lexical category, or `None` for unrecognized input.
    pub kind: Option<TokenKind>,
    /// The source text of the token.
    pub text: String,
    /// The source line of the token.
    pub line: usize,
}

impl Token {
    /// Returns `true` if the token has the given kind.
    #[must_use]
    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind == Some(kind)
    }

    /// Returns `true` if the token has the given kind and exact text.
    #[must_use]
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.is_kind(kind) && self.text == text
    }
}

/// Turns source text into a flat token stream.
///
/// Matching is greedy: a token keeps growing while the longer text still
/// belongs to the same kind, so `3.5` is one number and `<=` one operator,
/// while `--` stays two operators. Comments produce no token.
///
/// # Example
/// ```
/// use tealang::interpreter::lexer::{TokenKind, lex};
///
/// let tokens = lex("x+3.5*y");
/// let kinds = tokens.iter().map(|t| t.kind).collect::<Vec<_>>();
///
/// assert_eq!(kinds,
///            vec![Some(TokenKind::Identifier),
///                 Some(TokenKind::Operator),
///                 Some(TokenKind::Number),
///                 Some(TokenKind::Operator),
///                 Some(TokenKind::Identifier)]);
/// assert_eq!(tokens[2].text, "3.5");
/// ```
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer_with_extras(source, LexerExtras { line: 1 });

    while let Some(kind) = lexer.next() {
        tokens.push(Token { kind: kind.ok(),
                            text: lexer.slice().to_string(),
                            line: lexer.extras.line });
    }

    tokens
}

/// Skips a line comment up to the next newline.
///
/// # Parameters
/// - `lex`: Reference to the Logos lexer positioned after `#`.
///
/// # Returns
/// `logos::Skip`, so the comment never becomes a token.
fn skip_comment(lex: &mut logos::Lexer<TokenKind>) -> logos::Skip {
    let remainder = lex.remainder();
    let end = remainder.find('\n').unwrap_or(remainder.len());
    lex.bump(end);
    logos::Skip
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn significant(tokens: &[Token]) -> Vec<(Option<TokenKind>, String)> {
        tokens.iter()
              .filter(|t| !t.is_kind(TokenKind::Whitespace))
              .map(|t| (t.kind, t.text.clone()))
              .collect()
    }

    #[test]
    fn numbers_are_munched_whole() {
        let tokens = lex("x+3.5*y");
        assert_eq!(significant(&tokens),
                   vec![(Some(TokenKind::Identifier), "x".to_string()),
                        (Some(TokenKind::Operator), "+".to_string()),
                        (Some(TokenKind::Number), "3.5".to_string()),
                        (Some(TokenKind::Operator), "*".to_string()),
                        (Some(TokenKind::Identifier), "y".to_string())]);
    }

    #[test]
    fn operators_extend_only_within_their_kind() {
        let texts = lex("a<=b==c--d^|e&&f+=1").into_iter()
                                           .filter(|t| t.is_kind(TokenKind::Operator))
                                           .map(|t| t.text)
                                           .collect::<Vec<_>>();
        assert_eq!(texts, vec!["<=", "==", "-", "-", "^|", "&&", "+="]);
    }

    #[test]
    fn comments_are_dropped_and_lines_counted() {
        let tokens = lex("let x = 1; # set x\nx;");
        assert!(tokens.iter().all(|t| !t.text.contains("set")));

        let last = tokens.iter().rfind(|t| t.is_kind(TokenKind::Identifier)).unwrap();
        assert_eq!(last.text, "x");
        assert_eq!(last.line, 2);
    }

    #[test]
    fn strings_keep_their_escapes() {
        let tokens = lex(r#"print("a \"b\"");"#);
        let string = tokens.iter().find(|t| t.is_kind(TokenKind::String)).unwrap();
        assert_eq!(string.text, r#""a \"b\"""#);
    }

    #[test]
    fn unknown_characters_have_no_kind() {
        let tokens = lex("a @ b");
        let unknown = tokens.iter().find(|t| t.kind.is_none()).unwrap();
        assert_eq!(unknown.text, "@");
    }

    #[test]
    fn relexing_without_whitespace_is_stable() {
        let source = "for var i = 0; i < 10; i += 1 {\n  total = total + i * 2.5; # sum\n}";
        let first = significant(&lex(source));
        let rendered = first.iter().map(|(_, text)| text.as_str()).collect::<Vec<_>>().join(" ");

        assert_eq!(significant(&lex(&rendered)), first);

        let compact = significant(&lex("x+3.5*y"));
        let joined = compact.iter().map(|(_, text)| text.as_str()).collect::<String>();
        assert_eq!(significant(&lex(&joined)), compact);
    }
}
