use thiserror::Error;

/// Represents all errors that can occur during lexing or parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The lexer could not assign a kind to this piece of input.
    #[error("Error on line {line}: Unrecognized input '{token}'.")]
    UnrecognizedToken {
        /// The raw text that was not recognized.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Found an unexpected token while parsing.
    #[error("Error on line {line}: Unexpected token '{token}', expected {expected}.")]
    UnexpectedToken {
        /// The token encountered.
        token:    String,
        /// What the parser was looking for instead.
        expected: String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// Reached the end of input unexpectedly.
    #[error("Error on line {line}: Unexpected end of input, expected {expected}.")]
    UnexpectedEndOfInput {
        /// What the parser was looking for.
        expected: String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// An operator did not find enough operands to reduce.
    #[error("Error on line {line}: Missing operand for '{operator}', expected {expected} but found {found}.")]
    MissingOperand {
        /// The operator being reduced.
        operator: String,
        /// Number of operands the operator takes.
        expected: usize,
        /// Number of operands that were available.
        found:    usize,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// Two operands followed each other without an operator in between.
    #[error("Error on line {line}: Missing operator before '{token}'.")]
    MissingOperator {
        /// The operand that had no operator.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// An expression was required but nothing was found.
    #[error("Error on line {line}: Expected an expression.")]
    EmptyExpression {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A parenthesis was opened but not closed, or closed but never opened.
    #[error("Error on line {line}: Unbalanced parentheses.")]
    UnbalancedParentheses {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A statement was not followed by `;`.
    #[error("Error on line {line}: Expected ';' after statement, found '{token}'.")]
    MissingTerminator {
        /// The token found after the statement.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A declaration without values left a name without a type.
    #[error("Error on line {line}: '{alias}' needs a type annotation or a value.")]
    MissingTypeAnnotation {
        /// The name without a type.
        alias: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// The number of names and values in a declaration or assignment differ.
    #[error("Error on line {line}: Expected {expected} values but found {found}.")]
    ArityMismatch {
        /// Number of names on the left side.
        expected: usize,
        /// Number of values on the right side.
        found:    usize,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// A literal could not be converted into a value.
    #[error("Error on line {line}: Invalid literal {token}.")]
    InvalidLiteral {
        /// The literal as written.
        token: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A `for` header with `;` did not have exactly three clauses.
    #[error("Error on line {line}: Loop header needs three clauses separated by ';'.")]
    InvalidLoopHeader {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A keyword was used where a plain name is required.
    #[error("Error on line {line}: '{name}' is a reserved keyword.")]
    ReservedKeyword {
        /// The keyword.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
}

impl ParseError {
    /// Builds an `UnexpectedToken` error.
    pub(crate) fn unexpected(token: &str, expected: &str, line: usize) -> Self {
        Self::UnexpectedToken { token: token.to_string(),
                                expected: expected.to_string(),
                                line }
    }

    /// Builds an `UnexpectedEndOfInput` error.
    pub(crate) fn end_of_input(expected: &str, line: usize) -> Self {
        Self::UnexpectedEndOfInput { expected: expected.to_string(),
                                     line }
    }
}
