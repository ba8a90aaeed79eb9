use thiserror::Error;

/// Represents all errors that can occur during evaluation and runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Tried to use a name that no enclosing namespace stores.
    #[error("Error on line {line}: Unknown identifier '{name}'.")]
    UnknownIdentifier {
        /// The name that was looked up.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Used an operator symbol that no enclosing namespace stores.
    #[error("Error on line {line}: Unknown operator '{symbol}'.")]
    UnknownOperator {
        /// The operator symbol.
        symbol: String,
        /// The source line where the error occurred.
        line:   usize,
    },
    /// Referred to a datatype that does not exist.
    #[error("Error on line {line}: Unknown type '{name}'.")]
    UnknownType {
        /// The type name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tried to store a name twice in the same namespace.
    #[error("Error on line {line}: '{name}' is already declared in this scope.")]
    AlreadyDeclared {
        /// The name being declared.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tried to change a constant.
    #[error("Error on line {line}: Cannot assign to constant '{name}'.")]
    ConstantMutation {
        /// The constant's name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A value's type is not compatible with the type it must conform to.
    #[error("Error on line {line}: Type error: expected {expected}, found {found}.")]
    TypeMismatch {
        /// The required type.
        expected: String,
        /// The type that was found.
        found:    String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// A reference binding was assigned a plain value or vice versa.
    #[error("Error on line {line}: Cannot mix reference and value when assigning '{name}'.")]
    ReferenceMismatch {
        /// The name being assigned.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A datatype refused to convert a value.
    #[error("Error on line {line}: Cannot cast {from} to {to}: {details}.")]
    InvalidCast {
        /// The source type.
        from:    String,
        /// The target type.
        to:      String,
        /// Why the conversion failed.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// No overload of a function or operator accepts the arguments.
    #[error("Error on line {line}: No signature of '{name}' matches ({arguments}).")]
    NoMatchingSignature {
        /// The function name or operator symbol.
        name:      String,
        /// The argument types, comma separated.
        arguments: String,
        /// The source line where the error occurred.
        line:      usize,
    },
    /// A body returned a value that does not conform to the declared type.
    #[error("Error on line {line}: Expected return type {expected}, found {found}.")]
    ReturnTypeMismatch {
        /// The declared return type.
        expected: String,
        /// The type of the returned value.
        found:    String,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// Calls nested deeper than the evaluator allows.
    #[error("Error on line {line}: Maximum call depth of {limit} exceeded.")]
    RecursionLimit {
        /// The maximum depth.
        limit: usize,
        /// The source line of the call that went too deep.
        line:  usize,
    },
    /// A condition did not evaluate to a boolean.
    #[error("Error on line {line}: Expected bool as condition, found {found}.")]
    ExpectedBoolean {
        /// The type of the condition value.
        found: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// Tried to call something that is not a function.
    #[error("Error on line {line}: '{name}' is a {found}, not a function.")]
    NotCallable {
        /// The name being called.
        name:  String,
        /// The type of the value found.
        found: String,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// The number of names and values in a declaration or assignment differ.
    #[error("Error on line {line}: Expected {expected} values but found {found}.")]
    ArityMismatch {
        /// Number of names.
        expected: usize,
        /// Number of values.
        found:    usize,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// Datatypes are immutable once stored.
    #[error("Error on line {line}: Datatype '{name}' cannot be overridden.")]
    DatatypeOverride {
        /// The datatype name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A builtin body could not find one of its parameters.
    #[error("Error on line {line}: Missing argument '{name}'.")]
    MissingArgument {
        /// The parameter name.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Division or remainder by zero.
    #[error("Error on line {line}: Division by zero.")]
    DivisionByZero {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Integer arithmetic left the representable range.
    #[error("Error on line {line}: Integer overflow while trying to compute result.")]
    Overflow {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Reading from or writing to the host failed.
    #[error("Error on line {line}: I/O failure: {details}.")]
    Io {
        /// The underlying failure.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
}
