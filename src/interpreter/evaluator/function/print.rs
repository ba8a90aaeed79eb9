use std::io::Write;

use tracing::debug;

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
};

fn io_error(error: &std::io::Error, line: usize) -> RuntimeError {
    RuntimeError::Io { details: error.to_string(),
                       line }
}

/// Writes the formatted `text` argument and a newline to the context output.
///
/// Without argument only the newline is written. The value is formatted
/// with its datatype's formatter, so strings appear without quotes.
///
/// # Returns
/// `null`, so that the REPL does not echo the printed value.
///
/// # Example
/// ```
/// use std::{cell::RefCell, io::Write, rc::Rc};
///
/// use tealang::interpreter::{evaluator::core::Context, lexer::lex, parser::core::parse};
///
/// #[derive(Clone, Default)]
/// struct Buffer(Rc<RefCell<Vec<u8>>>);
///
/// impl Write for Buffer {
///     fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
///         self.0.borrow_mut().write(bytes)
///     }
///
///     fn flush(&mut self) -> std::io::Result<()> {
///         Ok(())
///     }
/// }
///
/// let buffer = Buffer::default();
/// let mut context = Context::new().with_output(Box::new(buffer.clone()));
/// context.eval(&parse(&lex("print(\"tea\"); print(1 + 1);")).unwrap()).unwrap();
///
/// assert_eq!(String::from_utf8(buffer.0.borrow().clone()).unwrap(), "tea\n2\n");
/// ```
pub fn print(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    let text = ctx.optional_argument("text")
                  .map(|value| value.to_string())
                  .unwrap_or_default();

    writeln!(ctx.output(), "{text}").map_err(|e| io_error(&e, line))?;
    Ok(Value::null())
}

/// Reads one line from the context input.
///
/// If a `text` argument is bound it is written as a prompt first. The
/// trailing line break is removed; end of input yields an empty string.
pub fn read(ctx: &mut Context, line: usize) -> EvalResult<Value> {
    if let Some(prompt) = ctx.optional_argument("text") {
        let output = ctx.output();
        write!(output, "{prompt}").map_err(|e| io_error(&e, line))?;
        output.flush().map_err(|e| io_error(&e, line))?;
    }

    let mut buffer = String::new();
    let read = ctx.input()
                  .read_line(&mut buffer)
                  .map_err(|e| io_error(&e, line))?;
    debug!(read, "read line");

    let text = buffer.trim_end_matches(['\n', '\r']);
    Ok(ctx.types.make_string(text))
}
