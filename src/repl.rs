use std::{
    fs,
    io::{self, BufRead, Write},
    path::Path,
};

use tracing::{debug, info};

use crate::{
    error::Error,
    graph::to_graphviz,
    interpreter::{evaluator::core::Context, lexer::lex, parser::core::parse},
};

/// Switches for an [`Instance`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    /// Print the Graphviz rendering of each parsed program instead of
    /// evaluating it.
    pub output_graph: bool,
}

/// A running interpreter.
///
/// Declarations persist across calls to [`Instance::interpret`], so a shell
/// session or a sequence of loaded files share one global namespace.
pub struct Instance {
    context: Context,
    config:  Config,
}

impl Instance {
    /// Creates an instance with the builtin namespace loaded.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_context(config, Context::new())
    }

    /// Creates an instance around an existing context, for example one whose
    /// output has been redirected.
    #[must_use]
    pub const fn with_context(config: Config, context: Context) -> Self {
        Self { context, config }
    }

    /// The evaluation context.
    pub const fn context(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Lexes, parses and evaluates `input`.
    ///
    /// # Returns
    /// The formatted value of the program, or an empty string when it is
    /// `null`. With `output_graph` set, the DOT rendering of the program.
    ///
    /// # Errors
    /// The first parse or runtime error.
    ///
    /// # Example
    /// ```
    /// use tealang::repl::{Config, Instance};
    ///
    /// let mut instance = Instance::new(Config::default());
    /// instance.interpret("var x = 20;").unwrap();
    ///
    /// assert_eq!(instance.interpret("x + 22;").unwrap(), "42");
    /// assert_eq!(instance.interpret("null;").unwrap(), "");
    /// assert!(instance.interpret("let x = 1;").is_err());
    /// ```
    pub fn interpret(&mut self, input: &str) -> Result<String, Error> {
        let program = parse(&lex(input))?;
        if self.config.output_graph {
            return Ok(to_graphviz(&program));
        }

        let value = self.context.eval(&program)?;
        if value.is_null() {
            return Ok(String::new());
        }
        Ok(value.to_string())
    }

    /// Reads a script file and interprets it.
    ///
    /// # Errors
    /// `Error::Io` if the file cannot be read, otherwise the first error of
    /// the script.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<String, Error> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| Error::Io { path: path.display().to_string(),
                                                                          source })?;
        info!(path = %path.display(), "loading script");
        self.interpret(&source)
    }
}

/// Runs the interactive shell on stdin until end of input.
///
/// Each line is interpreted on its own; results are printed to stdout and
/// errors to stderr, after which the shell continues.
///
/// # Errors
/// Only failures of the terminal itself.
pub fn run_shell(config: Config) -> io::Result<()> {
    let mut instance = Instance::new(config);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        write!(stdout, "~> ")?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            debug!("shell closed");
            return Ok(());
        }

        match instance.interpret(&line) {
            Ok(result) if result.is_empty() => {},
            Ok(result) => writeln!(stdout, "{result}")?,
            Err(e) => eprintln!("{e}"),
        }
    }
}
