use std::process::ExitCode;

use clap::Parser;
use tealang::repl::{Config, Instance, run_shell};
use tracing_subscriber::EnvFilter;

/// tealang is a small scripting language with typed values, overloaded
/// functions and user-defined operators.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Tells tea to look at a file instead of a script.
    #[arg(short, long)]
    file: bool,

    /// Prints the Graphviz rendering of the program instead of running it.
    #[arg(short, long)]
    graph: bool,

    /// Pipe mode automatically prints out the final value of a script.
    #[arg(short, long)]
    pipe_mode: bool,

    /// The script, or its path with `--file`. Starts the shell when absent.
    contents: Option<String>,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("warn"))
                                                  .unwrap_or_default();
    tracing_subscriber::fmt().with_env_filter(filter)
                             .with_writer(std::io::stderr)
                             .with_target(false)
                             .init();

    let args = Args::parse();
    let config = Config { output_graph: args.graph };

    let Some(contents) = args.contents else {
        return match run_shell(config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{e}");
                ExitCode::FAILURE
            },
        };
    };

    let mut instance = Instance::new(config);
    let result = if args.file { instance.load(&contents) } else { instance.interpret(&contents) };

    match result {
        Ok(output) => {
            if (args.pipe_mode || args.graph) && !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        },
    }
}
