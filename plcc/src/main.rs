mod cli;
mod rlpl;
mod rppl;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use cli::{print_analyzed, print_analyzing, print_running};
use plc_core::analyzer::analyze_from_stream;
use plc_core::environment::prelude::Value;
use plc_core::eval::prelude::run_path;

#[derive(Parser)]
enum Command {
    /// Performs lexical, syntactical and semantical analysis
    Analyze {
        /// Path of source file
        path: PathBuf,
        /// Do not print the parsed source code
        #[arg(short, long, default_value_t = false)]
        no_output: bool,
        /// Print the ast instead of the parsed source code
        #[arg(long, default_value_t = false)]
        print_ast: bool,
    },
    /// Analyzes and interprets a source file, exiting with `main`'s result
    Run {
        /// Path of source file
        path: PathBuf,
    },
    /// Runs Read Lex Print Loop
    Rlpl,
    /// Runs Read Parse Print Loop
    Rppl,
}

fn main() -> ExitCode {
    match Command::parse() {
        Command::Analyze {
            path,
            no_output,
            print_ast,
        } => {
            let buf_writer = cli::stderr_buffer_writer();
            let mut buf = buf_writer.buffer();

            print_analyzing(&path.to_string_lossy());
            let start = std::time::Instant::now();

            let result = analyze_from_stream(path);

            match result {
                Ok(source) => {
                    if !no_output {
                        if print_ast {
                            println!("{source:#?}");
                        } else {
                            println!("{source}");
                        }
                    }
                }
                Err(err) => {
                    err.pretty(&mut buf);
                    buf_writer.print(&buf).expect("Writing error to stderr");

                    return ExitCode::FAILURE;
                }
            }

            print_analyzed(std::time::Instant::now() - start);

            ExitCode::SUCCESS
        }
        Command::Run { path } => {
            let buf_writer = cli::stderr_buffer_writer();
            let mut buf = buf_writer.buffer();

            print_running(&path.to_string_lossy());

            match run_path(path) {
                // `main`'s Integer result becomes the process exit code.
                Ok(Value::Integer(value)) => {
                    let code = u8::try_from(&value).unwrap_or(u8::MAX);

                    ExitCode::from(code)
                }
                Ok(_) => ExitCode::SUCCESS,
                Err(err) => {
                    err.pretty(&mut buf);
                    buf_writer.print(&buf).expect("Writing error to stderr");

                    ExitCode::FAILURE
                }
            }
        }
        Command::Rlpl => match rlpl::start() {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        },
        Command::Rppl => match rppl::start() {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        },
    }
}
