use std::path::PathBuf;

use termcolor::Buffer;
use thiserror::Error;

use crate::analyzer::prelude::AnalyzeError;
use crate::eval::prelude::RuntimeError;
use crate::lexer::prelude::LexicalError;
use crate::parser::prelude::{ParseError, ParseErrorType};
use crate::utils::prelude::SrcSpan;

use super::diagnostic::{Diagnostic, Label, Location};

/// Top-level error of the pipeline, one variant per fallible stage. Each
/// variant carries the path and source text so it can render a standalone
/// diagnostic.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("failed to lex source code")]
    Lex {
        path: PathBuf,
        src: String,
        error: LexicalError,
    },
    #[error("failed to parse source code")]
    Parse {
        path: PathBuf,
        src: String,
        error: ParseError,
    },
    #[error("semantic analysis failed")]
    Analyze {
        path: PathBuf,
        src: String,
        error: AnalyzeError,
    },
    #[error("execution failed")]
    Runtime {
        path: PathBuf,
        src: String,
        error: RuntimeError,
    },
    #[error("IO operation failed")]
    StdIo { err: std::io::ErrorKind },
}

impl Error {
    pub fn pretty_string(&self) -> String {
        let mut nocolor = Buffer::no_color();
        self.pretty(&mut nocolor);
        String::from_utf8(nocolor.into_inner()).expect("Error printing produced invalid utf8")
    }

    pub fn pretty(&self, buf: &mut Buffer) {
        use std::io::Write;

        for diagnostic in self.to_diagnostics() {
            diagnostic.write(buf);
            writeln!(buf).expect("write new line diagnostic");
        }
    }

    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Error::Lex { path, src, error } => {
                let (label, extra) = error.details();

                vec![diagnostic(
                    "Lexical error",
                    extra,
                    path,
                    src,
                    label,
                    error.location,
                )]
            }
            Error::Parse { path, src, error } => {
                let (label, extra) = error.details();

                // End-of-input errors point at a zero-width span past the
                // last token; anchor them to the end of the source instead.
                let span = match error.error {
                    ParseErrorType::UnexpectedEof => {
                        SrcSpan::new(src.len() as u32, src.len() as u32)
                    }
                    _ => error.span,
                };

                vec![diagnostic("Syntax error", extra, path, src, label, span)]
            }
            Error::Analyze { path, src, error } => {
                let (label, extra) = error.details();

                match error.location() {
                    Some(span) => {
                        vec![diagnostic("Semantic error", extra, path, src, label, span)]
                    }
                    None => vec![Diagnostic {
                        title: label.to_string(),
                        text: extra.join("\n"),
                        location: None,
                    }],
                }
            }
            Error::Runtime { path, src, error } => {
                let (label, extra) = error.details();

                vec![diagnostic(
                    "Runtime error",
                    extra,
                    path,
                    src,
                    label,
                    error.location,
                )]
            }
            Error::StdIo { err } => {
                vec![Diagnostic {
                    title: "Standard IO error".into(),
                    text: format!("{err}"),
                    location: None,
                }]
            }
        }
    }
}

fn diagnostic<'a>(
    title: &str,
    extra: Vec<String>,
    path: &PathBuf,
    src: &'a str,
    label: &str,
    span: SrcSpan,
) -> Diagnostic<'a> {
    Diagnostic {
        title: title.into(),
        text: extra.join("\n"),
        location: Some(Location {
            src,
            path: path.clone(),
            label: Label {
                text: Some(label.to_string()),
                span,
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::parser::prelude::parse_source_str;

    use super::Error;

    #[test]
    fn test_pretty_string_anchors_eof_to_end_of_source() {
        let src = String::from("DEF main() DO print(1);");
        let error = parse_source_str(&src).unwrap_err();

        let rendered = Error::Parse {
            path: PathBuf::from("main.plc"),
            src,
            error,
        }
        .pretty_string();

        assert!(rendered.contains("Syntax error"));
        assert!(rendered.contains("Unexpected end of file"));
    }
}
