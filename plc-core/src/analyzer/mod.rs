pub mod analyzer;
pub mod error;

pub mod prelude {
    pub use super::{analyzer::*, error::*};
}

use std::path::PathBuf;

use utf8_chars::BufReadCharsExt;

use crate::analyzer::prelude::analyze_source;
use crate::lexer::prelude::lex_from_stream;
use crate::parser::prelude::{parse_source, parse_source_str, Source};
use crate::utils::prelude::Error;

/// Runs the front half of the pipeline over a file: lex, parse and analyze,
/// yielding a fully annotated tree.
pub fn analyze(path: PathBuf) -> Result<Source, Error> {
    let src = match std::fs::read_to_string(&path) {
        Ok(src) => src,
        Err(err) => return Err(Error::StdIo { err: err.kind() }),
    };

    let mut source = match parse_source_str(&src) {
        Ok(source) => source,
        Err(error) => return Err(Error::Parse { path, src, error }),
    };

    match analyze_source(&mut source) {
        Ok(()) => Ok(source),
        Err(error) => Err(Error::Analyze { path, src, error }),
    }
}

/// Like [`analyze`], but lexes the file as a character stream instead of
/// reading it into memory up front. The source text still accumulates on the
/// side so failures can render a span.
pub fn analyze_from_stream(path: PathBuf) -> Result<Source, Error> {
    let file = match std::fs::File::open(&path) {
        Ok(file) => file,
        Err(err) => return Err(Error::StdIo { err: err.kind() }),
    };

    let file_size = file
        .metadata()
        .map_err(|err| Error::StdIo { err: err.kind() })?
        .len() as usize;

    let mut src = String::with_capacity(file_size);
    let mut reader = std::io::BufReader::new(file);
    let stream = reader.chars().map_while(|c| {
        let c = c.ok()?;
        src.push(c);
        Some(c)
    });

    let tokens = match lex_from_stream(stream) {
        Ok(tokens) => tokens,
        Err(error) => return Err(Error::Lex { path, src, error }),
    };

    let mut source = match parse_source(tokens) {
        Ok(source) => source,
        Err(error) => return Err(Error::Parse { path, src, error }),
    };

    match analyze_source(&mut source) {
        Ok(()) => Ok(source),
        Err(error) => Err(Error::Analyze { path, src, error }),
    }
}
