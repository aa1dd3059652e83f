use crate::lexer::prelude::LexicalError;
use crate::utils::prelude::SrcSpan;

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorType {
    ExpectedFieldOrMethod,
    ExpectedMethod,
    ExpectedIdent,
    ExpectedColon,
    ExpectedSemicolon,
    ExpectedOpeningParen,
    ExpectedClosingParen,
    ExpectedDo,
    ExpectedEnd,
    ExpectedExpression,
    ExpectedAssignment,
    UnexpectedEof,
    InvalidNumber {
        text: String,
    },
    LexError {
        error: LexicalError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub error: ParseErrorType,
    pub span: SrcSpan,
}

impl ParseError {
    pub fn details(&self) -> (&'static str, Vec<String>) {
        match &self.error {
            ParseErrorType::ExpectedFieldOrMethod => (
                "Expected `LET` or `DEF`",
                vec!["A source file is a sequence of fields followed by methods".into()],
            ),
            ParseErrorType::ExpectedMethod => (
                "Expected `DEF`",
                vec!["Fields must precede every method".into()],
            ),
            ParseErrorType::ExpectedIdent => ("Expected identifier", vec![]),
            ParseErrorType::ExpectedColon => ("Expected `:`", vec![]),
            ParseErrorType::ExpectedSemicolon => ("Expected `;`", vec![]),
            ParseErrorType::ExpectedOpeningParen => ("Expected `(`", vec![]),
            ParseErrorType::ExpectedClosingParen => ("Expected `)`", vec![]),
            ParseErrorType::ExpectedDo => ("Expected `DO`", vec![]),
            ParseErrorType::ExpectedEnd => ("Expected `END`", vec![]),
            ParseErrorType::ExpectedExpression => ("Expected expression", vec![]),
            ParseErrorType::ExpectedAssignment => (
                "Expected assignment",
                vec!["Loop headers only allow `name = expression` here".into()],
            ),
            ParseErrorType::UnexpectedEof => ("Unexpected end of file", vec![]),
            ParseErrorType::InvalidNumber { text } => (
                "Invalid number literal",
                vec![format!("`{text}` cannot be read as a number")],
            ),
            ParseErrorType::LexError { error } => error.details(),
        }
    }
}

pub fn parse_error<T>(error: ParseErrorType, span: SrcSpan) -> Result<T, ParseError> {
    Err(ParseError { error, span })
}
