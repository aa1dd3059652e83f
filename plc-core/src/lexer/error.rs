use crate::utils::prelude::SrcSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexicalErrorType {
    MissingDigitsAfterPeriod,
    InvalidCharacterLiteral,
    UnterminatedCharacter,
    UnterminatedString,
    InvalidEscape { ch: char },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalError {
    pub error: LexicalErrorType,
    pub location: SrcSpan,
}

impl LexicalError {
    pub fn details(&self) -> (&'static str, Vec<String>) {
        match self.error {
            LexicalErrorType::MissingDigitsAfterPeriod => (
                "Missing digits after the decimal point",
                vec![],
            ),
            LexicalErrorType::InvalidCharacterLiteral => (
                "Character literals hold exactly one character or escape",
                vec![],
            ),
            LexicalErrorType::UnterminatedCharacter => (
                "Missing closing `'` of this character literal",
                vec![],
            ),
            LexicalErrorType::UnterminatedString => (
                "Missing closing `\"` of this string literal",
                vec![],
            ),
            LexicalErrorType::InvalidEscape { ch } => (
                "Unknown escape sequence",
                vec![format!(
                    "`\\{}` is not one of `\\b \\n \\r \\t \\' \\\" \\\\`",
                    ch.escape_default()
                )],
            ),
        }
    }
}
