use std::fmt::Display;

use crate::utils::prelude::SrcSpan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Integer,
    Decimal,
    Character,
    String,
    Operator,
}

/// One lexeme of the source text. `text` is the exact substring consumed,
/// including the quotes of character and string literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: SrcSpan,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: SrcSpan) -> Self {
        Self { kind, text: text.into(), span }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// Matches keywords and operators by their literal spelling. Keywords are
    /// not reserved; they are identifier tokens recognized by context.
    pub fn is_literal(&self, literal: &str) -> bool {
        self.text == literal
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Identifier => write!(f, "`{}`", self.text),
            TokenKind::Integer => write!(f, "an integer `{}`", self.text),
            TokenKind::Decimal => write!(f, "a decimal `{}`", self.text),
            TokenKind::Character => write!(f, "a character {}", self.text),
            TokenKind::String => write!(f, "a string {}", self.text),
            TokenKind::Operator => write!(f, "`{}`", self.text),
        }
    }
}
