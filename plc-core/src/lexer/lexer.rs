use super::error::{LexicalError, LexicalErrorType};
use super::token::{Token, TokenKind};
use crate::utils::prelude::SrcSpan;

pub type LexResult = std::result::Result<Token, LexicalError>;

/// Characters skipped between tokens.
fn is_insignificant(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\u{0008}')
}

fn is_escapable(ch: char) -> bool {
    matches!(ch, 'b' | 'n' | 'r' | 't' | '\'' | '"' | '\\')
}

/// Hand-written scanner over a stream of `(offset, char)` pairs with a
/// two-slot lookahead window. Token texts are accumulated as characters are
/// consumed, so the lexer works equally over in-memory strings and streamed
/// input.
#[derive(Debug)]
pub struct Lexer<T: Iterator<Item = (u32, char)>> {
    position: u32,
    next_position: u32,
    ch: Option<char>,
    next_ch: Option<char>,
    input: T,

    token_start: u32,
    text: String,
}

impl<T: Iterator<Item = (u32, char)>> Lexer<T> {
    pub fn new(input: T) -> Self {
        let mut lexer = Self {
            position: 0,
            next_position: 0,
            ch: None,
            next_ch: None,
            input,

            token_start: 0,
            text: String::new(),
        };

        lexer.next_char();
        lexer.next_char();

        lexer
    }

    /// Lexes the next token, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexicalError> {
        while matches!(self.ch, Some(ch) if is_insignificant(ch)) {
            self.next_char();
        }

        let ch = match self.ch {
            Some(ch) => ch,
            None => return Ok(None),
        };

        self.begin_token();

        let token = match ch {
            ch if ch.is_ascii_alphabetic() => self.lex_identifier(),
            ch if ch.is_ascii_digit() => self.lex_number()?,
            '+' | '-' if matches!(self.next_ch, Some(next) if next.is_ascii_digit()) => {
                self.lex_number()?
            }
            '\'' => self.lex_character()?,
            '"' => self.lex_string()?,
            _ => self.lex_operator(),
        };

        Ok(Some(token))
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.ch;

        let next = match self.input.next() {
            Some((pos, ch)) => {
                self.position = self.next_position;
                self.next_position = pos;

                Some(ch)
            }
            None => {
                self.position = self.next_position;
                self.next_position += 1;

                None
            }
        };

        self.ch = self.next_ch;
        self.next_ch = next;

        ch
    }

    fn begin_token(&mut self) {
        self.token_start = self.position;
        self.text.clear();
    }

    fn eat(&mut self) {
        if let Some(ch) = self.next_char() {
            self.text.push(ch);
        }
    }

    fn emit(&mut self, kind: TokenKind) -> Token {
        Token::new(
            kind,
            std::mem::take(&mut self.text),
            SrcSpan::new(self.token_start, self.position),
        )
    }

    fn error<A>(&self, error: LexicalErrorType) -> Result<A, LexicalError> {
        Err(LexicalError {
            error,
            location: SrcSpan::new(self.position, self.next_position),
        })
    }

    fn lex_identifier(&mut self) -> Token {
        self.eat();

        while matches!(
            self.ch,
            Some(ch) if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
        ) {
            self.eat();
        }

        self.emit(TokenKind::Identifier)
    }

    fn lex_number(&mut self) -> LexResult {
        if matches!(self.ch, Some('+') | Some('-')) {
            self.eat();
        }

        // A single leading zero only continues directly into a fraction.
        if self.ch == Some('0') {
            self.eat();

            return match self.ch {
                Some('.') => self.lex_fraction(),
                _ => Ok(self.emit(TokenKind::Integer)),
            };
        }

        while matches!(self.ch, Some(ch) if ch.is_ascii_digit()) {
            self.eat();
        }

        match self.ch {
            Some('.') => self.lex_fraction(),
            _ => Ok(self.emit(TokenKind::Integer)),
        }
    }

    fn lex_fraction(&mut self) -> LexResult {
        if !matches!(self.next_ch, Some(next) if next.is_ascii_digit()) {
            return self.error(LexicalErrorType::MissingDigitsAfterPeriod);
        }

        self.eat();

        while matches!(self.ch, Some(ch) if ch.is_ascii_digit()) {
            self.eat();
        }

        Ok(self.emit(TokenKind::Decimal))
    }

    fn lex_character(&mut self) -> LexResult {
        self.eat();

        match self.ch {
            Some('\\') => {
                self.eat();

                match self.ch {
                    Some(ch) if is_escapable(ch) => self.eat(),
                    Some(ch) => return self.error(LexicalErrorType::InvalidEscape { ch }),
                    None => return self.error(LexicalErrorType::UnterminatedCharacter),
                }
            }
            Some(ch) if ch != '\'' && ch != '\n' && ch != '\r' => self.eat(),
            Some(_) => return self.error(LexicalErrorType::InvalidCharacterLiteral),
            None => return self.error(LexicalErrorType::UnterminatedCharacter),
        }

        match self.ch {
            Some('\'') => {
                self.eat();
                Ok(self.emit(TokenKind::Character))
            }
            _ => self.error(LexicalErrorType::UnterminatedCharacter),
        }
    }

    fn lex_string(&mut self) -> LexResult {
        self.eat();

        loop {
            match self.ch {
                Some('"') => {
                    self.eat();
                    return Ok(self.emit(TokenKind::String));
                }
                Some('\\') => {
                    self.eat();

                    match self.ch {
                        Some(ch) if is_escapable(ch) => self.eat(),
                        Some(ch) => return self.error(LexicalErrorType::InvalidEscape { ch }),
                        None => return self.error(LexicalErrorType::UnterminatedString),
                    }
                }
                Some('\n') | Some('\r') | None => {
                    return self.error(LexicalErrorType::UnterminatedString)
                }
                Some(_) => self.eat(),
            }
        }
    }

    fn lex_operator(&mut self) -> Token {
        match self.ch {
            Some('<') | Some('>') | Some('!') | Some('=') => {
                self.eat();

                if self.ch == Some('=') {
                    self.eat();
                }
            }
            _ => self.eat(),
        }

        self.emit(TokenKind::Operator)
    }
}

impl<T: Iterator<Item = (u32, char)>> Iterator for Lexer<T> {
    type Item = LexResult;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Lexes a whole source string into a token vector, failing on the first
/// malformed character sequence.
pub fn lex(src: &str) -> Result<Vec<Token>, LexicalError> {
    Lexer::new(src.char_indices().map(|(i, c)| (i as u32, c))).collect()
}

/// Lexes from a character stream, tracking byte offsets as it goes.
pub fn lex_from_stream(
    stream: impl Iterator<Item = char>,
) -> Result<Vec<Token>, LexicalError> {
    Lexer::new(stream.scan(0, |pos, c| {
        *pos += c.len_utf8() as u32;
        Some((*pos - c.len_utf8() as u32, c))
    }))
    .collect()
}
