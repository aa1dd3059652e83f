use crate::lexer::prelude::{lex, lex_from_stream, LexicalErrorType, TokenKind};

fn kinds(src: &str) -> Vec<TokenKind> {
    lex(src)
        .expect("lexing failed")
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

fn texts(src: &str) -> Vec<String> {
    lex(src)
        .expect("lexing failed")
        .into_iter()
        .map(|token| token.text)
        .collect()
}

#[test]
fn test_hello_world() {
    let tokens = lex(r#"DEF main(): Integer DO print("Hello, World!"); RETURN 0; END"#)
        .expect("lexing failed");

    assert_eq!(tokens.len(), 16);
    assert_eq!(tokens[0].text, "DEF");
    assert_eq!(tokens[9].kind, TokenKind::String);
    assert_eq!(tokens[9].text, "\"Hello, World!\"");
    assert_eq!(tokens[15].text, "END");
}

#[test]
fn test_identifiers_continue_over_hyphens() {
    // Hyphens continue an identifier, so this is one token, not a
    // subtraction.
    assert_eq!(texts("a-b"), vec!["a-b"]);
    assert_eq!(texts("getName_1"), vec!["getName_1"]);
}

#[test]
fn test_numbers() {
    assert_eq!(kinds("1 123 1.5 0.25"), vec![
        TokenKind::Integer,
        TokenKind::Integer,
        TokenKind::Decimal,
        TokenKind::Decimal,
    ]);
}

#[test]
fn test_signed_numbers() {
    assert_eq!(texts("-5 +5"), vec!["-5", "+5"]);
    assert_eq!(kinds("-5"), vec![TokenKind::Integer]);

    // A sign not followed by a digit is an operator.
    assert_eq!(kinds("- 5"), vec![TokenKind::Operator, TokenKind::Integer]);
}

#[test]
fn test_leading_zero_does_not_continue() {
    // A leading zero only continues into a fraction, so `05` splits.
    assert_eq!(texts("05"), vec!["0", "5"]);
    assert_eq!(texts("0.5"), vec!["0.5"]);
}

#[test]
fn test_missing_digits_after_period() {
    let error = lex("7.").unwrap_err();

    assert_eq!(error.error, LexicalErrorType::MissingDigitsAfterPeriod);
    assert_eq!(error.location.start, 1);
}

#[test]
fn test_trailing_period_with_digits_before() {
    let error = lex("123.END").unwrap_err();

    assert_eq!(error.error, LexicalErrorType::MissingDigitsAfterPeriod);
}

#[test]
fn test_character_literals() {
    assert_eq!(kinds(r"'a' '\n' '\''"), vec![
        TokenKind::Character,
        TokenKind::Character,
        TokenKind::Character,
    ]);
}

#[test]
fn test_empty_character_rejected() {
    let error = lex("''").unwrap_err();

    assert_eq!(error.error, LexicalErrorType::InvalidCharacterLiteral);
}

#[test]
fn test_unterminated_character() {
    let error = lex("'ab'").unwrap_err();

    assert_eq!(error.error, LexicalErrorType::UnterminatedCharacter);
}

#[test]
fn test_string_escapes() {
    assert_eq!(texts(r#""a\nb""#), vec![r#""a\nb""#]);
}

#[test]
fn test_invalid_escape() {
    let error = lex(r#""a\qb""#).unwrap_err();

    assert_eq!(error.error, LexicalErrorType::InvalidEscape { ch: 'q' });
}

#[test]
fn test_unterminated_string() {
    let error = lex("\"abc").unwrap_err();

    assert_eq!(error.error, LexicalErrorType::UnterminatedString);
}

#[test]
fn test_newline_terminates_string() {
    let error = lex("\"abc\ndef\"").unwrap_err();

    assert_eq!(error.error, LexicalErrorType::UnterminatedString);
}

#[test]
fn test_two_character_operators() {
    assert_eq!(texts("< <= > >= == != ="), vec![
        "<", "<=", ">", ">=", "==", "!=", "="
    ]);
}

#[test]
fn test_any_character_is_an_operator() {
    // The operator rule is a catch-all for anything printable.
    assert_eq!(kinds("@ # $"), vec![
        TokenKind::Operator,
        TokenKind::Operator,
        TokenKind::Operator,
    ]);
}

#[test]
fn test_whitespace_is_skipped() {
    assert_eq!(texts(" \t\r\n a \u{0008} b "), vec!["a", "b"]);
}

#[test]
fn test_spans() {
    let tokens = lex("LET x = 10;").expect("lexing failed");

    assert_eq!(tokens[0].span.start, 0);
    assert_eq!(tokens[0].span.end, 3);
    assert_eq!(tokens[1].span.start, 4);
    assert_eq!(tokens[1].span.end, 5);
    assert_eq!(tokens[3].span.start, 8);
    assert_eq!(tokens[3].span.end, 10);
}

#[test]
fn test_stream_matches_in_memory() {
    let src = r#"DEF main() DO print("x"); END"#;

    let in_memory = lex(src).expect("lexing failed");
    let streamed = lex_from_stream(src.chars()).expect("lexing failed");

    assert_eq!(in_memory, streamed);
}
