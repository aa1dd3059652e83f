use num_bigint::BigInt;

use crate::parser::prelude::{
    parse_source_str, Expression, LiteralValue, ParseError, ParseErrorType, Statement,
};

#[test]
fn test_fields_and_methods() -> Result<(), ParseError> {
    let input = r#"
        LET x: Integer;
        LET CONST limit: Integer = 10;

        DEF main(): Integer DO
            RETURN limit;
        END
    "#;

    let source = parse_source_str(input)?;

    assert_eq!(source.fields.len(), 2);
    assert_eq!(source.methods.len(), 1);

    assert_eq!(source.fields[0].name, "x");
    assert!(!source.fields[0].constant);
    assert!(source.fields[0].value.is_none());

    assert_eq!(source.fields[1].name, "limit");
    assert!(source.fields[1].constant);
    assert!(source.fields[1].value.is_some());

    assert_eq!(source.methods[0].name, "main");
    assert_eq!(source.methods[0].return_type_name.as_deref(), Some("Integer"));

    Ok(())
}

#[test]
fn test_empty_method_body() -> Result<(), ParseError> {
    let source = parse_source_str("DEF main(): Integer DO END")?;

    assert!(source.methods[0].statements.is_empty());

    Ok(())
}

#[test]
fn test_field_after_method_rejected() {
    let error = parse_source_str("DEF main() DO END LET x: Integer;").unwrap_err();

    assert_eq!(error.error, ParseErrorType::ExpectedMethod);
}

#[test]
fn test_source_without_method_rejected() {
    let error = parse_source_str("LET x: Integer;").unwrap_err();

    assert_eq!(error.error, ParseErrorType::ExpectedMethod);
}

#[test]
fn test_precedence() -> Result<(), ParseError> {
    let source = parse_source_str("DEF main() DO x = 1 + 2 * 3; END")?;

    let Statement::Assignment(assignment) = &source.methods[0].statements[0] else {
        panic!("expected an assignment");
    };

    // `*` binds tighter, so `+` ends up at the root.
    let Expression::Binary(sum) = &assignment.value else {
        panic!("expected a binary at the root");
    };
    assert_eq!(sum.operator, "+");

    let Expression::Binary(product) = sum.right.as_ref() else {
        panic!("expected a binary on the right");
    };
    assert_eq!(product.operator, "*");

    Ok(())
}

#[test]
fn test_logical_below_comparison() -> Result<(), ParseError> {
    let source = parse_source_str("DEF main() DO x = 1 < 2 AND 3 < 4; END")?;

    let Statement::Assignment(assignment) = &source.methods[0].statements[0] else {
        panic!("expected an assignment");
    };
    let Expression::Binary(root) = &assignment.value else {
        panic!("expected a binary at the root");
    };

    assert_eq!(root.operator, "AND");

    Ok(())
}

#[test]
fn test_if_else() -> Result<(), ParseError> {
    let input = r#"
        DEF main() DO
            IF TRUE DO
                print(1);
            ELSE
                print(2);
            END
        END
    "#;

    let source = parse_source_str(input)?;

    let Statement::If(if_) = &source.methods[0].statements[0] else {
        panic!("expected an if");
    };

    assert_eq!(if_.then_statements.len(), 1);
    assert_eq!(if_.else_statements.len(), 1);

    Ok(())
}

#[test]
fn test_for_header() -> Result<(), ParseError> {
    let input = r#"
        DEF main() DO
            FOR (i = 0; i < 5; i = i + 1)
                print(i);
            END
        END
    "#;

    let source = parse_source_str(input)?;

    let Statement::For(for_) = &source.methods[0].statements[0] else {
        panic!("expected a for");
    };

    assert!(for_.initialization.is_some());
    assert!(for_.increment.is_some());
    assert_eq!(for_.statements.len(), 1);

    Ok(())
}

#[test]
fn test_for_header_bare_headers() -> Result<(), ParseError> {
    let source = parse_source_str("DEF main() DO FOR (; x < 5;) END END")?;

    let Statement::For(for_) = &source.methods[0].statements[0] else {
        panic!("expected a for");
    };

    assert!(for_.initialization.is_none());
    assert!(for_.increment.is_none());

    Ok(())
}

#[test]
fn test_declaration_without_type() -> Result<(), ParseError> {
    let source = parse_source_str("DEF main() DO LET x = 5; END")?;

    let Statement::Declaration(declaration) = &source.methods[0].statements[0] else {
        panic!("expected a declaration");
    };

    assert!(declaration.type_name.is_none());
    assert!(declaration.value.is_some());

    Ok(())
}

#[test]
fn test_call_and_access_chain() -> Result<(), ParseError> {
    let source = parse_source_str("DEF main() DO x = object.field.method(1, 2); END")?;

    let Statement::Assignment(assignment) = &source.methods[0].statements[0] else {
        panic!("expected an assignment");
    };
    let Expression::Function(call) = &assignment.value else {
        panic!("expected a call");
    };

    assert_eq!(call.name, "method");
    assert_eq!(call.arguments.len(), 2);
    assert!(matches!(
        call.receiver.as_deref(),
        Some(Expression::Access(access)) if access.name == "field"
    ));

    Ok(())
}

#[test]
fn test_literals() -> Result<(), ParseError> {
    let source =
        parse_source_str(r#"DEF main() DO x = NIL; x = 'a'; x = "a\nb"; x = 1.5; END"#)?;

    let values: Vec<_> = source.methods[0]
        .statements
        .iter()
        .map(|statement| {
            let Statement::Assignment(assignment) = statement else {
                panic!("expected an assignment");
            };
            let Expression::Literal(literal) = &assignment.value else {
                panic!("expected a literal");
            };

            literal.value.clone()
        })
        .collect();

    assert_eq!(values[0], LiteralValue::Nil);
    assert_eq!(values[1], LiteralValue::Character('a'));
    assert_eq!(values[2], LiteralValue::String("a\nb".into()));
    assert!(matches!(values[3], LiteralValue::Decimal(_)));

    Ok(())
}

#[test]
fn test_negative_literal() -> Result<(), ParseError> {
    let source = parse_source_str("DEF main() DO x = -5; END")?;

    let Statement::Assignment(assignment) = &source.methods[0].statements[0] else {
        panic!("expected an assignment");
    };
    let Expression::Literal(literal) = &assignment.value else {
        panic!("expected a literal");
    };

    assert_eq!(literal.value, LiteralValue::Integer(BigInt::from(-5)));

    Ok(())
}

#[test]
fn test_missing_end_rejected() {
    let error = parse_source_str("DEF main() DO print(1);").unwrap_err();

    assert_eq!(error.error, ParseErrorType::UnexpectedEof);
}

#[test]
fn test_missing_semicolon_rejected() {
    let error = parse_source_str("DEF main() DO RETURN 1 END").unwrap_err();

    assert_eq!(error.error, ParseErrorType::ExpectedSemicolon);
}

#[test]
fn test_lex_error_surfaces() {
    let error = parse_source_str("DEF main() DO x = \"unterminated; END").unwrap_err();

    assert!(matches!(error.error, ParseErrorType::LexError { .. }));
}

#[test]
fn test_source_round_trips_through_display() -> Result<(), ParseError> {
    let input = r#"
        LET CONST greeting: String = "Hello, World!";

        DEF main(): Integer DO
            print(greeting);
            RETURN 0;
        END
    "#;

    // Spans shift between the original text and the canonical rendering, so
    // compare renderings, not trees.
    let rendered = parse_source_str(input)?.to_string();
    let rerendered = parse_source_str(&rendered)?.to_string();

    assert_eq!(rendered, rerendered);

    Ok(())
}
