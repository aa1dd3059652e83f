use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::lexer::prelude::{lex, Token, TokenKind};
use crate::utils::prelude::SrcSpan;

use super::ast::{
    Access, Assignment, Binary, Call, Declaration, Expression, ExpressionStatement, Field, For,
    Group, If, Literal, LiteralValue, Method, Return, Source, Statement, While,
};
use super::error::{parse_error, ParseError, ParseErrorType};

/// Parses a full token stream into a [`Source`] tree.
pub fn parse_source(tokens: Vec<Token>) -> Result<Source, ParseError> {
    Parser::new(tokens).parse()
}

/// Lexes and parses a source string in one step. Lexical errors surface as
/// parse errors so callers deal with a single failure type.
pub fn parse_source_str(src: &str) -> Result<Source, ParseError> {
    let tokens = lex(src).map_err(|error| ParseError {
        span: error.location,
        error: ParseErrorType::LexError { error },
    })?;

    parse_source(tokens)
}

pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, index: 0 }
    }

    pub fn parse(&mut self) -> Result<Source, ParseError> {
        let mut fields = vec![];
        let mut methods = vec![];

        while self.peek().is_some() {
            if self.peek_literal("LET") {
                if !methods.is_empty() {
                    let span = self.peek_span();

                    return parse_error(ParseErrorType::ExpectedMethod, span);
                }

                fields.push(self.parse_field()?);
            } else if self.peek_literal("DEF") {
                methods.push(self.parse_method()?);
            } else {
                let span = self.peek_span();

                return parse_error(ParseErrorType::ExpectedFieldOrMethod, span);
            }
        }

        if methods.is_empty() {
            let span = self.eof_span();

            return parse_error(ParseErrorType::ExpectedMethod, span);
        }

        Ok(Source { fields, methods })
    }

    // Declarations

    fn parse_field(&mut self) -> Result<Field, ParseError> {
        let start = self.peek_span().start;
        self.step();

        let constant = self.eat_literal("CONST");
        let (name, _) = self.expect_identifier()?;

        self.expect_literal(":", ParseErrorType::ExpectedColon)?;
        let (type_name, _) = self.expect_identifier()?;

        let value = if self.eat_literal("=") {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let end = self.expect_literal(";", ParseErrorType::ExpectedSemicolon)?;

        Ok(Field::new(
            name,
            type_name,
            constant,
            value,
            SrcSpan::new(start, end),
        ))
    }

    fn parse_method(&mut self) -> Result<Method, ParseError> {
        let start = self.peek_span().start;
        self.step();

        let (name, _) = self.expect_identifier()?;
        self.expect_literal("(", ParseErrorType::ExpectedOpeningParen)?;

        let mut parameters = vec![];
        let mut parameter_type_names = vec![];

        if !self.peek_literal(")") {
            loop {
                let (parameter, _) = self.expect_identifier()?;
                self.expect_literal(":", ParseErrorType::ExpectedColon)?;
                let (type_name, _) = self.expect_identifier()?;

                parameters.push(parameter);
                parameter_type_names.push(type_name);

                if !self.eat_literal(",") {
                    break;
                }
            }
        }

        self.expect_literal(")", ParseErrorType::ExpectedClosingParen)?;

        let return_type_name = if self.eat_literal(":") {
            Some(self.expect_identifier()?.0)
        } else {
            None
        };

        self.expect_literal("DO", ParseErrorType::ExpectedDo)?;
        let statements = self.parse_block(&["END"])?;
        let end = self.expect_literal("END", ParseErrorType::ExpectedEnd)?;

        Ok(Method::new(
            name,
            parameters,
            parameter_type_names,
            return_type_name,
            statements,
            SrcSpan::new(start, end),
        ))
    }

    // Statements

    /// Parses statements until one of the stop keywords or end of input.
    fn parse_block(&mut self, stops: &[&str]) -> Result<Vec<Statement>, ParseError> {
        let mut statements = vec![];

        loop {
            match self.peek() {
                None => return Ok(statements),
                Some(token) if stops.iter().any(|stop| token.is_literal(stop)) => {
                    return Ok(statements)
                }
                Some(_) => statements.push(self.parse_statement()?),
            }
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        if self.peek_literal("LET") {
            self.parse_declaration()
        } else if self.peek_literal("IF") {
            self.parse_if()
        } else if self.peek_literal("FOR") {
            self.parse_for()
        } else if self.peek_literal("WHILE") {
            self.parse_while()
        } else if self.peek_literal("RETURN") {
            self.parse_return()
        } else {
            self.parse_expression_statement()
        }
    }

    fn parse_declaration(&mut self) -> Result<Statement, ParseError> {
        let start = self.peek_span().start;
        self.step();

        let (name, _) = self.expect_identifier()?;

        let type_name = if self.eat_literal(":") {
            Some(self.expect_identifier()?.0)
        } else {
            None
        };

        let value = if self.eat_literal("=") {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let end = self.expect_literal(";", ParseErrorType::ExpectedSemicolon)?;

        Ok(Statement::Declaration(Declaration::new(
            name,
            type_name,
            value,
            SrcSpan::new(start, end),
        )))
    }

    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let start = self.peek_span().start;
        self.step();

        let condition = self.parse_expression()?;
        self.expect_literal("DO", ParseErrorType::ExpectedDo)?;

        let then_statements = self.parse_block(&["ELSE", "END"])?;
        let else_statements = if self.eat_literal("ELSE") {
            self.parse_block(&["END"])?
        } else {
            vec![]
        };

        let end = self.expect_literal("END", ParseErrorType::ExpectedEnd)?;

        Ok(Statement::If(If {
            condition,
            then_statements,
            else_statements,
            location: SrcSpan::new(start, end),
        }))
    }

    fn parse_for(&mut self) -> Result<Statement, ParseError> {
        let start = self.peek_span().start;
        self.step();

        self.expect_literal("(", ParseErrorType::ExpectedOpeningParen)?;

        let initialization = if self.peek_literal(";") {
            None
        } else {
            Some(Box::new(self.parse_header_assignment()?))
        };
        self.expect_literal(";", ParseErrorType::ExpectedSemicolon)?;

        let condition = self.parse_expression()?;
        self.expect_literal(";", ParseErrorType::ExpectedSemicolon)?;

        let increment = if self.peek_literal(")") {
            None
        } else {
            Some(Box::new(self.parse_header_assignment()?))
        };
        self.expect_literal(")", ParseErrorType::ExpectedClosingParen)?;

        let statements = self.parse_block(&["END"])?;
        let end = self.expect_literal("END", ParseErrorType::ExpectedEnd)?;

        Ok(Statement::For(For {
            initialization,
            condition,
            increment,
            statements,
            location: SrcSpan::new(start, end),
        }))
    }

    /// The `name = expression` form allowed in a `FOR` header, with no
    /// trailing semicolon.
    fn parse_header_assignment(&mut self) -> Result<Statement, ParseError> {
        let receiver = self.parse_expression()?;

        if !self.eat_literal("=") {
            let span = self.peek_span();

            return parse_error(ParseErrorType::ExpectedAssignment, span);
        }

        let value = self.parse_expression()?;
        let location = SrcSpan::new(receiver.location().start, value.location().end);

        Ok(Statement::Assignment(Assignment {
            receiver,
            value,
            location,
        }))
    }

    fn parse_while(&mut self) -> Result<Statement, ParseError> {
        let start = self.peek_span().start;
        self.step();

        let condition = self.parse_expression()?;
        self.expect_literal("DO", ParseErrorType::ExpectedDo)?;

        let statements = self.parse_block(&["END"])?;
        let end = self.expect_literal("END", ParseErrorType::ExpectedEnd)?;

        Ok(Statement::While(While {
            condition,
            statements,
            location: SrcSpan::new(start, end),
        }))
    }

    fn parse_return(&mut self) -> Result<Statement, ParseError> {
        let start = self.peek_span().start;
        self.step();

        let value = self.parse_expression()?;
        let end = self.expect_literal(";", ParseErrorType::ExpectedSemicolon)?;

        Ok(Statement::Return(Return {
            value,
            location: SrcSpan::new(start, end),
        }))
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, ParseError> {
        let expression = self.parse_expression()?;

        if self.eat_literal("=") {
            let value = self.parse_expression()?;
            let end = self.expect_literal(";", ParseErrorType::ExpectedSemicolon)?;

            return Ok(Statement::Assignment(Assignment {
                location: SrcSpan::new(expression.location().start, end),
                receiver: expression,
                value,
            }));
        }

        let end = self.expect_literal(";", ParseErrorType::ExpectedSemicolon)?;

        Ok(Statement::Expression(ExpressionStatement {
            location: SrcSpan::new(expression.location().start, end),
            expression,
        }))
    }

    // Expressions, by descending precedence.

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_logical()
    }

    /// `AND` and `OR` are keywords, so the logical level matches identifier
    /// tokens rather than operator tokens.
    fn parse_logical(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_equality()?;

        loop {
            let operator = match self.peek() {
                Some(token)
                    if token.is(TokenKind::Identifier)
                        && (token.is_literal("AND") || token.is_literal("OR")) =>
                {
                    token.text.clone()
                }
                _ => break,
            };
            self.step();

            let right = self.parse_equality()?;

            left = binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_additive()?;

        while let Some(operator) = self.eat_operator(&["<", "<=", ">", ">=", "==", "!="]) {
            let right = self.parse_additive()?;

            left = binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_multiplicative()?;

        while let Some(operator) = self.eat_operator(&["+", "-"]) {
            let right = self.parse_multiplicative()?;

            left = binary(operator, left, right);
        }

        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.parse_secondary()?;

        while let Some(operator) = self.eat_operator(&["*", "/"]) {
            let right = self.parse_secondary()?;

            left = binary(operator, left, right);
        }

        Ok(left)
    }

    /// Field accesses and method calls chained onto a primary with `.`.
    fn parse_secondary(&mut self) -> Result<Expression, ParseError> {
        let mut receiver = self.parse_primary()?;

        while self.eat_literal(".") {
            let (name, name_span) = self.expect_identifier()?;
            let start = receiver.location().start;

            receiver = if self.peek_literal("(") {
                let (arguments, end) = self.parse_arguments()?;

                Expression::Function(Call::new(
                    Some(Box::new(receiver)),
                    name,
                    arguments,
                    SrcSpan::new(start, end),
                ))
            } else {
                Expression::Access(Access::new(
                    Some(Box::new(receiver)),
                    name,
                    SrcSpan::new(start, name_span.end),
                ))
            };
        }

        Ok(receiver)
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let Some(token) = self.peek().cloned() else {
            let span = self.eof_span();

            return parse_error(ParseErrorType::UnexpectedEof, span);
        };

        match token.kind {
            TokenKind::Identifier if token.is_literal("NIL") => {
                self.step();
                Ok(literal(LiteralValue::Nil, token.span))
            }
            TokenKind::Identifier if token.is_literal("TRUE") => {
                self.step();
                Ok(literal(LiteralValue::Boolean(true), token.span))
            }
            TokenKind::Identifier if token.is_literal("FALSE") => {
                self.step();
                Ok(literal(LiteralValue::Boolean(false), token.span))
            }
            TokenKind::Identifier => {
                self.step();

                if self.peek_literal("(") {
                    let (arguments, end) = self.parse_arguments()?;

                    Ok(Expression::Function(Call::new(
                        None,
                        token.text,
                        arguments,
                        SrcSpan::new(token.span.start, end),
                    )))
                } else {
                    Ok(Expression::Access(Access::new(None, token.text, token.span)))
                }
            }
            TokenKind::Integer => {
                self.step();

                let value = BigInt::from_str(&token.text).map_err(|_| ParseError {
                    error: ParseErrorType::InvalidNumber {
                        text: token.text.clone(),
                    },
                    span: token.span,
                })?;

                Ok(literal(LiteralValue::Integer(value), token.span))
            }
            TokenKind::Decimal => {
                self.step();

                let value = BigDecimal::from_str(&token.text).map_err(|_| ParseError {
                    error: ParseErrorType::InvalidNumber {
                        text: token.text.clone(),
                    },
                    span: token.span,
                })?;

                Ok(literal(LiteralValue::Decimal(value), token.span))
            }
            TokenKind::Character => {
                self.step();

                let text = unescape(&token.text[1..token.text.len() - 1]);
                let value = text.chars().next().unwrap_or_default();

                Ok(literal(LiteralValue::Character(value), token.span))
            }
            TokenKind::String => {
                self.step();

                let text = unescape(&token.text[1..token.text.len() - 1]);

                Ok(literal(LiteralValue::String(text), token.span))
            }
            TokenKind::Operator if token.is_literal("(") => {
                self.step();

                let expression = self.parse_expression()?;
                let end = self.expect_literal(")", ParseErrorType::ExpectedClosingParen)?;

                Ok(Expression::Group(Group::new(
                    Box::new(expression),
                    SrcSpan::new(token.span.start, end),
                )))
            }
            TokenKind::Operator => {
                let span = token.span;

                parse_error(ParseErrorType::ExpectedExpression, span)
            }
        }
    }

    /// Parses `( expression, ... )` and returns the arguments with the end
    /// offset of the closing parenthesis.
    fn parse_arguments(&mut self) -> Result<(Vec<Expression>, u32), ParseError> {
        self.step();

        let mut arguments = vec![];

        if !self.peek_literal(")") {
            loop {
                arguments.push(self.parse_expression()?);

                if !self.eat_literal(",") {
                    break;
                }
            }
        }

        let end = self.expect_literal(")", ParseErrorType::ExpectedClosingParen)?;

        Ok((arguments, end))
    }

    // Token helpers

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn peek_literal(&self, literal: &str) -> bool {
        self.peek().is_some_and(|token| token.is_literal(literal))
    }

    fn step(&mut self) {
        self.index += 1;
    }

    fn eat_literal(&mut self, literal: &str) -> bool {
        if self.peek_literal(literal) {
            self.step();

            true
        } else {
            false
        }
    }

    fn eat_operator(&mut self, operators: &[&str]) -> Option<String> {
        let token = self.peek()?;

        if token.is(TokenKind::Operator) && operators.iter().any(|op| token.is_literal(op)) {
            let operator = token.text.clone();
            self.step();

            Some(operator)
        } else {
            None
        }
    }

    fn expect_literal(
        &mut self,
        literal: &str,
        error: ParseErrorType,
    ) -> Result<u32, ParseError> {
        match self.peek() {
            Some(token) if token.is_literal(literal) => {
                let end = token.span.end;
                self.step();

                Ok(end)
            }
            Some(token) => {
                let span = token.span;

                parse_error(error, span)
            }
            None => {
                let span = self.eof_span();

                parse_error(ParseErrorType::UnexpectedEof, span)
            }
        }
    }

    fn expect_identifier(&mut self) -> Result<(String, SrcSpan), ParseError> {
        match self.peek() {
            Some(token) if token.is(TokenKind::Identifier) => {
                let result = (token.text.clone(), token.span);
                self.step();

                Ok(result)
            }
            Some(token) => {
                let span = token.span;

                parse_error(ParseErrorType::ExpectedIdent, span)
            }
            None => {
                let span = self.eof_span();

                parse_error(ParseErrorType::UnexpectedEof, span)
            }
        }
    }

    /// The span to report errors at when looking at the current token, or a
    /// zero-width span at the end of input.
    fn peek_span(&self) -> SrcSpan {
        match self.peek() {
            Some(token) => token.span,
            None => self.eof_span(),
        }
    }

    fn eof_span(&self) -> SrcSpan {
        let end = self.tokens.last().map(|token| token.span.end).unwrap_or(0);

        SrcSpan::new(end, end)
    }
}

fn binary(operator: String, left: Expression, right: Expression) -> Expression {
    let location = SrcSpan::new(left.location().start, right.location().end);

    Expression::Binary(Binary::new(
        operator,
        Box::new(left),
        Box::new(right),
        location,
    ))
}

fn literal(value: LiteralValue, location: SrcSpan) -> Expression {
    Expression::Literal(Literal::new(value, location))
}

/// Decodes the escape sequences of a character or string literal body. The
/// lexer has already rejected unknown escapes.
fn unescape(text: &str) -> String {
    let mut decoded = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            decoded.push(ch);
            continue;
        }

        match chars.next() {
            Some('b') => decoded.push('\u{0008}'),
            Some('n') => decoded.push('\n'),
            Some('r') => decoded.push('\r'),
            Some('t') => decoded.push('\t'),
            Some('\'') => decoded.push('\''),
            Some('"') => decoded.push('"'),
            Some('\\') => decoded.push('\\'),
            Some(other) => decoded.push(other),
            None => {}
        }
    }

    decoded
}
