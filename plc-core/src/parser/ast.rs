use std::fmt::{self, Display, Formatter};

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::environment::prelude::{Function, Type, Variable};
use crate::utils::prelude::SrcSpan;

/// The root of the tree: all fields, in order, followed by all methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

/// `LET [CONST] name: Type [= value];` at the top level.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub type_name: String,
    pub constant: bool,
    pub value: Option<Expression>,
    pub location: SrcSpan,

    variable: Option<Variable>,
}

impl Field {
    pub fn new(
        name: String,
        type_name: String,
        constant: bool,
        value: Option<Expression>,
        location: SrcSpan,
    ) -> Self {
        Self { name, type_name, constant, value, location, variable: None }
    }

    pub fn set_variable(&mut self, variable: Variable) {
        debug_assert!(self.variable.is_none(), "field binding resolved twice");
        self.variable = Some(variable);
    }

    pub fn variable(&self) -> &Variable {
        self.variable.as_ref().expect("field binding not resolved")
    }
}

/// `DEF name(p: T, ...)[: R] DO statements END`.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub parameters: Vec<String>,
    pub parameter_type_names: Vec<String>,
    pub return_type_name: Option<String>,
    pub statements: Vec<Statement>,
    pub location: SrcSpan,

    function: Option<Function>,
}

impl Method {
    pub fn new(
        name: String,
        parameters: Vec<String>,
        parameter_type_names: Vec<String>,
        return_type_name: Option<String>,
        statements: Vec<Statement>,
        location: SrcSpan,
    ) -> Self {
        Self {
            name,
            parameters,
            parameter_type_names,
            return_type_name,
            statements,
            location,
            function: None,
        }
    }

    pub fn set_function(&mut self, function: Function) {
        debug_assert!(self.function.is_none(), "method binding resolved twice");
        self.function = Some(function);
    }

    pub fn function(&self) -> &Function {
        self.function.as_ref().expect("method binding not resolved")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(ExpressionStatement),
    Declaration(Declaration),
    Assignment(Assignment),
    If(If),
    For(For),
    While(While),
    Return(Return),
}

impl Statement {
    pub fn location(&self) -> SrcSpan {
        match self {
            Statement::Expression(statement) => statement.location,
            Statement::Declaration(declaration) => declaration.location,
            Statement::Assignment(assignment) => assignment.location,
            Statement::If(if_) => if_.location,
            Statement::For(for_) => for_.location,
            Statement::While(while_) => while_.location,
            Statement::Return(return_) => return_.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub location: SrcSpan,
}

/// `LET name[: Type] [= value];` inside a method body. The type annotation
/// may be omitted when an initializer is given.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub type_name: Option<String>,
    pub value: Option<Expression>,
    pub location: SrcSpan,

    variable: Option<Variable>,
}

impl Declaration {
    pub fn new(
        name: String,
        type_name: Option<String>,
        value: Option<Expression>,
        location: SrcSpan,
    ) -> Self {
        Self { name, type_name, value, location, variable: None }
    }

    pub fn set_variable(&mut self, variable: Variable) {
        debug_assert!(self.variable.is_none(), "declaration binding resolved twice");
        self.variable = Some(variable);
    }

    pub fn variable(&self) -> &Variable {
        self.variable.as_ref().expect("declaration binding not resolved")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub receiver: Expression,
    pub value: Expression,
    pub location: SrcSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: Expression,
    pub then_statements: Vec<Statement>,
    pub else_statements: Vec<Statement>,
    pub location: SrcSpan,
}

/// C-style loop header: initialization and increment are optional, and when
/// present are restricted by the grammar to `name = expression` assignments.
#[derive(Debug, Clone, PartialEq)]
pub struct For {
    pub initialization: Option<Box<Statement>>,
    pub condition: Expression,
    pub increment: Option<Box<Statement>>,
    pub statements: Vec<Statement>,
    pub location: SrcSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub condition: Expression,
    pub statements: Vec<Statement>,
    pub location: SrcSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub value: Expression,
    pub location: SrcSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Group(Group),
    Binary(Binary),
    Access(Access),
    Function(Call),
}

impl Expression {
    pub fn location(&self) -> SrcSpan {
        match self {
            Expression::Literal(literal) => literal.location,
            Expression::Group(group) => group.location,
            Expression::Binary(binary) => binary.location,
            Expression::Access(access) => access.location,
            Expression::Function(call) => call.location,
        }
    }

    /// The resolved static type. Only valid after analysis.
    pub fn ty(&self) -> Type {
        match self {
            Expression::Literal(literal) => literal.ty(),
            Expression::Group(group) => group.ty(),
            Expression::Binary(binary) => binary.ty(),
            Expression::Access(access) => access.variable().ty,
            Expression::Function(call) => call.function().return_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Nil,
    Boolean(bool),
    Integer(BigInt),
    Decimal(BigDecimal),
    Character(char),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: LiteralValue,
    pub location: SrcSpan,

    ty: Option<Type>,
}

impl Literal {
    pub fn new(value: LiteralValue, location: SrcSpan) -> Self {
        Self { value, location, ty: None }
    }

    pub fn set_ty(&mut self, ty: Type) {
        debug_assert!(self.ty.is_none(), "literal type resolved twice");
        self.ty = Some(ty);
    }

    pub fn ty(&self) -> Type {
        self.ty.expect("literal type not resolved")
    }
}

/// A parenthesized expression. The grammar accepts any expression inside the
/// parentheses; the analyzer rejects groups that do not wrap a binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub expression: Box<Expression>,
    pub location: SrcSpan,

    ty: Option<Type>,
}

impl Group {
    pub fn new(expression: Box<Expression>, location: SrcSpan) -> Self {
        Self { expression, location, ty: None }
    }

    pub fn set_ty(&mut self, ty: Type) {
        debug_assert!(self.ty.is_none(), "group type resolved twice");
        self.ty = Some(ty);
    }

    pub fn ty(&self) -> Type {
        self.ty.expect("group type not resolved")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub operator: String,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub location: SrcSpan,

    ty: Option<Type>,
}

impl Binary {
    pub fn new(
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
        location: SrcSpan,
    ) -> Self {
        Self { operator, left, right, location, ty: None }
    }

    pub fn set_ty(&mut self, ty: Type) {
        debug_assert!(self.ty.is_none(), "binary type resolved twice");
        self.ty = Some(ty);
    }

    pub fn ty(&self) -> Type {
        self.ty.expect("binary type not resolved")
    }
}

/// A variable read, either from the lexical scope (`name`) or from a field
/// of a receiver value (`receiver.name`).
#[derive(Debug, Clone, PartialEq)]
pub struct Access {
    pub receiver: Option<Box<Expression>>,
    pub name: String,
    pub location: SrcSpan,

    variable: Option<Variable>,
}

impl Access {
    pub fn new(receiver: Option<Box<Expression>>, name: String, location: SrcSpan) -> Self {
        Self { receiver, name, location, variable: None }
    }

    pub fn set_variable(&mut self, variable: Variable) {
        debug_assert!(self.variable.is_none(), "access binding resolved twice");
        self.variable = Some(variable);
    }

    pub fn variable(&self) -> &Variable {
        self.variable.as_ref().expect("access binding not resolved")
    }
}

/// A call, either of a scoped function (`name(args)`) or of a method on a
/// receiver value (`receiver.name(args)`).
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub receiver: Option<Box<Expression>>,
    pub name: String,
    pub arguments: Vec<Expression>,
    pub location: SrcSpan,

    function: Option<Function>,
}

impl Call {
    pub fn new(
        receiver: Option<Box<Expression>>,
        name: String,
        arguments: Vec<Expression>,
        location: SrcSpan,
    ) -> Self {
        Self { receiver, name, arguments, location, function: None }
    }

    pub fn set_function(&mut self, function: Function) {
        debug_assert!(self.function.is_none(), "call binding resolved twice");
        self.function = Some(function);
    }

    pub fn function(&self) -> &Function {
        self.function.as_ref().expect("call binding not resolved")
    }
}

// Rendering back to canonical source text, used by the read-parse-print loop
// and the `analyze` command output.

fn write_block(f: &mut Formatter<'_>, statements: &[Statement], indent: usize) -> fmt::Result {
    for statement in statements {
        write_statement(f, statement, indent)?;
    }

    Ok(())
}

fn write_statement(f: &mut Formatter<'_>, statement: &Statement, indent: usize) -> fmt::Result {
    let pad = "    ".repeat(indent);

    match statement {
        Statement::Expression(statement) => {
            writeln!(f, "{pad}{};", statement.expression)
        }
        Statement::Declaration(declaration) => {
            write!(f, "{pad}LET {}", declaration.name)?;

            if let Some(type_name) = &declaration.type_name {
                write!(f, ": {type_name}")?;
            }
            if let Some(value) = &declaration.value {
                write!(f, " = {value}")?;
            }

            writeln!(f, ";")
        }
        Statement::Assignment(assignment) => {
            writeln!(f, "{pad}{} = {};", assignment.receiver, assignment.value)
        }
        Statement::If(if_) => {
            writeln!(f, "{pad}IF {} DO", if_.condition)?;
            write_block(f, &if_.then_statements, indent + 1)?;

            if !if_.else_statements.is_empty() {
                writeln!(f, "{pad}ELSE")?;
                write_block(f, &if_.else_statements, indent + 1)?;
            }

            writeln!(f, "{pad}END")
        }
        Statement::For(for_) => {
            write!(f, "{pad}FOR (")?;

            if let Some(initialization) = &for_.initialization {
                if let Statement::Assignment(assignment) = initialization.as_ref() {
                    write!(f, "{} = {}", assignment.receiver, assignment.value)?;
                }
            }
            write!(f, "; {};", for_.condition)?;
            if let Some(increment) = &for_.increment {
                if let Statement::Assignment(assignment) = increment.as_ref() {
                    write!(f, " {} = {}", assignment.receiver, assignment.value)?;
                }
            }

            writeln!(f, ")")?;
            write_block(f, &for_.statements, indent + 1)?;
            writeln!(f, "{pad}END")
        }
        Statement::While(while_) => {
            writeln!(f, "{pad}WHILE {} DO", while_.condition)?;
            write_block(f, &while_.statements, indent + 1)?;
            writeln!(f, "{pad}END")
        }
        Statement::Return(return_) => {
            writeln!(f, "{pad}RETURN {};", return_.value)
        }
    }
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            '\u{0008}' => escaped.push_str("\\b"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            _ => escaped.push(ch),
        }
    }

    escaped
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for field in &self.fields {
            writeln!(f, "{field}")?;
        }
        for method in &self.methods {
            writeln!(f, "{method}")?;
        }

        Ok(())
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "LET ")?;

        if self.constant {
            write!(f, "CONST ")?;
        }
        write!(f, "{}: {}", self.name, self.type_name)?;
        if let Some(value) = &self.value {
            write!(f, " = {value}")?;
        }

        write!(f, ";")
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "DEF {}(", self.name)?;

        for (i, (parameter, type_name)) in self
            .parameters
            .iter()
            .zip(&self.parameter_type_names)
            .enumerate()
        {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{parameter}: {type_name}")?;
        }
        write!(f, ")")?;

        if let Some(return_type_name) = &self.return_type_name {
            write!(f, ": {return_type_name}")?;
        }

        writeln!(f, " DO")?;
        write_block(f, &self.statements, 1)?;
        write!(f, "END")
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(literal) => write!(f, "{}", literal.value),
            Expression::Group(group) => write!(f, "({})", group.expression),
            Expression::Binary(binary) => {
                write!(f, "{} {} {}", binary.left, binary.operator, binary.right)
            }
            Expression::Access(access) => {
                if let Some(receiver) = &access.receiver {
                    write!(f, "{receiver}.")?;
                }
                write!(f, "{}", access.name)
            }
            Expression::Function(call) => {
                if let Some(receiver) = &call.receiver {
                    write!(f, "{receiver}.")?;
                }
                write!(f, "{}(", call.name)?;
                for (i, argument) in call.arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{argument}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Display for LiteralValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Nil => write!(f, "NIL"),
            LiteralValue::Boolean(true) => write!(f, "TRUE"),
            LiteralValue::Boolean(false) => write!(f, "FALSE"),
            LiteralValue::Integer(value) => write!(f, "{value}"),
            LiteralValue::Decimal(value) => write!(f, "{value}"),
            LiteralValue::Character(value) => {
                write!(f, "'{}'", escape_text(&value.to_string()))
            }
            LiteralValue::String(value) => write!(f, "\"{}\"", escape_text(value)),
        }
    }
}
