pub mod error;

pub mod prelude {
    pub use super::error::*;
    pub use super::{run_path, Builtin, Callable, Exec, Interpreter};
}

#[cfg(test)]
mod tests;

use std::cmp::Ordering;
use std::io::Write;
use std::path::PathBuf;

use bigdecimal::RoundingMode;
use num_traits::Zero;
use termcolor::{BufferWriter, ColorChoice};

use crate::analyzer::prelude::analyze_source;
use crate::environment::prelude::{ScopeId, Scopes, Type, Value, FALSE, TRUE};
use crate::parser::prelude::{
    parse_source_str, Binary, Expression, LiteralValue, Source, Statement,
};
use crate::utils::prelude::{Error, SrcSpan};

use error::{RuntimeError, RuntimeErrorType};

/// Outcome of executing one statement: either control flows on, or a
/// `RETURN` is unwinding towards the nearest call frame. Threading this
/// through statement execution keeps loop increments and scope teardown
/// explicit instead of hiding them in unwind machinery.
#[derive(Debug, Clone, PartialEq)]
pub enum Exec {
    Normal,
    Returning(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Print,
}

/// A function value living in the interpreter's scope chain: either a
/// built-in or a user-defined method body closed over the global scope.
#[derive(Debug, Clone, PartialEq)]
pub enum Callable {
    Builtin(Builtin),
    Function {
        parameters: Vec<String>,
        statements: Vec<Statement>,
    },
}

/// Tree-walking interpreter over an analyzed source. Generic over its output
/// sink so tests can capture what `print` writes.
pub struct Interpreter<W: Write> {
    scopes: Scopes<Value, Callable>,
    global: ScopeId,
    scope: ScopeId,
    output: W,
}

/// Runs the whole pipeline over a file and returns `main`'s result.
///
/// A runtime error is caught here at the outermost boundary, reported to
/// stderr, and the run completes with Nil; lex, parse and analysis errors
/// abort as usual.
pub fn run_path(path: PathBuf) -> Result<Value, Error> {
    let src = match std::fs::read_to_string(&path) {
        Ok(src) => src,
        Err(err) => return Err(Error::StdIo { err: err.kind() }),
    };

    let mut source = match parse_source_str(&src) {
        Ok(source) => source,
        Err(error) => return Err(Error::Parse { path, src, error }),
    };

    if let Err(error) = analyze_source(&mut source) {
        return Err(Error::Analyze { path, src, error });
    }

    let mut interpreter = Interpreter::new(std::io::stdout());

    match interpreter.execute(&source) {
        Ok(value) => Ok(value),
        Err(error) => {
            let error = Error::Runtime { path, src, error };

            let writer = BufferWriter::stderr(ColorChoice::Auto);
            let mut buffer = writer.buffer();
            error.pretty(&mut buffer);
            let _ = writer.print(&buffer);

            Ok(Value::Nil)
        }
    }
}

impl<W: Write> Interpreter<W> {
    pub fn new(output: W) -> Self {
        let (mut scopes, global) = Scopes::new();

        scopes.define_function(global, "print".into(), 1, Callable::Builtin(Builtin::Print));

        Self {
            scopes,
            global,
            scope: global,
            output,
        }
    }

    /// Registers every field and method in the global scope, then invokes
    /// `main` with no arguments and returns its result.
    pub fn execute(&mut self, source: &Source) -> Result<Value, RuntimeError> {
        for field in &source.fields {
            let value = match &field.value {
                Some(value) => self.evaluate(value)?,
                None => Value::Nil,
            };

            self.scopes
                .define_variable(self.global, field.name.clone(), value);
        }

        for method in &source.methods {
            self.scopes.define_function(
                self.global,
                method.name.clone(),
                method.parameters.len(),
                Callable::Function {
                    parameters: method.parameters.clone(),
                    statements: method.statements.clone(),
                },
            );
        }

        let location = source
            .methods
            .iter()
            .find(|method| method.name == "main")
            .map(|method| method.location)
            .unwrap_or_default();

        let main = self
            .scopes
            .lookup_function(self.global, "main", 0)
            .cloned()
            .ok_or(RuntimeError {
                error: RuntimeErrorType::UnboundFunction {
                    name: "main".into(),
                    arity: 0,
                },
                location,
            })?;

        self.call(main, vec![])
    }

    fn call(&mut self, callable: Callable, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        match callable {
            Callable::Builtin(Builtin::Print) => {
                for argument in &arguments {
                    let _ = writeln!(self.output, "{argument}");
                }

                Ok(Value::Nil)
            }
            Callable::Function {
                parameters,
                statements,
            } => {
                // Call frames hang off the global scope, not the caller's.
                let caller = self.scope;
                self.scope = self.scopes.child(self.global);

                for (parameter, argument) in parameters.iter().zip(arguments) {
                    self.scopes
                        .define_variable(self.scope, parameter.clone(), argument);
                }

                let outcome = self.run_statements(&statements);

                self.scope = caller;

                match outcome? {
                    Exec::Returning(value) => Ok(value),
                    Exec::Normal => Ok(Value::Nil),
                }
            }
        }
    }

    /// Executes statements in order until one starts a `RETURN` unwind.
    fn run_statements(&mut self, statements: &[Statement]) -> Result<Exec, RuntimeError> {
        for statement in statements {
            match self.execute_statement(statement)? {
                Exec::Normal => {}
                returning => return Ok(returning),
            }
        }

        Ok(Exec::Normal)
    }

    fn execute_statement(&mut self, statement: &Statement) -> Result<Exec, RuntimeError> {
        match statement {
            Statement::Expression(statement) => {
                self.evaluate(&statement.expression)?;

                Ok(Exec::Normal)
            }
            Statement::Declaration(declaration) => {
                let value = match &declaration.value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Nil,
                };

                self.scopes
                    .define_variable(self.scope, declaration.name.clone(), value);

                Ok(Exec::Normal)
            }
            Statement::Assignment(assignment) => {
                let value = self.evaluate(&assignment.value)?;

                let Expression::Access(access) = &assignment.receiver else {
                    return Err(RuntimeError {
                        error: RuntimeErrorType::UnboundVariable {
                            name: assignment.receiver.to_string(),
                        },
                        location: assignment.receiver.location(),
                    });
                };

                let variable = self
                    .scopes
                    .lookup_variable_mut(self.scope, &access.name)
                    .ok_or(RuntimeError {
                        error: RuntimeErrorType::UnboundVariable {
                            name: access.name.clone(),
                        },
                        location: access.location,
                    })?;

                *variable = value;

                Ok(Exec::Normal)
            }
            Statement::If(if_) => {
                let condition = self.evaluate(&if_.condition)?;

                if self.as_boolean(condition, if_.condition.location())? {
                    self.in_child_scope(|this| this.run_statements(&if_.then_statements))
                } else {
                    self.in_child_scope(|this| this.run_statements(&if_.else_statements))
                }
            }
            Statement::While(while_) => {
                loop {
                    let condition = self.evaluate(&while_.condition)?;

                    if !self.as_boolean(condition, while_.condition.location())? {
                        return Ok(Exec::Normal);
                    }

                    match self.in_child_scope(|this| this.run_statements(&while_.statements))? {
                        Exec::Normal => {}
                        returning => return Ok(returning),
                    }
                }
            }
            Statement::For(for_) => {
                if let Some(initialization) = &for_.initialization {
                    self.execute_statement(initialization)?;
                }

                loop {
                    let condition = self.evaluate(&for_.condition)?;

                    if !self.as_boolean(condition, for_.condition.location())? {
                        return Ok(Exec::Normal);
                    }

                    let outcome =
                        self.in_child_scope(|this| this.run_statements(&for_.statements))?;

                    // The increment runs after every iteration, even one a
                    // RETURN is unwinding out of.
                    if let Some(increment) = &for_.increment {
                        self.execute_statement(increment)?;
                    }

                    match outcome {
                        Exec::Normal => {}
                        returning => return Ok(returning),
                    }
                }
            }
            Statement::Return(return_) => {
                let value = self.evaluate(&return_.value)?;

                Ok(Exec::Returning(value))
            }
        }
    }

    fn evaluate(&mut self, expression: &Expression) -> Result<Value, RuntimeError> {
        match expression {
            Expression::Literal(literal) => Ok(match &literal.value {
                LiteralValue::Nil => Value::Nil,
                LiteralValue::Boolean(value) => Value::Boolean(*value),
                LiteralValue::Integer(value) => Value::Integer(value.clone()),
                LiteralValue::Decimal(value) => Value::Decimal(value.clone()),
                LiteralValue::Character(value) => Value::Character(*value),
                LiteralValue::String(value) => Value::String(value.clone()),
            }),
            Expression::Group(group) => self.evaluate(&group.expression),
            Expression::Binary(binary) => self.evaluate_binary(binary),
            Expression::Access(access) => match &access.receiver {
                // The primitive kinds carry no fields, so a receiver access
                // can only fail here.
                Some(_) => Err(RuntimeError {
                    error: RuntimeErrorType::UnboundVariable {
                        name: access.name.clone(),
                    },
                    location: access.location,
                }),
                None => self
                    .scopes
                    .lookup_variable(self.scope, &access.name)
                    .cloned()
                    .ok_or(RuntimeError {
                        error: RuntimeErrorType::UnboundVariable {
                            name: access.name.clone(),
                        },
                        location: access.location,
                    }),
            },
            Expression::Function(call) => {
                if call.receiver.is_some() {
                    return Err(RuntimeError {
                        error: RuntimeErrorType::UnboundFunction {
                            name: call.name.clone(),
                            arity: call.arguments.len(),
                        },
                        location: call.location,
                    });
                }

                let arguments = call
                    .arguments
                    .iter()
                    .map(|argument| self.evaluate(argument))
                    .collect::<Result<Vec<_>, _>>()?;

                let callable = self
                    .scopes
                    .lookup_function(self.scope, &call.name, call.arguments.len())
                    .cloned()
                    .ok_or(RuntimeError {
                        error: RuntimeErrorType::UnboundFunction {
                            name: call.name.clone(),
                            arity: call.arguments.len(),
                        },
                        location: call.location,
                    })?;

                self.call(callable, arguments)
            }
        }
    }

    fn evaluate_binary(&mut self, binary: &Binary) -> Result<Value, RuntimeError> {
        match binary.operator.as_str() {
            "AND" => {
                let left = self.evaluate(&binary.left)?;
                let left = self.as_boolean(left, binary.left.location())?;
                let right = self.evaluate(&binary.right)?;
                let right = self.as_boolean(right, binary.right.location())?;

                Ok(boolean(left && right))
            }
            // OR short-circuits, AND does not.
            "OR" => {
                let left = self.evaluate(&binary.left)?;

                if self.as_boolean(left, binary.left.location())? {
                    return Ok(TRUE);
                }

                let right = self.evaluate(&binary.right)?;
                let right = self.as_boolean(right, binary.right.location())?;

                Ok(boolean(right))
            }
            "==" => {
                let left = self.evaluate(&binary.left)?;
                let right = self.evaluate(&binary.right)?;

                Ok(boolean(left == right))
            }
            "!=" => {
                let left = self.evaluate(&binary.left)?;
                let right = self.evaluate(&binary.right)?;

                Ok(boolean(left != right))
            }
            operator @ ("<" | "<=" | ">" | ">=") => {
                let left = self.evaluate(&binary.left)?;
                let right = self.evaluate(&binary.right)?;

                let ordering = left.compare(&right).ok_or(RuntimeError {
                    error: RuntimeErrorType::TypeViolation {
                        expected: left.ty(),
                        found: right.ty(),
                    },
                    location: binary.right.location(),
                })?;

                let holds = match operator {
                    "<" => ordering == Ordering::Less,
                    "<=" => ordering != Ordering::Greater,
                    ">" => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                };

                Ok(boolean(holds))
            }
            operator => {
                let left = self.evaluate(&binary.left)?;
                let right = self.evaluate(&binary.right)?;

                self.arithmetic(operator, left, right, binary.location)
            }
        }
    }

    /// `+ - * /` dispatched on the left operand's runtime kind, with exact
    /// arbitrary-precision arithmetic.
    fn arithmetic(
        &mut self,
        operator: &str,
        left: Value,
        right: Value,
        location: SrcSpan,
    ) -> Result<Value, RuntimeError> {
        if operator == "+" && (left.ty() == Type::String || right.ty() == Type::String) {
            return Ok(Value::String(format!("{left}{right}")));
        }

        match (left, right) {
            (Value::Integer(left), Value::Integer(right)) => match operator {
                "+" => Ok(Value::Integer(left + right)),
                "-" => Ok(Value::Integer(left - right)),
                "*" => Ok(Value::Integer(left * right)),
                _ => {
                    if right.is_zero() {
                        return Err(RuntimeError {
                            error: RuntimeErrorType::DivisionByZero,
                            location,
                        });
                    }

                    // BigInt division already truncates towards zero.
                    Ok(Value::Integer(left / right))
                }
            },
            (Value::Decimal(left), Value::Decimal(right)) => match operator {
                "+" => Ok(Value::Decimal(left + right)),
                "-" => Ok(Value::Decimal(left - right)),
                "*" => Ok(Value::Decimal(left * right)),
                _ => {
                    if right.is_zero() {
                        return Err(RuntimeError {
                            error: RuntimeErrorType::DivisionByZero,
                            location,
                        });
                    }

                    // Half-to-even rounding at the dividend's scale.
                    let quotient = (&left / &right)
                        .with_scale_round(left.fractional_digit_count(), RoundingMode::HalfEven);

                    Ok(Value::Decimal(quotient))
                }
            },
            (left, right) => {
                let (expected, found) = match left {
                    Value::Integer(_) | Value::Decimal(_) => (left.ty(), right.ty()),
                    _ => (Type::Integer, left.ty()),
                };

                Err(RuntimeError {
                    error: RuntimeErrorType::TypeViolation { expected, found },
                    location,
                })
            }
        }
    }

    fn as_boolean(&self, value: Value, location: SrcSpan) -> Result<bool, RuntimeError> {
        match value {
            Value::Boolean(value) => Ok(value),
            value => Err(RuntimeError {
                error: RuntimeErrorType::TypeViolation {
                    expected: Type::Boolean,
                    found: value.ty(),
                },
                location,
            }),
        }
    }

    fn in_child_scope(
        &mut self,
        execute: impl FnOnce(&mut Self) -> Result<Exec, RuntimeError>,
    ) -> Result<Exec, RuntimeError> {
        let enclosing = self.scope;
        self.scope = self.scopes.child(enclosing);

        let outcome = execute(self);

        self.scope = enclosing;

        outcome
    }
}

fn boolean(value: bool) -> Value {
    if value {
        TRUE
    } else {
        FALSE
    }
}
