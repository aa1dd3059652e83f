use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::Signed;

use crate::environment::prelude::{Function, ScopeId, Scopes, Type, Variable};
use crate::parser::prelude::{
    Access, Assignment, Declaration, Expression, Field, For, If, LiteralValue, Method, Return,
    Source, Statement, While,
};
use crate::utils::prelude::SrcSpan;

use super::error::AnalyzeError;

/// Single-pass semantic analyzer. Resolves every name against a scope chain,
/// checks every binding site with one assignability rule, and annotates the
/// tree in place with the resolved types and bindings the later stages read.
///
/// Fails fast on the first error; the tree must be discarded on failure as
/// its annotations are then only partially populated.
pub struct Analyzer {
    scopes: Scopes<Variable, Function>,
    scope: ScopeId,
    return_type: Option<Type>,
}

/// Analyzes a parsed source in place.
pub fn analyze_source(source: &mut Source) -> Result<(), AnalyzeError> {
    Analyzer::new().analyze(source)
}

impl Analyzer {
    pub fn new() -> Self {
        let (mut scopes, scope) = Scopes::new();

        // The whole built-in surface of the language.
        scopes.define_function(
            scope,
            "print".into(),
            1,
            Function {
                name: "print".into(),
                external_name: "System.out.println".into(),
                parameter_types: vec![Type::Any],
                return_type: Type::Nil,
            },
        );

        Self {
            scopes,
            scope,
            return_type: None,
        }
    }

    pub fn analyze(mut self, source: &mut Source) -> Result<(), AnalyzeError> {
        for field in &mut source.fields {
            self.analyze_field(field)?;
        }
        for method in &mut source.methods {
            self.analyze_method(method)?;
        }

        let main = source
            .methods
            .iter()
            .find(|method| method.name == "main" && method.parameters.is_empty());

        match main {
            Some(method) => self.require_assignable(
                Type::Integer,
                method.function().return_type,
                method.location,
            ),
            None => Err(AnalyzeError::MissingMain),
        }
    }

    fn analyze_field(&mut self, field: &mut Field) -> Result<(), AnalyzeError> {
        let ty = self.resolve_type(&field.type_name, field.location)?;

        if field.constant && field.value.is_none() {
            return Err(AnalyzeError::ConstantWithoutValue {
                location: field.location,
                name: field.name.clone(),
            });
        }

        // The initializer is analyzed before the binding exists, so a field
        // cannot observe itself.
        if let Some(value) = &mut field.value {
            self.analyze_expression(value)?;
            self.require_assignable(ty, value.ty(), value.location())?;
        }

        let variable = Variable {
            name: field.name.clone(),
            external_name: field.name.clone(),
            ty,
            constant: field.constant,
        };

        self.scopes
            .define_variable(self.scope, field.name.clone(), variable.clone());
        field.set_variable(variable);

        Ok(())
    }

    fn analyze_method(&mut self, method: &mut Method) -> Result<(), AnalyzeError> {
        let parameter_types = method
            .parameter_type_names
            .iter()
            .map(|name| self.resolve_type(name, method.location))
            .collect::<Result<Vec<_>, _>>()?;

        let return_type = match &method.return_type_name {
            Some(name) => self.resolve_type(name, method.location)?,
            None => Type::Nil,
        };

        let function = Function {
            name: method.name.clone(),
            external_name: method.name.clone(),
            parameter_types: parameter_types.clone(),
            return_type,
        };

        // Registered before the body is visited, so the method can call
        // itself and everything declared later.
        self.scopes.define_function(
            self.scope,
            method.name.clone(),
            method.parameters.len(),
            function.clone(),
        );
        method.set_function(function);

        let enclosing_scope = self.scope;
        let enclosing_return = self.return_type.replace(return_type);
        self.scope = self.scopes.child(enclosing_scope);

        for (parameter, ty) in method.parameters.iter().zip(parameter_types) {
            self.scopes.define_variable(
                self.scope,
                parameter.clone(),
                Variable {
                    name: parameter.clone(),
                    external_name: parameter.clone(),
                    ty,
                    constant: false,
                },
            );
        }

        let result = self.analyze_statements(&mut method.statements);

        self.scope = enclosing_scope;
        self.return_type = enclosing_return;

        result
    }

    fn analyze_statements(&mut self, statements: &mut [Statement]) -> Result<(), AnalyzeError> {
        for statement in statements {
            self.analyze_statement(statement)?;
        }

        Ok(())
    }

    fn analyze_statement(&mut self, statement: &mut Statement) -> Result<(), AnalyzeError> {
        match statement {
            Statement::Expression(statement) => {
                self.analyze_expression(&mut statement.expression)?;

                // Only calls can have an effect, everything else is a
                // discarded value.
                if !matches!(statement.expression, Expression::Function(_)) {
                    return Err(AnalyzeError::InvalidExpressionStatement {
                        location: statement.location,
                    });
                }

                Ok(())
            }
            Statement::Declaration(declaration) => self.analyze_declaration(declaration),
            Statement::Assignment(assignment) => self.analyze_assignment(assignment),
            Statement::If(if_) => self.analyze_if(if_),
            Statement::For(for_) => self.analyze_for(for_),
            Statement::While(while_) => self.analyze_while(while_),
            Statement::Return(return_) => self.analyze_return(return_),
        }
    }

    fn analyze_declaration(&mut self, declaration: &mut Declaration) -> Result<(), AnalyzeError> {
        if let Some(value) = &mut declaration.value {
            self.analyze_expression(value)?;
        }

        let ty = match (&declaration.type_name, &declaration.value) {
            (Some(name), _) => self.resolve_type(name, declaration.location)?,
            (None, Some(value)) => value.ty(),
            (None, None) => {
                return Err(AnalyzeError::DeclarationWithoutType {
                    location: declaration.location,
                    name: declaration.name.clone(),
                })
            }
        };

        if let Some(value) = &declaration.value {
            self.require_assignable(ty, value.ty(), value.location())?;
        }

        let variable = Variable {
            name: declaration.name.clone(),
            external_name: declaration.name.clone(),
            ty,
            constant: false,
        };

        self.scopes
            .define_variable(self.scope, declaration.name.clone(), variable.clone());
        declaration.set_variable(variable);

        Ok(())
    }

    fn analyze_assignment(&mut self, assignment: &mut Assignment) -> Result<(), AnalyzeError> {
        let Expression::Access(access) = &mut assignment.receiver else {
            return Err(AnalyzeError::InvalidAssignmentTarget {
                location: assignment.receiver.location(),
            });
        };

        self.analyze_access(access)?;

        if access.variable().constant {
            return Err(AnalyzeError::AssignmentToConstant {
                location: access.location,
                name: access.name.clone(),
            });
        }

        self.analyze_expression(&mut assignment.value)?;
        self.require_assignable(
            assignment.receiver.ty(),
            assignment.value.ty(),
            assignment.value.location(),
        )
    }

    fn analyze_if(&mut self, if_: &mut If) -> Result<(), AnalyzeError> {
        self.analyze_expression(&mut if_.condition)?;
        self.require_assignable(Type::Boolean, if_.condition.ty(), if_.condition.location())?;

        if if_.then_statements.is_empty() {
            return Err(AnalyzeError::EmptyBody {
                location: if_.location,
                construct: "IF",
            });
        }

        self.in_child_scope(|this| this.analyze_statements(&mut if_.then_statements))?;
        self.in_child_scope(|this| this.analyze_statements(&mut if_.else_statements))
    }

    fn analyze_for(&mut self, for_: &mut For) -> Result<(), AnalyzeError> {
        if for_.statements.is_empty() {
            return Err(AnalyzeError::EmptyBody {
                location: for_.location,
                construct: "FOR",
            });
        }

        self.in_child_scope(|this| {
            let initialization_ty = match &mut for_.initialization {
                Some(statement) => Some(this.analyze_header_assignment(statement)?),
                None => None,
            };

            this.analyze_expression(&mut for_.condition)?;
            this.require_assignable(
                Type::Boolean,
                for_.condition.ty(),
                for_.condition.location(),
            )?;

            if let Some(statement) = &mut for_.increment {
                let increment_ty = this.analyze_header_assignment(statement)?;

                // The increment must drive the same control variable type as
                // the initialization.
                if let Some(initialization_ty) = initialization_ty {
                    if increment_ty != initialization_ty {
                        return Err(AnalyzeError::TypeMismatch {
                            location: statement.location(),
                            target: initialization_ty,
                            source: increment_ty,
                        });
                    }
                }
            }

            this.analyze_statements(&mut for_.statements)
        })
    }

    /// Analyzes a `FOR` header assignment and returns its receiver type,
    /// which must be a comparable leaf.
    fn analyze_header_assignment(
        &mut self,
        statement: &mut Statement,
    ) -> Result<Type, AnalyzeError> {
        let Statement::Assignment(assignment) = statement else {
            return Err(AnalyzeError::InvalidAssignmentTarget {
                location: statement.location(),
            });
        };

        self.analyze_assignment(assignment)?;

        let ty = assignment.receiver.ty();

        if !ty.is_comparable_leaf() {
            return Err(AnalyzeError::LoopVariableNotComparable {
                location: assignment.receiver.location(),
                ty,
            });
        }

        Ok(ty)
    }

    fn analyze_while(&mut self, while_: &mut While) -> Result<(), AnalyzeError> {
        self.analyze_expression(&mut while_.condition)?;
        self.require_assignable(
            Type::Boolean,
            while_.condition.ty(),
            while_.condition.location(),
        )?;

        if while_.statements.is_empty() {
            return Err(AnalyzeError::EmptyBody {
                location: while_.location,
                construct: "WHILE",
            });
        }

        self.in_child_scope(|this| this.analyze_statements(&mut while_.statements))
    }

    fn analyze_return(&mut self, return_: &mut Return) -> Result<(), AnalyzeError> {
        self.analyze_expression(&mut return_.value)?;

        let target = self.return_type.unwrap_or(Type::Nil);

        self.require_assignable(target, return_.value.ty(), return_.value.location())
    }

    fn analyze_expression(&mut self, expression: &mut Expression) -> Result<(), AnalyzeError> {
        match expression {
            Expression::Literal(literal) => {
                let ty = match &literal.value {
                    LiteralValue::Nil => Type::Nil,
                    LiteralValue::Boolean(_) => Type::Boolean,
                    LiteralValue::Character(_) => Type::Character,
                    LiteralValue::String(_) => Type::String,
                    LiteralValue::Integer(value) => {
                        if value.abs() > BigInt::from(i32::MAX) {
                            return Err(AnalyzeError::IntegerOutOfRange {
                                location: literal.location,
                            });
                        }

                        Type::Integer
                    }
                    LiteralValue::Decimal(value) => {
                        let max =
                            BigDecimal::try_from(f64::MAX).expect("f64::MAX converts exactly");

                        if value.abs() > max {
                            return Err(AnalyzeError::DecimalOutOfRange {
                                location: literal.location,
                            });
                        }

                        Type::Decimal
                    }
                };

                literal.set_ty(ty);

                Ok(())
            }
            Expression::Group(group) => {
                self.analyze_expression(&mut group.expression)?;

                if !matches!(group.expression.as_ref(), Expression::Binary(_)) {
                    return Err(AnalyzeError::GroupNotBinary {
                        location: group.location,
                    });
                }

                group.set_ty(group.expression.ty());

                Ok(())
            }
            Expression::Binary(binary) => {
                self.analyze_expression(&mut binary.left)?;
                self.analyze_expression(&mut binary.right)?;

                let ty = self.binary_type(
                    &binary.operator,
                    &binary.left,
                    &binary.right,
                    binary.location,
                )?;

                binary.set_ty(ty);

                Ok(())
            }
            Expression::Access(access) => self.analyze_access(access),
            Expression::Function(call) => {
                let function = match &mut call.receiver {
                    Some(receiver) => {
                        self.analyze_expression(receiver)?;

                        let ty = receiver.ty();

                        ty.method(&call.name, call.arguments.len()).ok_or(
                            AnalyzeError::UnknownMethod {
                                location: call.location,
                                name: call.name.clone(),
                                arity: call.arguments.len(),
                                ty,
                            },
                        )?
                    }
                    None => self
                        .scopes
                        .lookup_function(self.scope, &call.name, call.arguments.len())
                        .cloned()
                        .ok_or(AnalyzeError::UnboundFunction {
                            location: call.location,
                            name: call.name.clone(),
                            arity: call.arguments.len(),
                        })?,
                };

                for (argument, ty) in call.arguments.iter_mut().zip(&function.parameter_types) {
                    self.analyze_expression(argument)?;
                    self.require_assignable(*ty, argument.ty(), argument.location())?;
                }

                call.set_function(function);

                Ok(())
            }
        }
    }

    fn analyze_access(&mut self, access: &mut Access) -> Result<(), AnalyzeError> {
        let variable = match &mut access.receiver {
            Some(receiver) => {
                self.analyze_expression(receiver)?;

                let ty = receiver.ty();

                ty.field(&access.name).ok_or(AnalyzeError::UnknownField {
                    location: access.location,
                    name: access.name.clone(),
                    ty,
                })?
            }
            None => self
                .scopes
                .lookup_variable(self.scope, &access.name)
                .cloned()
                .ok_or(AnalyzeError::UnboundVariable {
                    location: access.location,
                    name: access.name.clone(),
                })?,
        };

        access.set_variable(variable);

        Ok(())
    }

    fn binary_type(
        &self,
        operator: &str,
        left: &Expression,
        right: &Expression,
        location: SrcSpan,
    ) -> Result<Type, AnalyzeError> {
        match operator {
            "AND" | "OR" => {
                self.require_assignable(Type::Boolean, left.ty(), left.location())?;
                self.require_assignable(Type::Boolean, right.ty(), right.location())?;

                Ok(Type::Boolean)
            }
            "<" | "<=" | ">" | ">=" | "==" | "!=" => {
                self.require_assignable(Type::Comparable, left.ty(), left.location())?;
                self.require_assignable(Type::Comparable, right.ty(), right.location())?;

                Ok(Type::Boolean)
            }
            "+" if left.ty() == Type::String || right.ty() == Type::String => Ok(Type::String),
            "+" | "-" | "*" | "/" => match (left.ty(), right.ty()) {
                (Type::Integer, Type::Integer) => Ok(Type::Integer),
                (Type::Decimal, Type::Decimal) => Ok(Type::Decimal),
                (target @ (Type::Integer | Type::Decimal), source) => {
                    Err(AnalyzeError::TypeMismatch {
                        location: right.location(),
                        target,
                        source,
                    })
                }
                (ty, _) => Err(AnalyzeError::UnsupportedOperand {
                    location: left.location(),
                    operator: operator.into(),
                    ty,
                }),
            },
            _ => Err(AnalyzeError::UnsupportedOperand {
                location,
                operator: operator.into(),
                ty: left.ty(),
            }),
        }
    }

    /// Maps a declared type name into the closed nominal set.
    fn resolve_type(&self, name: &str, location: SrcSpan) -> Result<Type, AnalyzeError> {
        Type::from_name(name).ok_or(AnalyzeError::UnknownType {
            location,
            name: name.into(),
        })
    }

    fn require_assignable(
        &self,
        target: Type,
        source: Type,
        location: SrcSpan,
    ) -> Result<(), AnalyzeError> {
        if target.assignable_from(source) {
            Ok(())
        } else {
            Err(AnalyzeError::TypeMismatch {
                location,
                target,
                source,
            })
        }
    }

    fn in_child_scope<A>(
        &mut self,
        analyze: impl FnOnce(&mut Self) -> Result<A, AnalyzeError>,
    ) -> Result<A, AnalyzeError> {
        let enclosing = self.scope;
        self.scope = self.scopes.child(enclosing);

        let result = analyze(self);

        self.scope = enclosing;

        result
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}
