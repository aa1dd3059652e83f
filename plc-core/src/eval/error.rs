use crate::environment::prelude::Type;
use crate::utils::prelude::SrcSpan;

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeErrorType {
    /// A value of the wrong runtime kind reached an operation. With an
    /// analyzed tree this only happens when Nil flows out of an
    /// uninitialized variable into a typed operation.
    TypeViolation {
        expected: Type,
        found: Type,
    },
    /// Integer or decimal division by the additive identity.
    DivisionByZero,
    UnboundVariable {
        name: String,
    },
    UnboundFunction {
        name: String,
        arity: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub error: RuntimeErrorType,
    pub location: SrcSpan,
}

impl RuntimeError {
    pub fn details(&self) -> (&'static str, Vec<String>) {
        match &self.error {
            RuntimeErrorType::TypeViolation { expected, found } => (
                "Value of the wrong kind",
                vec![format!("Expected a `{expected}` value, got `{found}`")],
            ),
            RuntimeErrorType::DivisionByZero => ("Division by zero", vec![]),
            RuntimeErrorType::UnboundVariable { name } => (
                "Unknown variable",
                vec![format!("`{name}` is not defined at this point of execution")],
            ),
            RuntimeErrorType::UnboundFunction { name, arity } => (
                "Unknown function",
                vec![format!("No function `{name}` takes {arity} argument(s)")],
            ),
        }
    }
}
