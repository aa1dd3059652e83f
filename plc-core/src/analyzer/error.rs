use crate::environment::prelude::Type;
use crate::utils::prelude::SrcSpan;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzeError {
    /// Occurs when a name does not resolve to any variable on the scope
    /// chain.
    UnboundVariable {
        location: SrcSpan,
        name: String,
    },
    /// Occurs when a (name, arity) pair does not resolve to any function on
    /// the scope chain. An arity mismatch reports as this, not as a separate
    /// wrong-argument-count error.
    UnboundFunction {
        location: SrcSpan,
        name: String,
        arity: usize,
    },
    /// Occurs when a type annotation names a type outside the closed set.
    UnknownType {
        location: SrcSpan,
        name: String,
    },
    UnknownField {
        location: SrcSpan,
        name: String,
        ty: Type,
    },
    UnknownMethod {
        location: SrcSpan,
        name: String,
        arity: usize,
        ty: Type,
    },
    /// Occurs whenever the single assignability gate fails: initializers,
    /// assignments, arguments, conditions and returns.
    TypeMismatch {
        location: SrcSpan,
        target: Type,
        source: Type,
    },
    /// An integer literal outside the signed 32-bit range.
    IntegerOutOfRange {
        location: SrcSpan,
    },
    /// A decimal literal outside the double-precision range.
    DecimalOutOfRange {
        location: SrcSpan,
    },
    ConstantWithoutValue {
        location: SrcSpan,
        name: String,
    },
    AssignmentToConstant {
        location: SrcSpan,
        name: String,
    },
    /// A declaration with neither a type annotation nor an initializer to
    /// infer one from.
    DeclarationWithoutType {
        location: SrcSpan,
        name: String,
    },
    /// An `IF` then-branch or a loop body with no statements.
    EmptyBody {
        location: SrcSpan,
        construct: &'static str,
    },
    /// A parenthesized group wrapping anything other than a binary
    /// expression.
    GroupNotBinary {
        location: SrcSpan,
    },
    /// An expression statement that is not a function call.
    InvalidExpressionStatement {
        location: SrcSpan,
    },
    /// An assignment whose receiver is not a plain or field access.
    InvalidAssignmentTarget {
        location: SrcSpan,
    },
    /// A `FOR` header assignment whose receiver is not of a comparable leaf
    /// type.
    LoopVariableNotComparable {
        location: SrcSpan,
        ty: Type,
    },
    /// Operands of a kind the operator does not accept at all.
    UnsupportedOperand {
        location: SrcSpan,
        operator: String,
        ty: Type,
    },
    /// The source declares no `main` function with zero parameters.
    MissingMain,
}

impl AnalyzeError {
    pub fn location(&self) -> Option<SrcSpan> {
        match self {
            AnalyzeError::UnboundVariable { location, .. }
            | AnalyzeError::UnboundFunction { location, .. }
            | AnalyzeError::UnknownType { location, .. }
            | AnalyzeError::UnknownField { location, .. }
            | AnalyzeError::UnknownMethod { location, .. }
            | AnalyzeError::TypeMismatch { location, .. }
            | AnalyzeError::IntegerOutOfRange { location }
            | AnalyzeError::DecimalOutOfRange { location }
            | AnalyzeError::ConstantWithoutValue { location, .. }
            | AnalyzeError::AssignmentToConstant { location, .. }
            | AnalyzeError::DeclarationWithoutType { location, .. }
            | AnalyzeError::EmptyBody { location, .. }
            | AnalyzeError::GroupNotBinary { location }
            | AnalyzeError::InvalidExpressionStatement { location }
            | AnalyzeError::InvalidAssignmentTarget { location }
            | AnalyzeError::LoopVariableNotComparable { location, .. }
            | AnalyzeError::UnsupportedOperand { location, .. } => Some(*location),
            AnalyzeError::MissingMain => None,
        }
    }

    pub fn details(&self) -> (&'static str, Vec<String>) {
        match self {
            AnalyzeError::UnboundVariable { name, .. } => (
                "Unknown variable",
                vec![format!("`{name}` is not defined on the scope chain")],
            ),
            AnalyzeError::UnboundFunction { name, arity, .. } => (
                "Unknown function",
                vec![format!("No function `{name}` takes {arity} argument(s)")],
            ),
            AnalyzeError::UnknownType { name, .. } => (
                "Unknown type",
                vec![format!(
                    "`{name}` is not one of `Any Nil Boolean Integer Decimal Character String Comparable`"
                )],
            ),
            AnalyzeError::UnknownField { name, ty, .. } => (
                "Unknown field",
                vec![format!("Type `{ty}` has no field `{name}`")],
            ),
            AnalyzeError::UnknownMethod { name, arity, ty, .. } => (
                "Unknown method",
                vec![format!(
                    "Type `{ty}` has no method `{name}` taking {arity} argument(s)"
                )],
            ),
            AnalyzeError::TypeMismatch { target, source, .. } => (
                "Type mismatch",
                vec![format!("Expected `{target}`, got `{source}`")],
            ),
            AnalyzeError::IntegerOutOfRange { .. } => (
                "Integer literal out of range",
                vec!["Integer literals are limited to the signed 32-bit range".into()],
            ),
            AnalyzeError::DecimalOutOfRange { .. } => (
                "Decimal literal out of range",
                vec!["Decimal literals are limited to the double-precision range".into()],
            ),
            AnalyzeError::ConstantWithoutValue { name, .. } => (
                "Constant without a value",
                vec![format!("`{name}` is `CONST` and must be initialized")],
            ),
            AnalyzeError::AssignmentToConstant { name, .. } => (
                "Assignment to a constant",
                vec![format!("`{name}` is `CONST` and cannot be reassigned")],
            ),
            AnalyzeError::DeclarationWithoutType { name, .. } => (
                "Declaration without a type",
                vec![format!(
                    "`{name}` needs a type annotation or an initializer to infer one from"
                )],
            ),
            AnalyzeError::EmptyBody { construct, .. } => (
                "Empty body",
                vec![format!("A `{construct}` body must hold at least one statement")],
            ),
            AnalyzeError::GroupNotBinary { .. } => (
                "Invalid group",
                vec!["Parentheses may only wrap a binary expression".into()],
            ),
            AnalyzeError::InvalidExpressionStatement { .. } => (
                "Invalid expression statement",
                vec!["Only function calls may stand as statements".into()],
            ),
            AnalyzeError::InvalidAssignmentTarget { .. } => (
                "Invalid assignment target",
                vec!["Only a variable or field access can be assigned to".into()],
            ),
            AnalyzeError::LoopVariableNotComparable { ty, .. } => (
                "Invalid loop variable",
                vec![format!(
                    "A `FOR` header must assign a comparable variable, got `{ty}`"
                )],
            ),
            AnalyzeError::UnsupportedOperand { operator, ty, .. } => (
                "Unsupported operand",
                vec![format!("`{operator}` does not accept a `{ty}` operand")],
            ),
            AnalyzeError::MissingMain => (
                "Missing `main`",
                vec!["Every source must define `main` with zero parameters".into()],
            ),
        }
    }
}
