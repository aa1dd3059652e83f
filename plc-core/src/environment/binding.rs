use super::ty::Type;

/// Static binding of a name to a variable slot. `external_name` is what the
/// downstream source-to-source generator emits; it matches the declared name
/// for everything user-defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub external_name: String,
    pub ty: Type,
    pub constant: bool,
}

/// Static binding of a (name, arity) pair to a function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub external_name: String,
    pub parameter_types: Vec<Type>,
    pub return_type: Type,
}
