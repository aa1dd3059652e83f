use std::fmt::Display;

use super::binding::{Function, Variable};

/// The closed nominal type hierarchy. `Any` sits above everything,
/// `Comparable` is the abstract supertype of the five leaf types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Any,
    Nil,
    Boolean,
    Integer,
    Decimal,
    Character,
    String,
    Comparable,
}

impl Type {
    pub fn from_name(name: &str) -> Option<Type> {
        Some(match name {
            "Any" => Type::Any,
            "Nil" => Type::Nil,
            "Boolean" => Type::Boolean,
            "Integer" => Type::Integer,
            "Decimal" => Type::Decimal,
            "Character" => Type::Character,
            "String" => Type::String,
            "Comparable" => Type::Comparable,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Type::Any => "Any",
            Type::Nil => "Nil",
            Type::Boolean => "Boolean",
            Type::Integer => "Integer",
            Type::Decimal => "Decimal",
            Type::Character => "Character",
            Type::String => "String",
            Type::Comparable => "Comparable",
        }
    }

    /// Direct subtypes of `Comparable`.
    pub fn is_comparable_leaf(&self) -> bool {
        matches!(
            self,
            Type::Boolean | Type::Integer | Type::Decimal | Type::Character | Type::String
        )
    }

    /// The single assignability gate: nominal identity, the universal
    /// supertype, or crossing one step of the Comparable hierarchy in either
    /// direction.
    pub fn assignable_from(&self, source: Type) -> bool {
        *self == source
            || *self == Type::Any
            || (source == Type::Comparable && self.is_comparable_leaf())
            || (*self == Type::Comparable && source.is_comparable_leaf())
    }

    /// Looks up a field on this type. The primitive types of this language
    /// define none; the hook keeps receiver resolution uniform.
    pub fn field(&self, _name: &str) -> Option<Variable> {
        None
    }

    /// Looks up a method on this type, by name and arity. Always empty for
    /// the primitive types.
    pub fn method(&self, _name: &str, _arity: usize) -> Option<Function> {
        None
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::Type;

    #[test]
    fn assignability() {
        assert!(Type::Integer.assignable_from(Type::Integer));
        assert!(Type::Any.assignable_from(Type::Nil));
        assert!(Type::Any.assignable_from(Type::String));
        assert!(Type::Comparable.assignable_from(Type::Decimal));
        assert!(Type::Character.assignable_from(Type::Comparable));

        assert!(!Type::Integer.assignable_from(Type::Decimal));
        assert!(!Type::Integer.assignable_from(Type::Any));
        assert!(!Type::Comparable.assignable_from(Type::Nil));
        assert!(!Type::Comparable.assignable_from(Type::Any));
        assert!(!Type::Nil.assignable_from(Type::Comparable));
    }
}
