//! Semantic types.

use std::fmt;

use kiln_ir::PredefinedType;
use serde::{Deserialize, Serialize};

/// A resolved type.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Ty {
    Int,
    Bool,
    Str,
    Void,
    /// Class or interface, by full name (`Playground.ICalculator`).
    Named(String),
    /// Placeholder after a reported error; compatible with everything so
    /// one mistake is reported once.
    Error,
}

impl Ty {
    pub fn from_predefined(ty: PredefinedType) -> Ty {
        match ty {
            PredefinedType::Int => Ty::Int,
            PredefinedType::Bool => Ty::Bool,
            PredefinedType::String => Ty::Str,
            PredefinedType::Void => Ty::Void,
        }
    }

    /// Map a core primitive's full name (`System.Int32`) to its type.
    pub fn from_core_name(full_name: &str) -> Option<Ty> {
        match full_name {
            "System.Int32" => Some(Ty::Int),
            "System.Boolean" => Some(Ty::Bool),
            "System.String" => Some(Ty::Str),
            "System.Void" => Some(Ty::Void),
            _ => None,
        }
    }

    pub fn named(full_name: impl Into<String>) -> Ty {
        Ty::Named(full_name.into())
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, Ty::Error)
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Ty::Void)
    }

    /// Full name of a class or interface type.
    pub fn as_named(&self) -> Option<&str> {
        match self {
            Ty::Named(name) => Some(name),
            _ => None,
        }
    }

    /// Int, bool and string: the types with value equality.
    pub fn is_primitive_value(&self) -> bool {
        matches!(self, Ty::Int | Ty::Bool | Ty::Str)
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Int => f.write_str("int"),
            Ty::Bool => f.write_str("bool"),
            Ty::Str => f.write_str("string"),
            Ty::Void => f.write_str("void"),
            Ty::Named(name) => f.write_str(name),
            Ty::Error => f.write_str("{error}"),
        }
    }
}

/// Join types as a parameter list: `int, string`.
pub fn join_types(types: &[Ty]) -> String {
    let parts: Vec<String> = types.iter().map(Ty::to_string).collect();
    parts.join(", ")
}

#[cfg(test)]
mod tests;
