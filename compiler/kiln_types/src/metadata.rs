//! Module metadata: the public surface of a compiled or host-declared
//! module.
//!
//! Metadata is what references contribute to name resolution, what a
//! compiled unit exports, and what a capability is checked against when a
//! type is instantiated.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ty::{join_types, Ty};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum TypeKind {
    /// Core value type (`System.Int32`, ...).
    Primitive,
    Class,
    Interface,
}

impl TypeKind {
    pub fn describe(self) -> &'static str {
        match self {
            TypeKind::Primitive => "primitive type",
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Visibility {
    Public,
    Internal,
    Private,
}

/// A method signature.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct MethodSig {
    pub name: String,
    pub params: Vec<Ty>,
    pub ret: Ty,
    pub is_static: bool,
    pub visibility: Visibility,
}

impl MethodSig {
    /// A public instance method.
    pub fn new(name: impl Into<String>, params: Vec<Ty>, ret: Ty) -> Self {
        MethodSig {
            name: name.into(),
            params,
            ret,
            is_static: false,
            visibility: Visibility::Public,
        }
    }

    /// A public static method.
    pub fn new_static(name: impl Into<String>, params: Vec<Ty>, ret: Ty) -> Self {
        MethodSig {
            is_static: true,
            ..MethodSig::new(name, params, ret)
        }
    }

    /// Same name, parameter types and return type.
    pub fn same_shape(&self, other: &MethodSig) -> bool {
        self.name == other.name && self.params == other.params && self.ret == other.ret
    }

    /// `Owner.Name(int, int)`
    pub fn qualified(&self, owner: &str) -> String {
        format!("{}.{}({})", simple_name(owner), self.name, join_types(&self.params))
    }
}

impl fmt::Display for MethodSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_static {
            f.write_str("static ")?;
        }
        write!(f, "{} {}({})", self.ret, self.name, join_types(&self.params))
    }
}

/// A type's public surface.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct TypeMetadata {
    pub full_name: String,
    pub kind: TypeKind,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_sealed: bool,
    /// Implemented interfaces (classes) or base interfaces (interfaces).
    pub interfaces: Vec<String>,
    pub methods: Vec<MethodSig>,
}

impl TypeMetadata {
    fn new(full_name: impl Into<String>, kind: TypeKind) -> Self {
        TypeMetadata {
            full_name: full_name.into(),
            kind,
            visibility: Visibility::Public,
            is_static: false,
            is_sealed: false,
            interfaces: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn class(full_name: impl Into<String>) -> Self {
        Self::new(full_name, TypeKind::Class)
    }

    pub fn interface(full_name: impl Into<String>) -> Self {
        Self::new(full_name, TypeKind::Interface)
    }

    pub fn primitive(full_name: impl Into<String>) -> Self {
        Self::new(full_name, TypeKind::Primitive)
    }

    /// Static class: `is_static` and `is_sealed`.
    #[must_use]
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self.is_sealed = true;
        self
    }

    #[must_use]
    pub fn with_interface(mut self, full_name: impl Into<String>) -> Self {
        self.interfaces.push(full_name.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: MethodSig) -> Self {
        self.methods.push(method);
        self
    }

    /// Namespace part of the full name ("" for the global namespace).
    pub fn namespace(&self) -> &str {
        self.full_name
            .rsplit_once('.')
            .map_or("", |(namespace, _)| namespace)
    }

    pub fn simple_name(&self) -> &str {
        simple_name(&self.full_name)
    }

    pub fn method(&self, name: &str) -> Option<&MethodSig> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Last segment of a dotted name.
pub fn simple_name(full_name: &str) -> &str {
    full_name
        .rsplit_once('.')
        .map_or(full_name, |(_, simple)| simple)
}

/// Metadata for one module.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct ModuleMetadata {
    pub name: String,
    pub types: Vec<TypeMetadata>,
}

impl ModuleMetadata {
    pub fn new(name: impl Into<String>) -> Self {
        ModuleMetadata {
            name: name.into(),
            types: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_type(mut self, ty: TypeMetadata) -> Self {
        self.types.push(ty);
        self
    }

    pub fn find_type(&self, full_name: &str) -> Option<&TypeMetadata> {
        self.types.iter().find(|t| t.full_name == full_name)
    }
}
