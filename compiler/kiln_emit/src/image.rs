//! Module image: the decoded payload of a loadable unit.

use kiln_types::{ModuleMetadata, OutputKind, TypeKind};
use serde::{Deserialize, Serialize};

use crate::bytecode::MethodCode;

/// Initial value of a field or global slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Const {
    Int(i32),
    Bool(bool),
    Str(String),
    /// Object-typed slots before their initializer has run.
    Null,
}

/// Resolved at load time against the module, then its dependencies.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallTarget {
    /// Empty for virtual calls.
    pub type_name: String,
    pub method: String,
    pub argc: u16,
    pub returns_value: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeImage {
    pub full_name: String,
    pub kind: TypeKind,
    pub is_static: bool,
    pub is_public: bool,
    /// Every implemented interface, including inherited ones.
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldImage>,
    pub methods: Vec<MethodCode>,
    /// Instance field initializers; runs with the new object as `this`.
    pub init: Option<MethodCode>,
    /// Static field initializers; runs once at load.
    pub static_init: Option<MethodCode>,
}

impl TypeImage {
    pub fn method(&self, name: &str) -> Option<(usize, &MethodCode)> {
        self.methods.iter().enumerate().find(|(_, m)| m.name() == name)
    }

    /// Number of slots an instance of this type carries.
    pub fn instance_slots(&self) -> usize {
        self.fields.iter().filter(|f| f.global.is_none()).count()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldImage {
    pub name: String,
    pub default: Const,
    /// Global slot for static fields.
    pub global: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryImage {
    pub type_index: u32,
    pub method_index: u32,
    pub returns_int: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleImage {
    pub name: String,
    pub output_kind: OutputKind,
    pub types: Vec<TypeImage>,
    pub strings: Vec<String>,
    pub call_targets: Vec<CallTarget>,
    pub globals: Vec<Const>,
    pub entry_point: Option<EntryImage>,
    /// Public surface, so a unit can serve as a compile reference.
    pub metadata: ModuleMetadata,
}

impl ModuleImage {
    pub fn find_type(&self, full_name: &str) -> Option<(usize, &TypeImage)> {
        self.types
            .iter()
            .enumerate()
            .find(|(_, t)| t.full_name == full_name)
    }
}
