//! Runtime values.

use std::fmt;
use std::sync::Arc;

use kiln_emit::Const;
use kiln_types::Ty;
use parking_lot::Mutex;

use crate::module::ModuleHandle;

/// A value on the operand stack, in a local, or in a field.
#[derive(Clone, Debug)]
pub enum Value {
    /// Result of a `void` method.
    Void,
    /// An object slot that has not been assigned.
    Null,
    Int(i32),
    Bool(bool),
    Str(Arc<str>),
    Object(ObjectRef),
}

pub type ObjectRef = Arc<Object>;

/// An instance of a compiled class.
pub struct Object {
    pub(crate) module: ModuleHandle,
    pub(crate) type_index: usize,
    pub(crate) fields: Mutex<Vec<Value>>,
}

impl Object {
    pub fn type_name(&self) -> &str {
        self.module.type_name(self.type_index)
    }

    pub(crate) fn load(&self, index: u16) -> Option<Value> {
        self.fields.lock().get(usize::from(index)).cloned()
    }

    pub(crate) fn store(&self, index: u16, value: Value) -> bool {
        match self.fields.lock().get_mut(usize::from(index)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("type", &self.type_name())
            .finish_non_exhaustive()
    }
}

impl Value {
    pub fn string(text: &str) -> Value {
        Value::Str(Arc::from(text))
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the value's runtime type, for error messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::Void => "void".to_string(),
            Value::Null => "null".to_string(),
            Value::Int(_) => "int".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Str(_) => "string".to_string(),
            Value::Object(obj) => obj.type_name().to_string(),
        }
    }

    /// `==` semantics: value equality for primitives, identity for objects.
    pub fn equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Null, Value::Null) | (Value::Void, Value::Void) => true,
            _ => false,
        }
    }

    /// Whether the value can be passed where `ty` is expected.
    pub fn conforms_to(&self, ty: &Ty) -> bool {
        match (self, ty) {
            (Value::Int(_), Ty::Int) | (Value::Bool(_), Ty::Bool) | (Value::Str(_), Ty::Str) => {
                true
            }
            (Value::Null, Ty::Named(_)) => true,
            (Value::Object(obj), Ty::Named(name)) => {
                obj.type_name() == name || obj.module.implements(obj.type_index, name)
            }
            _ => false,
        }
    }
}

impl From<&Const> for Value {
    fn from(value: &Const) -> Self {
        match value {
            Const::Int(v) => Value::Int(*v),
            Const::Bool(v) => Value::Bool(*v),
            Const::Str(s) => Value::string(s),
            Const::Null => Value::Null,
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

/// Text used by string concatenation.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void | Value::Null => Ok(()),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(v) => f.write_str(if *v { "true" } else { "false" }),
            Value::Str(s) => f.write_str(s),
            Value::Object(obj) => f.write_str(obj.type_name()),
        }
    }
}

#[cfg(test)]
mod tests;
