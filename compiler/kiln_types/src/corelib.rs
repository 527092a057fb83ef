//! The core runtime library: predefined types and the `System` namespace.
//!
//! The core library has no compiled code. Its methods are host functions
//! identified by [`Native`]; the interpreter implements them.

use crate::metadata::{MethodSig, ModuleMetadata, TypeMetadata};
use crate::ty::Ty;

/// Module name of the core library.
pub const CORE_MODULE_NAME: &str = "System.Runtime";

/// A host-implemented core method.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Native {
    MathAbs,
    MathMax,
    MathMin,
    MathSign,
    MathClamp,
    ConsoleWriteLine,
}

impl Native {
    pub const ALL: &'static [Native] = &[
        Native::MathAbs,
        Native::MathMax,
        Native::MathMin,
        Native::MathSign,
        Native::MathClamp,
        Native::ConsoleWriteLine,
    ];

    /// Stable numeric id stored in compiled units.
    pub fn id(self) -> u16 {
        match self {
            Native::MathAbs => 0,
            Native::MathMax => 1,
            Native::MathMin => 2,
            Native::MathSign => 3,
            Native::MathClamp => 4,
            Native::ConsoleWriteLine => 5,
        }
    }

    pub fn from_id(id: u16) -> Option<Native> {
        Self::ALL.iter().copied().find(|n| n.id() == id)
    }

    /// Owning type's full name.
    pub fn type_name(self) -> &'static str {
        match self {
            Native::ConsoleWriteLine => "System.Console",
            _ => "System.Math",
        }
    }

    pub fn method_name(self) -> &'static str {
        match self {
            Native::MathAbs => "Abs",
            Native::MathMax => "Max",
            Native::MathMin => "Min",
            Native::MathSign => "Sign",
            Native::MathClamp => "Clamp",
            Native::ConsoleWriteLine => "WriteLine",
        }
    }

    /// Find the native backing `type_name.method`.
    pub fn lookup(type_name: &str, method: &str) -> Option<Native> {
        Self::ALL
            .iter()
            .copied()
            .find(|n| n.type_name() == type_name && n.method_name() == method)
    }

    pub fn signature(self) -> MethodSig {
        let name = self.method_name();
        match self {
            Native::MathAbs | Native::MathSign => {
                MethodSig::new_static(name, vec![Ty::Int], Ty::Int)
            }
            Native::MathMax | Native::MathMin => {
                MethodSig::new_static(name, vec![Ty::Int, Ty::Int], Ty::Int)
            }
            Native::MathClamp => {
                MethodSig::new_static(name, vec![Ty::Int, Ty::Int, Ty::Int], Ty::Int)
            }
            Native::ConsoleWriteLine => MethodSig::new_static(name, vec![Ty::Str], Ty::Void),
        }
    }

    /// Number of arguments the native pops.
    pub fn arity(self) -> usize {
        self.signature().params.len()
    }

    pub fn returns_value(self) -> bool {
        !self.signature().ret.is_void()
    }
}

/// Metadata of the core library.
pub fn core_metadata() -> ModuleMetadata {
    let mut module = ModuleMetadata::new(CORE_MODULE_NAME)
        .with_type(TypeMetadata::primitive("System.Int32"))
        .with_type(TypeMetadata::primitive("System.Boolean"))
        .with_type(TypeMetadata::primitive("System.String"))
        .with_type(TypeMetadata::primitive("System.Void"));
    for owner in ["System.Math", "System.Console"] {
        let ty = Native::ALL
            .iter()
            .filter(|n| n.type_name() == owner)
            .fold(TypeMetadata::class(owner).as_static(), |ty, n| {
                ty.with_method(n.signature())
            });
        module = module.with_type(ty);
    }
    module
}

/// True if `module` is the core library.
pub fn is_core(module: &ModuleMetadata) -> bool {
    module.name == CORE_MODULE_NAME
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
