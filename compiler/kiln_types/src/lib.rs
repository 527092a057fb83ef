//! Type model, name resolution and type checking for Kiln.
//!
//! [`check`] takes a parsed unit plus the [`ModuleMetadata`] of every
//! reference and produces a [`CheckedModule`] (typed HIR) and diagnostics.
//! The same metadata types describe capability interfaces at load time.

mod check;
pub mod corelib;
pub mod hir;
pub mod metadata;
mod table;
mod ty;

pub use check::{check, CheckOptions, CheckOutput};
pub use hir::{CheckedModule, OutputKind};
pub use metadata::{MethodSig, ModuleMetadata, TypeKind, TypeMetadata, Visibility};
pub use table::{qualify, Origin, SymbolTable, TypeEntry};
pub use ty::{join_types, Ty};
pub use corelib::{core_metadata, Native, CORE_MODULE_NAME};
