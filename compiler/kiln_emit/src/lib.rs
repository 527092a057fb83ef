//! Code generation for Kiln: checked module → [`LoadableUnit`].
//!
//! [`lower_module`] turns the typed HIR into a [`ModuleImage`] of stack
//! bytecode; [`LoadableUnit::encode`] wraps the image in the binary unit
//! format. [`emit`] does both.

pub mod bytecode;
mod image;
mod lower;
mod unit;

use kiln_diagnostic::Diagnostic;
use kiln_types::CheckedModule;

pub use bytecode::{CallId, MethodCode, Op, StrId};
pub use image::{CallTarget, Const, EntryImage, FieldImage, ModuleImage, TypeImage};
pub use lower::{lower_module, INIT_NAME, STATIC_INIT_NAME};
pub use unit::{FormatError, LoadableUnit, FORMAT_VERSION, HEADER_LEN, MAGIC};

/// Lower and encode a checked module. Errors are `E3001` diagnostics.
pub fn emit(module: &CheckedModule) -> Result<LoadableUnit, Diagnostic> {
    let image = lower_module(module)?;
    LoadableUnit::encode(&image)
        .map_err(|e| lower::limit_exceeded(format!("unit could not be encoded: {e}")))
}
