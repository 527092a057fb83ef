//! Loader and interpreter for Kiln units.
//!
//! [`load`] decodes a [`LoadableUnit`](kiln_emit::LoadableUnit), verifies
//! its bytecode, links static calls against the unit and its dependencies,
//! and runs static initializers. The resulting [`ModuleHandle`] creates
//! instances by type name and hands them out as [`InvocationHandle`]s that
//! expose one interface.
//!
//! Guest code runs with bounded steps and call depth, so a runaway loop or
//! recursion becomes a [`RuntimeError`] instead of hanging or crashing the
//! host.

#![deny(clippy::arithmetic_side_effects)]

mod capability;
mod console;
mod error;
mod interp;
mod module;
mod natives;
mod options;
mod value;
mod verify;

pub use capability::{Capability, InvocationHandle};
pub use console::{buffer_console, silent_console, stdout_console, Console, SharedConsole};
pub use error::{InstantiateError, LoadError, RuntimeError, VerifyError};
pub use module::{load, ModuleHandle};
pub use options::{ExecutionLimits, LoadOptions};
pub use value::{Object, ObjectRef, Value};

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod test_support;

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
