//! The Kiln driver.
//!
//! [`compile`] takes a [`SourceUnit`] (text or a built syntax tree) and a
//! set of [`Reference`]s and returns a [`CompilationResult`]: a
//! [`LoadableUnit`](kiln_emit::LoadableUnit) or the diagnostics explaining
//! why there is none. Loading and instantiation live in `kiln_eval`; this
//! crate re-exports what a host needs for the whole round trip:
//!
//! ```ignore
//! let result = compile(&SourceUnit::Tree(tree), &default_references(), &CompileOptions::library());
//! let unit = result.into_result()?;
//! let module = load(&unit, LoadOptions::default())?;
//! let calculator: DynamicCalculator = module.instantiate_as("GeneratedCalculator.DynamicCalculator")?;
//! assert_eq!(calculator.add(2, 3)?, 5);
//! ```

pub mod commands;
mod compile;
pub mod demo;
mod options;
mod reference;
mod report;
mod tracing_setup;

pub use compile::{compile, compile_with_timeout, CompilationResult, CompileError, CompileTimeout, SourceUnit};
pub use options::CompileOptions;
pub use reference::{calculator_interface, default_references, playground_contracts, Reference};
pub use report::{report, ReportFormat};
pub use tracing_setup::init_tracing;

pub use kiln_diagnostic::{Diagnostic, ErrorCode, Severity, WarningsAsErrors};
pub use kiln_emit::LoadableUnit;
pub use kiln_eval::{
    load, Capability, ExecutionLimits, InstantiateError, InvocationHandle, LoadError, LoadOptions, ModuleHandle,
    RuntimeError, Value,
};
pub use kiln_types::OutputKind;
