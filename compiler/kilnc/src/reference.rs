//! Compile references: the modules whose public surface a unit may use.

use std::path::PathBuf;

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_emit::LoadableUnit;
use kiln_types::{core_metadata, MethodSig, ModuleMetadata, Ty, TypeMetadata};

/// One entry of a reference set.
#[derive(Clone, Debug)]
pub enum Reference {
    /// The core library: predefined types and `System`.
    Core,
    /// Host-declared contracts.
    Metadata(ModuleMetadata),
    /// A previously compiled library held in memory.
    Unit(LoadableUnit),
    /// A previously compiled library on disk.
    Path(PathBuf),
}

impl Reference {
    pub fn core() -> Self {
        Reference::Core
    }

    pub fn metadata(module: ModuleMetadata) -> Self {
        Reference::Metadata(module)
    }

    pub fn unit(unit: &LoadableUnit) -> Self {
        Reference::Unit(unit.clone())
    }

    pub fn path(path: impl Into<PathBuf>) -> Self {
        Reference::Path(path.into())
    }

    /// Public surface of the referenced module. Unreadable references are
    /// `E2019` errors.
    pub fn resolve(&self) -> Result<ModuleMetadata, Diagnostic> {
        match self {
            Reference::Core => Ok(core_metadata()),
            Reference::Metadata(module) => Ok(module.clone()),
            Reference::Unit(unit) => unit
                .metadata()
                .map_err(|e| unreadable("in-memory unit", &e.to_string())),
            Reference::Path(path) => {
                let shown = path.display().to_string();
                let unit = LoadableUnit::read_from(path).map_err(|e| unreadable(&shown, &e.to_string()))?;
                unit.metadata().map_err(|e| unreadable(&shown, &e.to_string()))
            }
        }
    }
}

fn unreadable(what: &str, why: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E2019)
        .with_message(format!("reference `{what}` could not be read: {why}"))
        .with_note("references must be units produced by `kiln build`")
}

/// `Playground.ICalculator`: the capability the calculator demo compiles
/// against.
pub fn calculator_interface() -> TypeMetadata {
    TypeMetadata::interface("Playground.ICalculator")
        .with_method(MethodSig::new("Add", vec![Ty::Int, Ty::Int], Ty::Int))
}

/// Host contracts module holding [`calculator_interface`].
pub fn playground_contracts() -> ModuleMetadata {
    ModuleMetadata::new("Playground").with_type(calculator_interface())
}

/// The references every calculator compile needs.
pub fn default_references() -> Vec<Reference> {
    vec![Reference::core(), Reference::metadata(playground_contracts())]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
