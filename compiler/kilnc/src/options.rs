//! Compile options.

use kiln_diagnostic::WarningsAsErrors;
use kiln_types::OutputKind;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    pub output_kind: OutputKind,
    /// Name recorded in the unit and in its exported metadata.
    pub module_name: String,
    pub warnings_as_errors: WarningsAsErrors,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            output_kind: OutputKind::Library,
            module_name: "DynamicUnit".to_string(),
            warnings_as_errors: WarningsAsErrors::None,
        }
    }
}

impl CompileOptions {
    pub fn library() -> Self {
        Self::default()
    }

    pub fn executable() -> Self {
        CompileOptions {
            output_kind: OutputKind::Executable,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    #[must_use]
    pub fn with_warnings_as_errors(mut self, policy: WarningsAsErrors) -> Self {
        self.warnings_as_errors = policy;
        self
    }
}
