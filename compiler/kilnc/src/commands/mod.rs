//! `kiln` subcommands.
//!
//! Each command returns its exit status or a [`CliError`]; `main` turns
//! errors into a message and status 1. Compile diagnostics are reported
//! before a command fails, so [`CliError::Reported`] carries no text.

mod build;
mod calc;
mod check;
mod demo;
mod explain;
mod fmt;
mod run;

use std::path::{Path, PathBuf};

use kiln_diagnostic::WarningsAsErrors;
use kiln_emit::LoadableUnit;
use kiln_eval::{load, InstantiateError, LoadError, LoadOptions, ModuleHandle, RuntimeError};
use kiln_types::OutputKind;

use crate::compile::{compile, CompilationResult, SourceUnit};
use crate::options::CompileOptions;
use crate::reference::{default_references, Reference};
use crate::report::{report, ReportFormat};

pub use build::build_file;
pub use calc::calc_file;
pub use check::check_file;
pub use demo::run_demo_command;
pub use explain::explain_error;
pub use fmt::format_file;
pub use run::run_file;

/// Extension `kiln build` gives compiled units.
pub const UNIT_EXTENSION: &str = "kunit";

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("cannot read `{path}`: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write `{path}`: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Diagnostics were already written to stderr.
    #[error("compilation failed")]
    Reported,
    #[error("cannot load `{path}`: {source}")]
    Load {
        path: String,
        #[source]
        source: LoadError,
    },
    #[error(transparent)]
    Instantiate(#[from] InstantiateError),
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

/// Flags shared by every command, plus the remaining positional arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandArgs {
    pub positional: Vec<String>,
    pub output: Option<PathBuf>,
    pub references: Vec<PathBuf>,
    pub executable: bool,
    pub warnings_as_errors: WarningsAsErrors,
    pub format: ReportFormat,
    pub check: bool,
}

impl CommandArgs {
    /// Parse everything after the command name.
    pub fn parse(args: &[String]) -> Result<Self, CliError> {
        let mut parsed = CommandArgs::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-o" | "--output" => {
                    let path = iter
                        .next()
                        .ok_or_else(|| CliError::Usage(format!("`{arg}` needs a path")))?;
                    parsed.output = Some(PathBuf::from(path));
                }
                "-r" | "--reference" => {
                    let path = iter
                        .next()
                        .ok_or_else(|| CliError::Usage(format!("`{arg}` needs a path")))?;
                    parsed.references.push(PathBuf::from(path));
                }
                "--exe" => parsed.executable = true,
                "--warnaserror" => parsed.warnings_as_errors = WarningsAsErrors::All,
                "--json" => parsed.format = ReportFormat::Json,
                "--check" => parsed.check = true,
                _ => {
                    if let Some(codes) = arg.strip_prefix("--warnaserror=") {
                        parsed.warnings_as_errors = parse_codes(codes)?;
                    } else if arg.starts_with('-') && arg.len() > 1 && arg.parse::<i32>().is_err() {
                        return Err(CliError::Usage(format!("unknown option `{arg}`")));
                    } else {
                        parsed.positional.push(arg.clone());
                    }
                }
            }
        }
        Ok(parsed)
    }

    /// The `index`th positional argument, or a usage error naming `what`.
    pub fn positional(&self, index: usize, what: &str) -> Result<&str, CliError> {
        self.positional
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| CliError::Usage(format!("missing {what}")))
    }

    fn compile_options(&self, output_kind: OutputKind, path: &Path) -> CompileOptions {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("DynamicUnit");
        CompileOptions {
            output_kind,
            module_name: name.to_string(),
            warnings_as_errors: self.warnings_as_errors.clone(),
        }
    }

    /// Core, the `Playground` contracts, then every `-r` unit.
    fn reference_set(&self) -> Vec<Reference> {
        let mut references = default_references();
        references.extend(self.references.iter().cloned().map(Reference::Path));
        references
    }
}

fn parse_codes(list: &str) -> Result<WarningsAsErrors, CliError> {
    list.split(',')
        .map(|code| {
            code.parse()
                .map_err(|e: kiln_diagnostic::ParseErrorCodeError| CliError::Usage(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(WarningsAsErrors::Codes)
}

pub(crate) fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })
}

fn is_unit_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(UNIT_EXTENSION))
}

/// Compile a source file, reporting diagnostics. Warnings are reported on
/// success too.
pub(crate) fn compile_file(path: &Path, args: &CommandArgs, output_kind: OutputKind) -> Result<LoadableUnit, CliError> {
    let text = read_file(path)?;
    let options = args.compile_options(output_kind, path);
    let result = compile(&SourceUnit::Text(text.clone()), &args.reference_set(), &options);
    report(result.diagnostics(), &path.display().to_string(), &text, args.format);
    match result {
        CompilationResult::Success { unit, .. } => Ok(unit),
        CompilationResult::Failure { .. } => Err(CliError::Reported),
    }
}

/// Load a `.kunit` file as is, or compile a source file first. `-r` units
/// are loaded as dependencies.
pub(crate) fn load_file(path: &Path, args: &CommandArgs, output_kind: OutputKind) -> Result<ModuleHandle, CliError> {
    let unit = if is_unit_path(path) {
        LoadableUnit::read_from(path).map_err(|source| CliError::Read {
            path: path.display().to_string(),
            source,
        })?
    } else {
        compile_file(path, args, output_kind)?
    };

    let mut options = LoadOptions::default();
    for reference in &args.references {
        let dependency = LoadableUnit::read_from(reference).map_err(|source| CliError::Read {
            path: reference.display().to_string(),
            source,
        })?;
        let module = load(&dependency, options.clone()).map_err(|source| CliError::Load {
            path: reference.display().to_string(),
            source,
        })?;
        options = options.dependency(module);
    }
    load(&unit, options).map_err(|source| CliError::Load {
        path: path.display().to_string(),
        source,
    })
}
