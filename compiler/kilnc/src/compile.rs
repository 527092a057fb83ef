//! The compile entry point: source + references → loadable unit or
//! diagnostics.

use std::borrow::Cow;
use std::thread;
use std::time::Duration;

use kiln_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use kiln_emit::{emit, LoadableUnit};
use kiln_ir::CompilationUnit;
use kiln_parse::parse_source;
use kiln_types::{check, CheckOptions};
use tracing::debug;

use crate::options::CompileOptions;
use crate::reference::Reference;

/// What the caller hands to [`compile`].
#[derive(Clone, Debug)]
pub enum SourceUnit {
    Text(String),
    /// A built tree. It is printed and re-parsed, so diagnostics point into
    /// the printed text.
    Tree(CompilationUnit),
}

impl SourceUnit {
    /// Source text the compiler reads.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            SourceUnit::Text(text) => Cow::Borrowed(text),
            SourceUnit::Tree(unit) => Cow::Owned(kiln_fmt::format_unit(unit)),
        }
    }
}

impl From<&str> for SourceUnit {
    fn from(text: &str) -> Self {
        SourceUnit::Text(text.to_string())
    }
}

impl From<String> for SourceUnit {
    fn from(text: String) -> Self {
        SourceUnit::Text(text)
    }
}

impl From<CompilationUnit> for SourceUnit {
    fn from(unit: CompilationUnit) -> Self {
        SourceUnit::Tree(unit)
    }
}

/// Outcome of [`compile`]: a unit, or the diagnostics that prevented one.
#[derive(Clone, Debug)]
pub enum CompilationResult {
    Success {
        unit: LoadableUnit,
        /// Warnings and info; never errors.
        diagnostics: Vec<Diagnostic>,
    },
    Failure {
        /// Ordered by source position; at least one is an error.
        diagnostics: Vec<Diagnostic>,
    },
}

impl CompilationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CompilationResult::Success { .. })
    }

    pub fn unit(&self) -> Option<&LoadableUnit> {
        match self {
            CompilationResult::Success { unit, .. } => Some(unit),
            CompilationResult::Failure { .. } => None,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            CompilationResult::Success { diagnostics, .. }
            | CompilationResult::Failure { diagnostics } => diagnostics,
        }
    }

    /// The error-severity diagnostics, escalated warnings included.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics().iter().filter(|d| d.is_error())
    }

    pub fn into_result(self) -> Result<LoadableUnit, CompileError> {
        match self {
            CompilationResult::Success { unit, .. } => Ok(unit),
            CompilationResult::Failure { diagnostics } => Err(CompileError { diagnostics }),
        }
    }
}

/// A failed compilation, as a Rust error.
#[derive(Clone, Debug, thiserror::Error)]
#[error("compilation failed with {} error(s)", error_count(.diagnostics))]
pub struct CompileError {
    pub diagnostics: Vec<Diagnostic>,
}

fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}

/// Compile a source unit against `references`.
///
/// Never panics on bad input: every problem is a diagnostic in the
/// [`CompilationResult::Failure`] variant.
#[tracing::instrument(level = "debug", skip_all, fields(module = %options.module_name))]
pub fn compile(source: &SourceUnit, references: &[Reference], options: &CompileOptions) -> CompilationResult {
    let text = source.text();
    let mut queue = DiagnosticQueue::new();

    let mut metadata = Vec::with_capacity(references.len());
    for reference in references {
        match reference.resolve() {
            Ok(module) => metadata.push(module),
            Err(diag) => {
                queue.add(diag);
            }
        }
    }
    debug!(references = metadata.len(), "references resolved");

    let parsed = parse_source(&text);
    queue.extend(parsed.diagnostics);
    if parsed.unit.is_empty() && !queue.has_errors() {
        queue.add(
            Diagnostic::error(ErrorCode::E1000)
                .with_message("the source unit is empty")
                .with_suggestion("add a namespace or type declaration"),
        );
    }
    debug!("parse complete");
    if queue.has_errors() {
        let mut diagnostics = queue.flush();
        options.warnings_as_errors.apply(&mut diagnostics);
        return CompilationResult::Failure { diagnostics };
    }

    let check_options = CheckOptions {
        module_name: options.module_name.clone(),
        output_kind: options.output_kind,
    };
    let checked = check(&parsed.unit, &metadata, &check_options);
    queue.extend(checked.diagnostics);
    debug!("check complete");

    let mut diagnostics = queue.flush();
    options.warnings_as_errors.apply(&mut diagnostics);
    if diagnostics.iter().any(Diagnostic::is_error) {
        return CompilationResult::Failure { diagnostics };
    }
    match emit(&checked.module) {
        Ok(unit) => {
            debug!(bytes = unit.len(), "emit complete");
            CompilationResult::Success { unit, diagnostics }
        }
        Err(diag) => {
            diagnostics.push(diag);
            CompilationResult::Failure { diagnostics }
        }
    }
}

/// A compilation did not finish within its time limit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("compilation did not finish within {0:?}")]
pub struct CompileTimeout(pub Duration);

/// [`compile`] on a worker thread, giving up after `timeout`.
///
/// A worker that misses the deadline is detached, not cancelled; its
/// result is dropped when it finishes.
pub fn compile_with_timeout(
    source: SourceUnit,
    references: Vec<Reference>,
    options: CompileOptions,
    timeout: Duration,
) -> Result<CompilationResult, CompileTimeout> {
    let (sender, receiver) = crossbeam::channel::bounded(1);
    thread::spawn(move || {
        let result = compile(&source, &references, &options);
        let _ = sender.send(result);
    });
    receiver.recv_timeout(timeout).map_err(|_| CompileTimeout(timeout))
}
