//! Writing diagnostics to the error stream.

use std::io::{self, IsTerminal};

use kiln_diagnostic::emitter::{ColorMode, DiagnosticEmitter, JsonEmitter, TerminalEmitter};
use kiln_diagnostic::Diagnostic;

/// Output format for diagnostics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

/// Write `diagnostics` to stderr. Terminal output renders snippets from
/// `source` and ends with an error/warning summary.
pub fn report(diagnostics: &[Diagnostic], source_name: &str, source: &str, format: ReportFormat) {
    match format {
        ReportFormat::Json => {
            let mut emitter = JsonEmitter::new(io::stderr());
            emitter.begin();
            emitter.emit_all(diagnostics);
            emitter.end();
            emitter.flush();
        }
        ReportFormat::Terminal => {
            if diagnostics.is_empty() {
                return;
            }
            let is_tty = io::stderr().is_terminal();
            let mut emitter = TerminalEmitter::stderr(ColorMode::Auto, is_tty).with_source(source_name, source);
            emitter.report(diagnostics);
        }
    }
}
