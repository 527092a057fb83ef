//! Diagnostic emitters: colored terminal text with source snippets, or a
//! JSON array for editors and build tools.
//!
//! Both implement [`DiagnosticEmitter`]. A compile's diagnostics go out in
//! one [`report`](DiagnosticEmitter::report) call, which also prints the
//! closing summary counted by [`Tally`].

mod json;
mod terminal;

pub use json::JsonEmitter;
pub use terminal::{ColorMode, TerminalEmitter};

use std::fmt;

use crate::{Diagnostic, Severity};

/// Counts of a diagnostic list by effective severity. Escalated warnings
/// count as errors.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl Tally {
    pub fn of(diagnostics: &[Diagnostic]) -> Self {
        let mut tally = Tally::default();
        for diag in diagnostics {
            match diag.effective_severity() {
                Severity::Error => tally.errors += 1,
                Severity::Warning => tally.warnings += 1,
                Severity::Info => tally.infos += 1,
            }
        }
        tally
    }

    /// Whether a compile reporting these diagnostics failed.
    pub fn failed(&self) -> bool {
        self.errors > 0
    }
}

pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: &Diagnostic);

    fn emit_all(&mut self, diagnostics: &[Diagnostic]) {
        for diag in diagnostics {
            self.emit(diag);
        }
    }

    fn flush(&mut self);

    /// Closing line after a compile. Emitters with nothing to add ignore it.
    fn emit_summary(&mut self, error_count: usize, warning_count: usize);

    /// Everything from one compile: the diagnostics in order, the summary,
    /// then a flush. Returns the tally it summarized.
    fn report(&mut self, diagnostics: &[Diagnostic]) -> Tally {
        let tally = Tally::of(diagnostics);
        self.emit_all(diagnostics);
        self.emit_summary(tally.errors, tally.warnings);
        self.flush();
        tally
    }
}

/// `", "`-style separator for element `index` of `total`: a comma unless it
/// is the last.
pub(crate) fn separator(index: usize, total: usize) -> &'static str {
    if index + 1 < total {
        ","
    } else {
        ""
    }
}

/// Displays a string as the body of a JSON string literal. Escapes are
/// written straight to the formatter.
pub(crate) struct JsonStr<'a>(pub &'a str);

impl fmt::Display for JsonStr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rest = self.0;
        while let Some(pos) = rest.find(|c: char| c == '"' || c == '\\' || c.is_control()) {
            f.write_str(&rest[..pos])?;
            let c = rest[pos..].chars().next().unwrap_or_default();
            match c {
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                other => write!(f, "\\u{:04x}", u32::from(other))?,
            }
            rest = &rest[pos + c.len_utf8()..];
        }
        f.write_str(rest)
    }
}
