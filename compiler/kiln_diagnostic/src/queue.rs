//! Diagnostic queue for collecting, deduplicating, and ordering diagnostics.
//!
//! Features:
//! - Error limit to keep cascades from flooding the output
//! - Deduplication of identical diagnostics at the same location
//! - Stable ordering by source position on flush

use rustc_hash::FxHashSet;

use kiln_ir::Span;

use crate::{Diagnostic, ErrorCode};

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of errors kept (0 = unlimited).
    pub error_limit: usize,
    /// Drop a diagnostic whose code, span and message match an earlier one.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            error_limit: 100,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            error_limit: 0,
            deduplicate: false,
        }
    }
}

/// Queue for collecting diagnostics from all phases of one compilation.
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// queue.extend(lex_output.diagnostics);
/// queue.extend(parse_output.diagnostics);
/// let ordered = queue.flush();
/// ```
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<(u64, Diagnostic)>,
    seen: FxHashSet<(ErrorCode, Span, String)>,
    error_count: usize,
    warning_count: usize,
    next_seq: u64,
    truncated: bool,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic.
    ///
    /// Returns `true` if the diagnostic was kept, `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();
        if is_error && self.config.error_limit > 0 && self.error_count >= self.config.error_limit
        {
            self.truncated = true;
            return false;
        }

        if self.config.deduplicate {
            let key = (
                diag.code,
                diag.primary_span().unwrap_or_default(),
                diag.message.clone(),
            );
            if !self.seen.insert(key) {
                return false;
            }
        }

        if is_error {
            self.error_count += 1;
        } else if diag.is_warning() {
            self.warning_count += 1;
        }
        self.diagnostics.push((self.next_seq, diag));
        self.next_seq += 1;
        true
    }

    pub fn extend(&mut self, diags: impl IntoIterator<Item = Diagnostic>) {
        for diag in diags {
            self.add(diag);
        }
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// True if errors were dropped because the error limit was reached.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    /// Take all diagnostics, ordered by primary span start.
    ///
    /// Diagnostics without a location sort first; ties keep insertion order.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut entries = std::mem::take(&mut self.diagnostics);
        entries.sort_by_key(|(seq, diag)| (diag.primary_span().map(|s| s.start), *seq));
        self.seen.clear();
        self.error_count = 0;
        self.warning_count = 0;
        self.truncated = false;
        entries.into_iter().map(|(_, diag)| diag).collect()
    }
}

#[cfg(test)]
mod tests;
