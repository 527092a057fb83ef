//! Parse errors.

use kiln_diagnostic::{Diagnostic, ErrorCode};
use kiln_ir::{Span, TokenKind};

/// A failed grammar production.
///
/// Boxed so `Result<T, ParseError>` stays small on the hot path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ParseError(Box<Diagnostic>);

pub(crate) type PResult<T> = Result<T, ParseError>;

impl ParseError {
    pub(crate) fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        ParseError(Box::new(
            Diagnostic::error(code).with_message(message).with_label(span, ""),
        ))
    }

    /// Replace the primary label text.
    pub(crate) fn with_context(mut self, context: impl Into<String>) -> Self {
        if let Some(label) = self.0.labels.iter_mut().find(|l| l.is_primary) {
            label.message = context.into();
        }
        self
    }

    pub(crate) fn with_note(mut self, note: impl Into<String>) -> Self {
        self.0.notes.push(note.into());
        self
    }

    pub(crate) fn span(&self) -> Span {
        self.0.primary_span().unwrap_or_default()
    }

    pub(crate) fn into_diagnostic(self) -> Diagnostic {
        *self.0
    }

    /// `expected X, found Y`.
    #[cold]
    pub(crate) fn expected(what: &str, found: &TokenKind, span: Span) -> Self {
        ParseError::new(
            ErrorCode::E1001,
            format!("expected {what}, found {}", found.describe()),
            span,
        )
        .with_context(format!("expected {what}"))
    }
}

impl From<Diagnostic> for ParseError {
    fn from(diag: Diagnostic) -> Self {
        ParseError(Box::new(diag))
    }
}
