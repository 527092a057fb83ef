//! Diagnostic system for Kiln compilation results.
//!
//! Every phase reports problems as plain [`Diagnostic`] values:
//! - an [`ErrorCode`] identifier (`E2003`) for searchability
//! - a message (what went wrong)
//! - a primary label (where it went wrong)
//! - notes and help suggestions (why, and how to fix)
//!
//! A diagnostic's [`Severity`] is one of error, warning, or info. Warnings can
//! be escalated by a [`WarningsAsErrors`] policy; an escalated warning counts
//! as an error for the purpose of deciding whether compilation succeeded.

mod diagnostic;
pub mod emitter;
mod error_code;
mod explain;
mod policy;
pub mod queue;

pub use diagnostic::{
    expected_expression, type_mismatch, unclosed_delimiter, unknown_identifier,
    Diagnostic, Label, Severity,
};
pub use error_code::{ErrorCode, ParseErrorCodeError};
pub use explain::ErrorDocs;
pub use policy::WarningsAsErrors;
pub use queue::DiagnosticQueue;
