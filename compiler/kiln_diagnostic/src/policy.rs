//! Warning escalation.

use crate::{Diagnostic, ErrorCode};

/// Which warnings are promoted to errors after a compilation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum WarningsAsErrors {
    /// Warnings stay warnings.
    #[default]
    None,
    /// Every warning becomes an error.
    All,
    /// Only warnings with one of these codes become errors.
    Codes(Vec<ErrorCode>),
}

impl WarningsAsErrors {
    /// Whether a warning with `code` is escalated under this policy.
    pub fn escalates(&self, code: ErrorCode) -> bool {
        match self {
            WarningsAsErrors::None => false,
            WarningsAsErrors::All => code.is_warning(),
            WarningsAsErrors::Codes(codes) => code.is_warning() && codes.contains(&code),
        }
    }

    /// Mark every matching warning in `diagnostics` as an error.
    ///
    /// Returns the number of diagnostics escalated.
    pub fn apply(&self, diagnostics: &mut [Diagnostic]) -> usize {
        let mut escalated = 0;
        for diag in diagnostics.iter_mut() {
            if diag.is_warning() && self.escalates(diag.code) {
                diag.escalate();
                escalated += 1;
            }
        }
        escalated
    }
}
