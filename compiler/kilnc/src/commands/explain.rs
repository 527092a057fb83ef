//! `kiln explain`: long-form documentation for an error code.

use kiln_diagnostic::{ErrorCode, ErrorDocs};

use super::CliError;

pub fn explain_error(code: &str) -> Result<(), CliError> {
    let code: ErrorCode = code.parse().map_err(|_| {
        CliError::Usage(format!(
            "unknown error code `{code}`; codes look like E2001"
        ))
    })?;
    print!("{}", ErrorDocs::render(code));
    Ok(())
}
