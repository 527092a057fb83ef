//! `kiln fmt`: print a source file in normalized form.

use std::path::Path;

use super::{read_file, CliError, CommandArgs};
use crate::report::report;

/// With `--check`, prints nothing and returns `false` if the file is not
/// already formatted.
pub fn format_file(args: &CommandArgs) -> Result<bool, CliError> {
    let path = Path::new(args.positional(0, "source file")?);
    let text = read_file(path)?;
    let formatted = match kiln_fmt::format_source(&kiln_fmt::tabs_to_spaces(&text)) {
        Ok(formatted) => formatted,
        Err(diagnostics) => {
            report(&diagnostics, &path.display().to_string(), &text, args.format);
            return Err(CliError::Reported);
        }
    };
    if args.check {
        return Ok(formatted == text);
    }
    print!("{formatted}");
    Ok(true)
}
