//! `kiln build`: compile a source file to a `.kunit` file.

use std::path::{Path, PathBuf};

use kiln_types::OutputKind;

use super::{compile_file, CliError, CommandArgs, UNIT_EXTENSION};

/// Compile `args.positional[0]` and write the unit. Returns the path written.
pub fn build_file(args: &CommandArgs) -> Result<PathBuf, CliError> {
    let path = Path::new(args.positional(0, "source file")?);
    let output_kind = if args.executable {
        OutputKind::Executable
    } else {
        OutputKind::Library
    };
    let unit = compile_file(path, args, output_kind)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| path.with_extension(UNIT_EXTENSION));
    unit.write_to(&output).map_err(|source| CliError::Write {
        path: output.display().to_string(),
        source,
    })?;
    tracing::debug!(path = %output.display(), bytes = unit.len(), "unit written");
    Ok(output)
}
