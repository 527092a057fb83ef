//! `kiln run`: execute an executable unit's entry point.

use std::path::Path;

use kiln_types::OutputKind;

use super::{load_file, CliError, CommandArgs};

/// Returns the value `Main` returned, which becomes the exit status.
pub fn run_file(args: &CommandArgs) -> Result<i32, CliError> {
    let path = Path::new(args.positional(0, "source file or unit")?);
    let module = load_file(path, args, OutputKind::Executable)?;
    Ok(module.run_main()?)
}
