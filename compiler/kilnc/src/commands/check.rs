//! `kiln check`: compile without writing anything.

use std::path::Path;

use kiln_types::OutputKind;

use super::{compile_file, CliError, CommandArgs};

pub fn check_file(args: &CommandArgs) -> Result<(), CliError> {
    let path = Path::new(args.positional(0, "source file")?);
    let output_kind = if args.executable {
        OutputKind::Executable
    } else {
        OutputKind::Library
    };
    let unit = compile_file(path, args, output_kind)?;
    println!("OK: {} ({} bytes)", path.display(), unit.len());
    Ok(())
}
