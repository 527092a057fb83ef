//! `kiln calc`: bind a type as a calculator and call `Add`.

use std::path::Path;

use kiln_types::OutputKind;

use super::{load_file, CliError, CommandArgs};
use crate::demo::{Calculator, DynamicCalculator};

pub fn calc_file(args: &CommandArgs) -> Result<i32, CliError> {
    let path = Path::new(args.positional(0, "source file or unit")?);
    let type_name = args.positional(1, "type name")?;
    let a = int_arg(args.positional(2, "first operand")?)?;
    let b = int_arg(args.positional(3, "second operand")?)?;

    let module = load_file(path, args, OutputKind::Library)?;
    let calculator = module.instantiate_as::<DynamicCalculator>(type_name)?;
    let sum = calculator.add(a, b)?;
    println!("{sum}");
    Ok(sum)
}

fn int_arg(text: &str) -> Result<i32, CliError> {
    text.parse()
        .map_err(|_| CliError::Usage(format!("`{text}` is not a 32-bit integer")))
}
