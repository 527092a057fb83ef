//! `kiln demo`: the calculator walkthrough.

use std::io;

use super::CliError;
use crate::demo::{run_demo, DemoError};

pub fn run_demo_command() -> Result<(), CliError> {
    match run_demo(&mut io::stdout().lock(), &mut io::stderr().lock()) {
        Ok(()) => Ok(()),
        // The failing diagnostics were written by the demo.
        Err(DemoError::Compile(_)) => Err(CliError::Reported),
        Err(DemoError::Load(source)) => Err(CliError::Load {
            path: "<generated>".to_string(),
            source,
        }),
        Err(DemoError::Instantiate(e)) => Err(CliError::Instantiate(e)),
        Err(DemoError::Runtime(e)) => Err(CliError::Runtime(e)),
        Err(DemoError::Io(source)) => Err(CliError::Write {
            path: "<stdout>".to_string(),
            source,
        }),
    }
}
