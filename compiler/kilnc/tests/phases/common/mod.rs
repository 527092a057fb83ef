//! Compile and load helpers shared by the phase tests.

use kiln_eval::silent_console;
use kilnc::{compile, default_references, CompileOptions, LoadOptions, LoadableUnit, ModuleHandle, Reference};

pub const CALCULATOR: &str = "\
using Playground;

namespace GeneratedCalculator
{
    public class DynamicCalculator : ICalculator
    {
        public int Add(int a, int b)
        {
            return a + b;
        }
    }
}
";

/// Compile `source` against `references`, failing the test with the
/// diagnostics if it does not compile.
pub fn compile_against(source: &str, references: &[Reference], options: &CompileOptions) -> LoadableUnit {
    let result = compile(&source.into(), references, options);
    match result.into_result() {
        Ok(unit) => unit,
        Err(err) => panic!("compile failed: {:#?}", err.diagnostics),
    }
}

pub fn compile_library(source: &str) -> LoadableUnit {
    compile_against(source, &default_references(), &CompileOptions::library())
}

/// Load options with console output discarded.
pub fn quiet() -> LoadOptions {
    LoadOptions::default().console(silent_console())
}

pub fn load_quiet(unit: &LoadableUnit) -> ModuleHandle {
    kilnc::load(unit, quiet()).unwrap()
}
