//! Source → loaded module, for tests.

use kiln_emit::{emit, LoadableUnit};
use kiln_parse::parse_source;
use kiln_types::{check, core_metadata, CheckOptions, MethodSig, ModuleMetadata, OutputKind, Ty, TypeMetadata};

use crate::{load, silent_console, LoadOptions, ModuleHandle};

pub(crate) const CALCULATOR: &str = "\
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

pub(crate) fn icalculator() -> TypeMetadata {
    TypeMetadata::interface("Playground.ICalculator")
        .with_method(MethodSig::new("Add", vec![Ty::Int, Ty::Int], Ty::Int))
}

pub(crate) fn contracts() -> ModuleMetadata {
    ModuleMetadata::new("Playground").with_type(icalculator())
}

pub(crate) fn compile_with(source: &str, output_kind: OutputKind, references: &[ModuleMetadata]) -> LoadableUnit {
    let parsed = parse_source(source);
    assert!(!parsed.has_errors(), "{:#?}", parsed.diagnostics);
    let mut all = vec![core_metadata(), contracts()];
    all.extend_from_slice(references);
    let options = CheckOptions {
        output_kind,
        ..CheckOptions::default()
    };
    let checked = check(&parsed.unit, &all, &options);
    assert!(!checked.has_errors(), "{:#?}", checked.diagnostics);
    emit(&checked.module).unwrap()
}

pub(crate) fn compile(source: &str) -> LoadableUnit {
    compile_with(source, OutputKind::Library, &[])
}

pub(crate) fn load_source(source: &str) -> ModuleHandle {
    load(&compile(source), LoadOptions::default().console(silent_console())).unwrap()
}
