//! Compiled units on disk, as references and as dependencies.

use kilnc::demo::DynamicCalculator;
use kilnc::{
    compile, default_references, CompileOptions, ErrorCode, LoadError, LoadableUnit, OutputKind, Reference,
};
use pretty_assertions::assert_eq;

use crate::common::{compile_against, compile_library, load_quiet, quiet, CALCULATOR};

const MATH_LIBRARY: &str = "\
namespace Shared
{
    public static class Arith
    {
        public static int Triple(int x)
        {
            return x * 3;
        }
    }
}
";

const TRIPLING_CALCULATOR: &str = "\
using Playground;
using Shared;

namespace Client
{
    public class TriplingCalculator : ICalculator
    {
        public int Add(int a, int b)
        {
            return Arith.Triple(a + b);
        }
    }
}
";

#[test]
fn test_unit_survives_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calc.kunit");
    let unit = compile_library(CALCULATOR);
    unit.write_to(&path).unwrap();

    let read = LoadableUnit::read_from(&path).unwrap();
    assert_eq!(read.as_bytes(), unit.as_bytes());
    assert_eq!(read.output_kind().unwrap(), OutputKind::Library);

    let module = load_quiet(&read);
    let calculator: DynamicCalculator = module.instantiate_as("GeneratedCalculator.DynamicCalculator").unwrap();
    assert_eq!(kilnc::demo::Calculator::add(&calculator, 2, 3).unwrap(), 5);
}

#[test]
fn test_library_reference_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.kunit");
    let library = compile_against(
        MATH_LIBRARY,
        &default_references(),
        &CompileOptions::library().with_module_name("Shared"),
    );
    library.write_to(&path).unwrap();

    let mut references = default_references();
    references.push(Reference::path(&path));
    let client = compile_against(TRIPLING_CALCULATOR, &references, &CompileOptions::library());

    let shared = load_quiet(&library);
    let module = kilnc::load(&client, quiet().dependency(shared)).unwrap();
    let calculator: DynamicCalculator = module.instantiate_as("Client.TriplingCalculator").unwrap();
    assert_eq!(kilnc::demo::Calculator::add(&calculator, 2, 3).unwrap(), 15);
}

#[test]
fn test_missing_dependency_fails_at_load() {
    let library = compile_library(MATH_LIBRARY);
    let mut references = default_references();
    references.push(Reference::unit(&library));
    let client = compile_against(TRIPLING_CALCULATOR, &references, &CompileOptions::library());

    let err = kilnc::load(&client, quiet()).unwrap_err();
    assert!(matches!(
        err,
        LoadError::UnresolvedCall { ref type_name, ref method }
            if type_name == "Shared.Arith" && method == "Triple"
    ));
}

#[test]
fn test_without_the_reference_the_client_does_not_compile() {
    let result = compile(
        &TRIPLING_CALCULATOR.into(),
        &default_references(),
        &CompileOptions::library(),
    );
    assert!(!result.is_success());
    assert!(result.errors().any(|d| d.code == ErrorCode::E2008));
}

#[test]
fn test_damaged_units_are_rejected() {
    let unit = compile_library(CALCULATOR);

    let mut bytes = unit.as_bytes().to_vec();
    if let Some(last) = bytes.last_mut() {
        *last ^= 0xFF;
    }
    let damaged = LoadableUnit::from_bytes(bytes);
    assert!(matches!(kilnc::load(&damaged, quiet()), Err(LoadError::Format(_))));

    let truncated = LoadableUnit::from_bytes(unit.as_bytes()[..4].to_vec());
    assert!(matches!(kilnc::load(&truncated, quiet()), Err(LoadError::Format(_))));

    let unreadable = Reference::unit(&truncated).resolve().unwrap_err();
    assert_eq!(unreadable.code, ErrorCode::E2019);
}
