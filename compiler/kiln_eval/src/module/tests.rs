use kiln_types::{MethodSig, OutputKind, Ty, TypeMetadata};
use pretty_assertions::assert_eq;

use super::*;
use crate::console::silent_console;
use crate::test_support::{compile, compile_with, icalculator, load_source, CALCULATOR};

#[test]
fn test_load_calculator() {
    let module = load_source(CALCULATOR);
    assert_eq!(module.output_kind(), OutputKind::Library);
    assert_eq!(
        module.type_names().collect::<Vec<_>>(),
        vec!["GeneratedCalculator.DynamicCalculator"]
    );
    assert!(module
        .metadata()
        .find_type("GeneratedCalculator.DynamicCalculator")
        .is_some());
}

#[test]
fn test_instantiate_and_invoke() {
    let module = load_source(CALCULATOR);
    let handle = module
        .instantiate("GeneratedCalculator.DynamicCalculator", &icalculator())
        .unwrap();
    assert_eq!(handle.capability(), "Playground.ICalculator");
    assert_eq!(handle.type_name(), "GeneratedCalculator.DynamicCalculator");
    assert_eq!(handle.invoke_int("Add", &[2.into(), 3.into()]).unwrap(), 5);
}

#[test]
fn test_type_not_found() {
    let module = load_source(CALCULATOR);
    assert_eq!(
        module.instantiate("GeneratedCalculator.Missing", &icalculator()).unwrap_err(),
        InstantiateError::TypeNotFound("GeneratedCalculator.Missing".to_string())
    );
}

#[test]
fn test_type_must_implement_the_interface() {
    let module = load_source("public class Plain { public int Add(int a, int b) { return a + b; } }");
    let err = module.instantiate("Plain", &icalculator()).unwrap_err();
    assert!(matches!(
        err,
        InstantiateError::CapabilityMismatch { ref reason, .. } if reason.contains("does not implement")
    ));
}

#[test]
fn test_every_capability_method_must_match() {
    let module = load_source(CALCULATOR);
    let wider = icalculator().with_method(MethodSig::new("Sub", vec![Ty::Int, Ty::Int], Ty::Int));
    let err = module
        .instantiate("GeneratedCalculator.DynamicCalculator", &wider)
        .unwrap_err();
    assert_eq!(
        err,
        InstantiateError::CapabilityMismatch {
            type_name: "GeneratedCalculator.DynamicCalculator".to_string(),
            capability: "Playground.ICalculator".to_string(),
            reason: "no public method matches `ICalculator.Sub(int, int)`".to_string(),
        }
    );
}

#[test]
fn test_static_classes_and_interfaces_are_not_instantiable() {
    let module = load_source(
        "public static class Util { public static int One() { return 1; } } public interface IThing { int F(); }",
    );
    assert!(matches!(
        module.instantiate("Util", &icalculator()),
        Err(InstantiateError::NotInstantiable { .. })
    ));
    assert!(matches!(
        module.instantiate("IThing", &TypeMetadata::interface("IThing")),
        Err(InstantiateError::NotInstantiable { .. })
    ));
}

#[test]
fn test_failing_field_initializer() {
    let module = load_source(
        "\
using System;
using Playground;
public class Bad : ICalculator
{
    private int start = Math.Abs(-2147483648);
    public int Add(int a, int b) { return start + a + b; }
}
",
    );
    let err = module.instantiate("Bad", &icalculator()).unwrap_err();
    assert!(matches!(
        err,
        InstantiateError::Initializer {
            source: RuntimeError::Overflow { .. },
            ..
        }
    ));
}

#[test]
fn test_failing_static_initializer_fails_load() {
    let unit = compile("using System; public static class S { private static int v = Math.Abs(-2147483648); }");
    let err = load(&unit, LoadOptions::default().console(silent_console())).unwrap_err();
    assert!(matches!(
        err,
        LoadError::StaticInitializer { ref type_name, .. } if type_name == "S"
    ));
}

#[test]
fn test_field_initializers_run_per_instance() {
    let module = load_source(
        "\
using Playground;
public class Acc : ICalculator
{
    private int total = 100;
    public int Add(int a, int b) { total += a + b; return total; }
}
",
    );
    let first = module.instantiate("Acc", &icalculator()).unwrap();
    let second = module.instantiate("Acc", &icalculator()).unwrap();
    assert_eq!(first.invoke_int("Add", &[1.into(), 2.into()]).unwrap(), 103);
    assert_eq!(first.invoke_int("Add", &[1.into(), 2.into()]).unwrap(), 106);
    assert_eq!(second.invoke_int("Add", &[0.into(), 0.into()]).unwrap(), 100);
}

#[test]
fn test_static_fields_are_shared() {
    let module = load_source(
        "\
using Playground;
public class Counter : ICalculator
{
    private static int calls;
    public int Add(int a, int b) { calls += 1; return calls; }
}
",
    );
    let first = module.instantiate("Counter", &icalculator()).unwrap();
    let second = module.instantiate("Counter", &icalculator()).unwrap();
    assert_eq!(first.invoke_int("Add", &[0.into(), 0.into()]).unwrap(), 1);
    assert_eq!(second.invoke_int("Add", &[0.into(), 0.into()]).unwrap(), 2);
}

#[test]
fn test_calls_into_a_dependency() {
    let util = load_source("public static class Util { public static int Twice(int x) { return x * 2; } }");
    let source = "\
using Playground;
public class Calc : ICalculator
{
    public int Add(int a, int b) { return Util.Twice(a) + b; }
}
";
    let unit = compile_with(source, OutputKind::Library, &[util.metadata().clone()]);

    let err = load(&unit, LoadOptions::default()).unwrap_err();
    assert_eq!(
        err,
        LoadError::UnresolvedCall {
            type_name: "Util".to_string(),
            method: "Twice".to_string(),
        }
    );

    let module = load(&unit, LoadOptions::default().dependency(util)).unwrap();
    let calc = module.instantiate("Calc", &icalculator()).unwrap();
    assert_eq!(calc.invoke_int("Add", &[2.into(), 3.into()]).unwrap(), 7);
}

#[test]
fn test_run_main() {
    let unit = compile_with(
        "using System; public class Program { public static int Main() { return Math.Max(3, 7); } }",
        OutputKind::Executable,
        &[],
    );
    let module = load(&unit, LoadOptions::default()).unwrap();
    assert_eq!(module.run_main(), Ok(7));

    let library = load_source(CALCULATOR);
    assert_eq!(library.run_main(), Err(RuntimeError::NoEntryPoint));
}

#[test]
fn test_void_main_exits_with_zero() {
    let unit = compile_with(
        "public class Program { public static void Main() { } }",
        OutputKind::Executable,
        &[],
    );
    let module = load(&unit, LoadOptions::default()).unwrap();
    assert_eq!(module.run_main(), Ok(0));
}

#[test]
fn test_corrupt_unit_is_rejected() {
    let mut bytes = compile(CALCULATOR).into_bytes();
    if let Some(last) = bytes.last_mut() {
        *last ^= 0xFF;
    }
    let err = load(&LoadableUnit::from_bytes(bytes), LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Format(_)));
}
