//! Source or tree in, capability calls out.

use kiln_eval::{buffer_console, ExecutionLimits, LoadOptions};
use kilnc::demo::{build_dynamic_calculator, run_demo, Calculator, DynamicCalculator, StaticCalculator, GENERATED_TYPE};
use kilnc::{calculator_interface, RuntimeError};
use pretty_assertions::assert_eq;

use crate::common::{compile_library, load_quiet, quiet, CALCULATOR};

#[test]
fn test_generated_calculator_adds() {
    let (module, calculator) = build_dynamic_calculator(quiet()).unwrap();
    assert_eq!(module.name(), "DynamicUnit");
    assert_eq!(calculator.add(2, 3).unwrap(), 5);
    assert_eq!(calculator.add(-7, 7).unwrap(), 0);
    assert_eq!(calculator.add(i32::MAX, 1).unwrap(), i32::MIN);
}

#[test]
fn test_static_and_dynamic_behind_one_trait() {
    let (_module, dynamic) = build_dynamic_calculator(quiet()).unwrap();
    let calculators: Vec<Box<dyn Calculator>> = vec![Box::new(StaticCalculator), Box::new(dynamic)];
    let sums: Vec<i32> = calculators.iter().map(|c| c.add(2, 3).unwrap()).collect();
    assert_eq!(sums, vec![666, 5]);
}

#[test]
fn test_text_source_loads_like_the_tree() {
    let module = load_quiet(&compile_library(CALCULATOR));
    let calculator: DynamicCalculator = module.instantiate_as(GENERATED_TYPE).unwrap();
    assert_eq!(calculator.add(40, 2).unwrap(), 42);

    let handle = module
        .instantiate(GENERATED_TYPE, &calculator_interface())
        .unwrap();
    assert_eq!(handle.capability(), "Playground.ICalculator");
    assert_eq!(handle.type_name(), GENERATED_TYPE);
}

#[test]
fn test_demo_output() {
    let mut out = Vec::new();
    let mut err = Vec::new();
    run_demo(&mut out, &mut err).unwrap();
    let out = String::from_utf8(out).unwrap();
    assert!(out.starts_with("Hello World!\n"));
    assert!(out.contains("namespace GeneratedCalculator"));
    assert!(out.contains("static: Add(2, 3) = 666"));
    assert!(out.contains("dynamic: Add(2, 3) = 5"));
    assert!(err.is_empty());
}

#[test]
fn test_guest_console_output_is_captured() {
    let source = "\
using System;
using Playground;

namespace Logging
{
    public class LoudCalculator : ICalculator
    {
        public int Add(int a, int b)
        {
            int sum = a + b;
            Console.WriteLine(\"adding \" + a + \" and \" + b);
            return sum;
        }
    }
}
";
    let console = buffer_console();
    let unit = compile_library(source);
    let module = kilnc::load(&unit, LoadOptions::default().console(console.clone())).unwrap();
    let calculator: DynamicCalculator = module.instantiate_as("Logging.LoudCalculator").unwrap();
    assert_eq!(calculator.add(2, 3).unwrap(), 5);
    assert_eq!(calculator.add(1, 1).unwrap(), 2);
    assert_eq!(console.output(), "adding 2 and 3\nadding 1 and 1\n");
}

#[test]
fn test_runaway_guest_is_stopped() {
    let source = "\
using Playground;

namespace Runaway
{
    public class Spinner : ICalculator
    {
        public int Add(int a, int b)
        {
            while (true)
            {
            }
        }
    }
}
";
    let unit = compile_library(source);
    let limits = ExecutionLimits {
        max_steps: 10_000,
        ..ExecutionLimits::default()
    };
    let module = kilnc::load(&unit, quiet().limits(limits)).unwrap();
    let calculator: DynamicCalculator = module.instantiate_as("Runaway.Spinner").unwrap();
    assert!(matches!(
        calculator.add(1, 2),
        Err(RuntimeError::StepLimit { limit: 10_000 })
    ));
}
