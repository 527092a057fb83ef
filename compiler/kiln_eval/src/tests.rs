use std::thread;

use kiln_types::{MethodSig, Ty, TypeMetadata};
use pretty_assertions::assert_eq;

use super::*;
use crate::test_support::{load_source, CALCULATOR};

struct Adder(InvocationHandle);

impl Capability for Adder {
    fn interface() -> TypeMetadata {
        TypeMetadata::interface("Playground.ICalculator")
            .with_method(MethodSig::new("Add", vec![Ty::Int, Ty::Int], Ty::Int))
    }

    fn bind(handle: InvocationHandle) -> Self {
        Adder(handle)
    }
}

impl Adder {
    fn add(&self, a: i32, b: i32) -> Result<i32, RuntimeError> {
        self.0.invoke_int("Add", &[a.into(), b.into()])
    }
}

#[test]
fn test_round_trip_through_host_capability() {
    let module = load_source(CALCULATOR);
    let adder: Adder = module
        .instantiate_as("GeneratedCalculator.DynamicCalculator")
        .unwrap();
    assert_eq!(adder.add(2, 3), Ok(5));
}

#[test]
fn test_handles_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ModuleHandle>();
    assert_send_sync::<InvocationHandle>();

    let module = load_source(CALCULATOR);
    let adder: Adder = module
        .instantiate_as("GeneratedCalculator.DynamicCalculator")
        .unwrap();
    let results: Vec<i32> = thread::scope(|scope| {
        let workers: Vec<_> = (0..4)
            .map(|i| {
                let adder = &adder;
                scope.spawn(move || adder.add(i, i).unwrap())
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });
    assert_eq!(results, vec![0, 2, 4, 6]);
}

#[test]
fn test_error_messages() {
    assert_eq!(
        RuntimeError::StepLimit { limit: 10 }.to_string(),
        "execution exceeded the limit of 10 steps"
    );
    assert_eq!(
        InstantiateError::TypeNotFound("A.B".to_string()).to_string(),
        "type `A.B` was not found in the unit"
    );
}
