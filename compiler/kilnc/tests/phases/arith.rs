//! Guest integer arithmetic checked against Rust's, property-based.

use std::sync::OnceLock;

use kiln_types::{MethodSig, ModuleMetadata, Ty, TypeMetadata};
use kilnc::{compile, CompileOptions, InvocationHandle, Reference, RuntimeError};
use proptest::prelude::*;

use crate::common::load_quiet;

const OPS: &str = "\
using Contracts;

namespace Guest
{
    public class Ops : IOps
    {
        public int Add(int a, int b) { return a + b; }
        public int Sub(int a, int b) { return a - b; }
        public int Mul(int a, int b) { return a * b; }
        public int Div(int a, int b) { return a / b; }
        public int Rem(int a, int b) { return a % b; }
        public int Max(int a, int b) { return a > b ? a : b; }
    }
}
";

fn ops_interface() -> TypeMetadata {
    let binary = |name: &str| MethodSig::new(name, vec![Ty::Int, Ty::Int], Ty::Int);
    TypeMetadata::interface("Contracts.IOps")
        .with_method(binary("Add"))
        .with_method(binary("Sub"))
        .with_method(binary("Mul"))
        .with_method(binary("Div"))
        .with_method(binary("Rem"))
        .with_method(binary("Max"))
}

/// One compiled and instantiated `Guest.Ops`, shared by every case.
fn ops() -> &'static InvocationHandle {
    static OPS_HANDLE: OnceLock<InvocationHandle> = OnceLock::new();
    OPS_HANDLE.get_or_init(|| {
        let references = [
            Reference::core(),
            Reference::metadata(ModuleMetadata::new("Contracts").with_type(ops_interface())),
        ];
        let unit = compile(&OPS.into(), &references, &CompileOptions::library())
            .into_result()
            .unwrap();
        load_quiet(&unit)
            .instantiate("Guest.Ops", &ops_interface())
            .unwrap()
    })
}

fn call(method: &str, a: i32, b: i32) -> Result<i32, RuntimeError> {
    ops().invoke_int(method, &[a.into(), b.into()])
}

fn expected_division(a: i32, b: i32, op: fn(i32, i32) -> Option<i32>) -> Result<i32, ()> {
    if b == 0 {
        return Err(());
    }
    op(a, b).ok_or(())
}

#[test]
fn test_division_edges() {
    assert!(matches!(call("Div", 1, 0), Err(RuntimeError::DivideByZero)));
    assert!(matches!(call("Rem", 1, 0), Err(RuntimeError::DivideByZero)));
    assert!(matches!(
        call("Div", i32::MIN, -1),
        Err(RuntimeError::Overflow { .. })
    ));
    assert_eq!(call("Div", -7, 2).unwrap(), -3);
    assert_eq!(call("Rem", -7, 2).unwrap(), -1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn wrapping_ops_match(a in any::<i32>(), b in any::<i32>()) {
        prop_assert_eq!(call("Add", a, b).unwrap(), a.wrapping_add(b));
        prop_assert_eq!(call("Sub", a, b).unwrap(), a.wrapping_sub(b));
        prop_assert_eq!(call("Mul", a, b).unwrap(), a.wrapping_mul(b));
        prop_assert_eq!(call("Max", a, b).unwrap(), a.max(b));
    }

    #[test]
    fn division_matches_or_fails(a in any::<i32>(), b in prop_oneof![any::<i32>(), -2..=2i32]) {
        prop_assert_eq!(call("Div", a, b).map_err(|_| ()), expected_division(a, b, i32::checked_div));
        prop_assert_eq!(call("Rem", a, b).map_err(|_| ()), expected_division(a, b, i32::checked_rem));
    }
}
