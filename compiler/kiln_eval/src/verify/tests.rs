use kiln_emit::{CallTarget, EntryImage};
use kiln_types::{MethodSig, ModuleMetadata, OutputKind, Ty};
use pretty_assertions::assert_eq;

use super::*;

fn method(sig: MethodSig, locals: u16, code: Vec<Op>) -> MethodCode {
    MethodCode { sig, locals, code }
}

fn add_method(code: Vec<Op>) -> MethodCode {
    method(MethodSig::new("Add", vec![Ty::Int, Ty::Int], Ty::Int), 2, code)
}

fn class(methods: Vec<MethodCode>) -> TypeImage {
    TypeImage {
        full_name: "Calc".to_string(),
        kind: TypeKind::Class,
        is_static: false,
        is_public: true,
        interfaces: Vec::new(),
        fields: Vec::new(),
        methods,
        init: None,
        static_init: None,
    }
}

fn image(types: Vec<TypeImage>) -> ModuleImage {
    ModuleImage {
        name: "Test".to_string(),
        output_kind: OutputKind::Library,
        types,
        strings: Vec::new(),
        call_targets: Vec::new(),
        globals: Vec::new(),
        entry_point: None,
        metadata: ModuleMetadata::new("Test"),
    }
}

fn message(image: &ModuleImage) -> String {
    verify(image).unwrap_err().message
}

#[test]
fn test_valid_add() {
    let add = add_method(vec![Op::LoadLocal(0), Op::LoadLocal(1), Op::Add, Op::ReturnValue]);
    assert_eq!(verify(&image(vec![class(vec![add])])), Ok(()));
}

#[test]
fn test_stack_underflow() {
    let add = add_method(vec![Op::LoadLocal(0), Op::Add, Op::ReturnValue]);
    let err = verify(&image(vec![class(vec![add])])).unwrap_err();
    assert_eq!(err.at, Some(1));
    assert_eq!(err.message, "operand stack underflow");
    assert_eq!(err.to_string(), "`Calc.Add` at @1: operand stack underflow");
}

#[test]
fn test_jump_outside_method() {
    let add = add_method(vec![Op::Jump(9)]);
    assert!(message(&image(vec![class(vec![add])])).contains("outside the method"));
}

#[test]
fn test_falling_off_the_end() {
    let add = add_method(vec![Op::LoadLocal(0), Op::Pop]);
    assert_eq!(
        message(&image(vec![class(vec![add])])),
        "control falls off the end of the method"
    );
}

#[test]
fn test_depth_must_agree_at_merge() {
    // Only one branch leaves a value on the stack before the join at @3.
    let add = add_method(vec![
        Op::PushBool(true),
        Op::JumpIfFalse(3),
        Op::PushInt(1),
        Op::PushInt(2),
        Op::ReturnValue,
    ]);
    assert!(message(&image(vec![class(vec![add])])).contains("disagrees"));
}

#[test]
fn test_this_in_static_method() {
    let m = method(MethodSig::new_static("F", vec![], Ty::Void), 0, vec![Op::LoadThis, Op::Pop, Op::Return]);
    assert_eq!(
        message(&image(vec![class(vec![m])])),
        "`this` used in a static method"
    );
}

#[test]
fn test_return_kind_must_match() {
    let add = add_method(vec![Op::Return]);
    assert_eq!(message(&image(vec![class(vec![add])])), "method must return a value");
}

#[test]
fn test_operand_ranges() {
    let add = add_method(vec![Op::LoadLocal(2), Op::ReturnValue]);
    assert!(message(&image(vec![class(vec![add])])).contains("local slot 2"));

    let add = add_method(vec![Op::PushStr(0), Op::ReturnValue]);
    assert_eq!(message(&image(vec![class(vec![add])])), "string #0 does not exist");

    let add = add_method(vec![Op::CallStatic(0), Op::ReturnValue]);
    assert_eq!(message(&image(vec![class(vec![add])])), "call target $0 does not exist");
}

#[test]
fn test_call_effects_use_target_arity() {
    let mut module = image(vec![class(vec![add_method(vec![
        Op::LoadLocal(0),
        Op::LoadLocal(1),
        Op::CallStatic(0),
        Op::ReturnValue,
    ])])]);
    module.call_targets.push(CallTarget {
        type_name: "Calc".to_string(),
        method: "Sum3".to_string(),
        argc: 3,
        returns_value: true,
    });
    let err = verify(&module).unwrap_err();
    assert_eq!(err.at, Some(2));
    assert_eq!(err.message, "operand stack underflow");

    module.call_targets[0].argc = 2;
    assert_eq!(verify(&module), Ok(()));
}

#[test]
fn test_class_method_needs_code() {
    let add = add_method(Vec::new());
    assert_eq!(message(&image(vec![class(vec![add])])), "class method has no code");
}

#[test]
fn test_entry_point_must_be_static() {
    let add = add_method(vec![Op::LoadLocal(0), Op::ReturnValue]);
    let mut module = image(vec![class(vec![add])]);
    module.entry_point = Some(EntryImage {
        type_index: 0,
        method_index: 0,
        returns_int: true,
    });
    assert_eq!(message(&module), "entry point must be static and take no arguments");

    module.entry_point = Some(EntryImage {
        type_index: 3,
        method_index: 0,
        returns_int: true,
    });
    assert_eq!(message(&module), "entry point does not name a method");
}
