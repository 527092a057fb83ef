use super::*;
use kiln_types::Ty;
use pretty_assertions::assert_eq;

#[test]
fn test_jump_targets() {
    assert_eq!(Op::Jump(4).jump_target(), Some(4));
    assert_eq!(Op::JumpIfTrue(2).jump_target(), Some(2));
    assert_eq!(Op::Add.jump_target(), None);
    assert!(Op::ReturnValue.is_terminator());
    assert!(!Op::JumpIfFalse(0).is_terminator());
}

#[test]
fn test_disassemble() {
    let code = MethodCode {
        sig: MethodSig::new("Add", vec![Ty::Int, Ty::Int], Ty::Int),
        locals: 2,
        code: vec![Op::LoadLocal(0), Op::LoadLocal(1), Op::Add, Op::ReturnValue],
    };
    assert_eq!(code.arity(), 2);
    assert!(code.returns_value());
    assert_eq!(
        code.disassemble(),
        "   0  ld.loc 0\n   1  ld.loc 1\n   2  add\n   3  ret.v\n"
    );
}
