use super::*;
use crate::metadata::TypeKind;

#[test]
fn test_ids_round_trip() {
    for native in Native::ALL {
        assert_eq!(Native::from_id(native.id()), Some(*native));
    }
    assert_eq!(Native::from_id(999), None);
}

#[test]
fn test_lookup() {
    assert_eq!(Native::lookup("System.Math", "Max"), Some(Native::MathMax));
    assert_eq!(
        Native::lookup("System.Console", "WriteLine"),
        Some(Native::ConsoleWriteLine)
    );
    assert_eq!(Native::lookup("System.Math", "WriteLine"), None);
    assert_eq!(Native::lookup("Math", "Max"), None);
}

#[test]
fn test_core_metadata_shape() {
    let core = core_metadata();
    assert!(is_core(&core));
    assert_eq!(
        core.find_type("System.Int32").unwrap().kind,
        TypeKind::Primitive
    );
    let math = core.find_type("System.Math").unwrap();
    assert!(math.is_static);
    assert_eq!(math.methods.len(), 5);
    assert_eq!(
        math.method("Clamp").unwrap().to_string(),
        "static int Clamp(int, int, int)"
    );
    let console = core.find_type("System.Console").unwrap();
    assert_eq!(console.methods.len(), 1);
}

#[test]
fn test_arity() {
    assert_eq!(Native::MathAbs.arity(), 1);
    assert_eq!(Native::MathClamp.arity(), 3);
    assert!(Native::MathSign.returns_value());
    assert!(!Native::ConsoleWriteLine.returns_value());
}
