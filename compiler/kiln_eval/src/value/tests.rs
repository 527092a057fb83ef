use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_concatenation_text() {
    assert_eq!(Value::Int(-4).to_string(), "-4");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!(Value::string("abc").to_string(), "abc");
    assert_eq!(Value::Null.to_string(), "");
}

#[test]
fn test_equality() {
    assert_eq!(Value::Int(3), Value::Int(3));
    assert_ne!(Value::Int(3), Value::Bool(true));
    assert_eq!(Value::string("x"), Value::from("x"));
    assert_eq!(Value::Null, Value::Null);
}

#[test]
fn test_conformance() {
    assert!(Value::Int(1).conforms_to(&Ty::Int));
    assert!(!Value::Int(1).conforms_to(&Ty::Str));
    assert!(Value::Null.conforms_to(&Ty::named("Playground.ICalculator")));
    assert!(!Value::Null.conforms_to(&Ty::Int));
}

#[test]
fn test_from_const() {
    assert_eq!(Value::from(&Const::Int(7)), Value::Int(7));
    assert_eq!(Value::from(&Const::Str("s".to_string())), Value::string("s"));
    assert_eq!(Value::from(&Const::Null), Value::Null);
}
