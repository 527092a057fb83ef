use super::*;

#[test]
fn test_display() {
    assert_eq!(Ty::Int.to_string(), "int");
    assert_eq!(Ty::Str.to_string(), "string");
    assert_eq!(Ty::named("Playground.ICalculator").to_string(), "Playground.ICalculator");
    assert_eq!(join_types(&[Ty::Int, Ty::Bool]), "int, bool");
    assert_eq!(join_types(&[]), "");
}

#[test]
fn test_core_names() {
    for ty in [
        PredefinedType::Int,
        PredefinedType::Bool,
        PredefinedType::String,
        PredefinedType::Void,
    ] {
        assert_eq!(Ty::from_core_name(ty.core_name()), Some(Ty::from_predefined(ty)));
    }
    assert_eq!(Ty::from_core_name("System.Math"), None);
}

#[test]
fn test_predicates() {
    assert!(Ty::Error.is_error());
    assert!(Ty::Void.is_void());
    assert_eq!(Ty::named("A.B").as_named(), Some("A.B"));
    assert!(Ty::Str.is_primitive_value());
    assert!(!Ty::named("A").is_primitive_value());
}
