use super::*;
use crate::corelib::core_metadata;
use crate::ty::Ty;

fn contracts() -> ModuleMetadata {
    let mut hidden = TypeMetadata::class("Playground.Hidden");
    hidden.visibility = Visibility::Internal;
    ModuleMetadata::new("Playground")
        .with_type(
            TypeMetadata::interface("Playground.ICalculator")
                .with_method(MethodSig::new("Add", vec![Ty::Int, Ty::Int], Ty::Int)),
        )
        .with_type(
            TypeMetadata::interface("Playground.IScientific")
                .with_interface("Playground.ICalculator")
                .with_method(MethodSig::new("Pow", vec![Ty::Int, Ty::Int], Ty::Int)),
        )
        .with_type(hidden)
}

#[test]
fn test_references_import_public_types_only() {
    let table = SymbolTable::from_references(&[core_metadata(), contracts()]);
    assert!(table.has_core());
    assert!(table.get("System.Math").is_some());
    assert!(table.get("Playground.ICalculator").is_some());
    assert!(table.get("Playground.Hidden").is_none());
    assert!(table.is_namespace("System"));
    assert!(table.is_namespace("Playground"));
    assert!(!table.is_namespace("Playground.ICalculator"));
}

#[test]
fn test_without_core() {
    let table = SymbolTable::from_references(&[contracts()]);
    assert!(!table.has_core());
}

#[test]
fn test_add_local_rejects_duplicates() {
    let mut table = SymbolTable::from_references(&[contracts()]);
    assert!(table.add_local(TypeMetadata::class("A.B.C")));
    assert!(!table.add_local(TypeMetadata::class("A.B.C")));
    assert!(!table.add_local(TypeMetadata::class("Playground.ICalculator")));
    assert!(table.is_namespace("A"));
    assert!(table.is_namespace("A.B"));
    assert!(table.get("A.B.C").unwrap().is_local());
}

#[test]
fn test_transitive_interfaces() {
    let mut table = SymbolTable::from_references(&[contracts()]);
    table.add_local(TypeMetadata::class("Sci").with_interface("Playground.IScientific"));
    assert_eq!(
        table.all_interfaces("Sci"),
        vec!["Playground.IScientific", "Playground.ICalculator"]
    );
    assert!(table.implements("Sci", "Playground.ICalculator"));
    assert!(!table.implements("Playground.ICalculator", "Sci"));
}

#[test]
fn test_interface_cycle_terminates() {
    let mut table = SymbolTable::new();
    table.add_local(TypeMetadata::interface("A").with_interface("B"));
    table.add_local(TypeMetadata::interface("B").with_interface("A"));
    assert_eq!(table.all_interfaces("A"), vec!["B", "A"]);
}

#[test]
fn test_find_method_searches_base_interfaces() {
    let table = SymbolTable::from_references(&[contracts()]);
    let (owner, sig) = table.find_method("Playground.IScientific", "Add").unwrap();
    assert_eq!(owner, "Playground.ICalculator");
    assert_eq!(sig.name, "Add");
    assert!(table.find_method("Playground.IScientific", "Mul").is_none());
}

#[test]
fn test_lookup_in() {
    let table = SymbolTable::from_references(&[core_metadata()]);
    assert_eq!(table.lookup_in("System", "Math").as_deref(), Some("System.Math"));
    assert_eq!(table.lookup_in("", "Math"), None);
    assert_eq!(qualify("", "Program"), "Program");
}
