use kiln_emit::LoadableUnit;

use super::*;

#[test]
fn test_core_and_metadata_resolve() {
    assert!(Reference::core()
        .resolve()
        .unwrap()
        .find_type("System.Math")
        .is_some());
    let contracts = Reference::metadata(playground_contracts()).resolve().unwrap();
    assert_eq!(contracts.name, "Playground");
    assert!(contracts.find_type("Playground.ICalculator").is_some());
}

#[test]
fn test_garbage_unit_is_e2019() {
    let diag = Reference::unit(&LoadableUnit::from_bytes(b"not a unit".to_vec()))
        .resolve()
        .unwrap_err();
    assert_eq!(diag.code, ErrorCode::E2019);
    assert!(diag.is_error());
}

#[test]
fn test_missing_file_is_e2019() {
    let dir = tempfile::tempdir().unwrap();
    let diag = Reference::path(dir.path().join("missing.kunit"))
        .resolve()
        .unwrap_err();
    assert_eq!(diag.code, ErrorCode::E2019);
    assert!(diag.message.contains("missing.kunit"));
}
