use kiln_types::{ModuleMetadata, TypeMetadata};
use pretty_assertions::assert_eq;

use super::*;

fn sample_image(output_kind: OutputKind) -> ModuleImage {
    ModuleImage {
        name: "Sample".to_string(),
        output_kind,
        types: Vec::new(),
        strings: vec!["hello".to_string()],
        call_targets: Vec::new(),
        globals: Vec::new(),
        entry_point: None,
        metadata: ModuleMetadata::new("Sample").with_type(TypeMetadata::class("Sample.Thing")),
    }
}

#[test]
fn test_encode_decode() {
    let image = sample_image(OutputKind::Library);
    let unit = LoadableUnit::encode(&image).unwrap();
    assert_eq!(&unit.as_bytes()[..8], MAGIC);
    assert_eq!(unit.output_kind().unwrap(), OutputKind::Library);
    assert_eq!(unit.decode().unwrap(), image);
    assert_eq!(
        unit.metadata().unwrap().find_type("Sample.Thing").unwrap().full_name,
        "Sample.Thing"
    );
}

#[test]
fn test_encoding_is_deterministic() {
    let image = sample_image(OutputKind::Executable);
    let first = LoadableUnit::encode(&image).unwrap();
    let second = LoadableUnit::encode(&image).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.output_kind().unwrap(), OutputKind::Executable);
}

#[test]
fn test_truncated() {
    let unit = LoadableUnit::from_bytes(b"KILN".to_vec());
    assert_eq!(unit.decode(), Err(FormatError::Truncated { len: 4 }));
}

#[test]
fn test_bad_magic() {
    let mut bytes = LoadableUnit::encode(&sample_image(OutputKind::Library))
        .unwrap()
        .into_bytes();
    bytes[0] = b'X';
    let unit = LoadableUnit::from_bytes(bytes);
    assert_eq!(unit.decode(), Err(FormatError::BadMagic));
}

#[test]
fn test_unsupported_version() {
    let mut bytes = LoadableUnit::encode(&sample_image(OutputKind::Library))
        .unwrap()
        .into_bytes();
    bytes[8..10].copy_from_slice(&7u16.to_le_bytes());
    let unit = LoadableUnit::from_bytes(bytes);
    assert_eq!(
        unit.decode(),
        Err(FormatError::UnsupportedVersion { found: 7 })
    );
}

#[test]
fn test_corrupted_payload_fails_checksum() {
    let mut bytes = LoadableUnit::encode(&sample_image(OutputKind::Library))
        .unwrap()
        .into_bytes();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    let unit = LoadableUnit::from_bytes(bytes);
    assert_eq!(unit.decode(), Err(FormatError::ChecksumMismatch));
}

#[test]
fn test_truncated_payload() {
    let mut bytes = LoadableUnit::encode(&sample_image(OutputKind::Library))
        .unwrap()
        .into_bytes();
    bytes.pop();
    let unit = LoadableUnit::from_bytes(bytes);
    assert!(matches!(
        unit.decode(),
        Err(FormatError::LengthMismatch { .. })
    ));
}

#[test]
fn test_kind_flag_must_match_payload() {
    let mut bytes = LoadableUnit::encode(&sample_image(OutputKind::Library))
        .unwrap()
        .into_bytes();
    bytes[10..12].copy_from_slice(&1u16.to_le_bytes());
    let unit = LoadableUnit::from_bytes(bytes);
    assert!(matches!(
        unit.decode(),
        Err(FormatError::KindMismatch { .. })
    ));

    let mut bytes = LoadableUnit::encode(&sample_image(OutputKind::Library))
        .unwrap()
        .into_bytes();
    bytes[10..12].copy_from_slice(&9u16.to_le_bytes());
    assert_eq!(
        LoadableUnit::from_bytes(bytes).decode(),
        Err(FormatError::BadOutputKind(9))
    );
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.kunit");
    let unit = LoadableUnit::encode(&sample_image(OutputKind::Library)).unwrap();
    unit.write_to(&path).unwrap();
    let read = LoadableUnit::read_from(&path).unwrap();
    assert_eq!(read, unit);
}
