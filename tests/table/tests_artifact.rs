//! Table construction and binary artifacts

#![allow(clippy::unwrap_used)]

use std::fs;

use thorn_syntax::grammar::thorn::grammar;
use thorn_syntax::{Error, Language, ParseTable, Parser, SyntaxKind, TABLE_FORMAT_VERSION, thorn};

use crate::helpers::source_fixtures::*;

#[test]
fn test_thorn_table_has_no_unresolved_conflicts() {
    let table = thorn::language().table();
    assert!(table.conflicts().is_empty(), "{:#?}", table.conflicts());
}

#[test]
fn test_rebuilt_table_is_identical() {
    let rebuilt = ParseTable::build(&grammar().unwrap());
    assert_eq!(rebuilt.to_bytes(), thorn::language().table().to_bytes());
}

#[test]
fn test_artifact_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("thorn.lrtb");
    fs::write(&path, thorn::language().to_artifact()).unwrap();

    let loaded = Language::from_artifact(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(loaded.name(), "thorn");
    assert_eq!(loaded.version(), TABLE_FORMAT_VERSION);
    assert_eq!(&loaded, thorn::language());

    let mut parser = Parser::new(loaded);
    for source in [STATEMENTS, FUNCTIONS, CONTROL_FLOW, CLASSES, DATA, "let = ;"] {
        let tree = parser.parse(source, None).unwrap();
        assert_eq!(tree.to_sexp(), thorn_syntax::parse(source).to_sexp());
        assert_eq!(tree.errors(), thorn_syntax::parse(source).errors());
    }
}

#[test]
fn test_bumped_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.lrtb");
    let mut bytes = thorn::language().to_artifact();
    bytes[4..6].copy_from_slice(&(TABLE_FORMAT_VERSION + 1).to_le_bytes());
    fs::write(&path, &bytes).unwrap();

    let result = Language::from_artifact(&fs::read(&path).unwrap());
    assert_eq!(
        result.unwrap_err(),
        Error::TableVersionMismatch {
            expected: TABLE_FORMAT_VERSION,
            found: TABLE_FORMAT_VERSION + 1,
        }
    );
}

#[test]
fn test_garbage_artifact_is_malformed() {
    let tempfile = tempfile::NamedTempFile::new().unwrap();
    fs::write(tempfile.path(), b"not a table at all").unwrap();
    let result = ParseTable::from_bytes(&fs::read(tempfile.path()).unwrap());
    assert!(matches!(result, Err(Error::MalformedTable(_))));
}

/// A hand-written artifact: one terminal (end of input), one nonterminal,
/// no productions, and the given state count with empty tables
fn minimal_artifact(states: u32) -> Vec<u8> {
    let mut bytes = b"LRTB".to_vec();
    bytes.extend_from_slice(&TABLE_FORMAT_VERSION.to_le_bytes());
    let name = |bytes: &mut Vec<u8>, text: &str| {
        bytes.extend_from_slice(&(text.len() as u32).to_le_bytes());
        bytes.extend_from_slice(text.as_bytes());
    };
    name(&mut bytes, "tiny");
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes.extend_from_slice(&(SyntaxKind::EOF as u16).to_le_bytes());
    bytes.extend_from_slice(&1u32.to_le_bytes());
    name(&mut bytes, "start");
    bytes.extend_from_slice(&0u16.to_le_bytes()); // start symbol
    bytes.extend_from_slice(&0u32.to_le_bytes()); // fields
    bytes.extend_from_slice(&0u32.to_le_bytes()); // productions
    bytes.extend_from_slice(&states.to_le_bytes());
    bytes.extend_from_slice(&states.to_le_bytes()); // one action per state
    for _ in 0..states {
        bytes.extend_from_slice(&1u32.to_le_bytes()); // accept
    }
    bytes.extend_from_slice(&states.to_le_bytes()); // one goto per state
    for _ in 0..states {
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
    }
    bytes.extend_from_slice(&0u32.to_le_bytes()); // conflicts
    bytes
}

#[test]
fn test_stateless_artifact_is_malformed() {
    let result = Language::from_artifact(&minimal_artifact(0));
    assert!(matches!(result, Err(Error::MalformedTable(_))), "{result:?}");
}

#[test]
fn test_minimal_artifact_parses_empty_input() {
    let language = Language::from_artifact(&minimal_artifact(1)).unwrap();
    let mut parser = Parser::new(language);
    let tree = parser.parse("", None).unwrap();
    assert_eq!(tree.to_sexp(), "(source_file)");
    assert!(!tree.has_error());

    let tree = parser.parse("x", None).unwrap();
    assert_eq!(tree.root_node().text(), "x");
    assert!(tree.has_error());
}

#[test]
fn test_registry_lookup() {
    let thorn = thorn_syntax::registry::lookup("thorn").unwrap();
    assert!(std::sync::Arc::ptr_eq(thorn.table(), thorn::language().table()));
    assert!(thorn_syntax::registry::lookup("not-registered").is_none());
}
