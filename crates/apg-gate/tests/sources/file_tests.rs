// crates/apg-gate/tests/sources/file_tests.rs
// ============================================================================
// Module: File Source Tests
// Description: Tests for filesystem-backed gate documents.
// Purpose: Ensure file reads fail closed and decode permissively.
// Dependencies: apg-gate, tempfile
// ============================================================================

//! ## Overview
//! Exercises [`apg_gate::FileSource`] reads, limits, and error mapping.

use apg_gate::DocumentSource;
use apg_gate::FetchError;
use apg_gate::FileSource;
use apg_gate::InvalidSource;
use apg_gate::MAX_DOCUMENT_BYTES;
use apg_gate::SourceKind;

use crate::common::gate_file;

#[test]
fn file_source_reads_file_contents() {
    let (_dir, path) = gate_file(br#"{"enabled": true}"#);
    let content = FileSource::default().fetch(&SourceKind::File(path)).unwrap();
    assert_eq!(content, r#"{"enabled": true}"#);
}

#[test]
fn file_source_reads_literal_paths() {
    let (_dir, path) = gate_file(b"{}");
    let content = FileSource::default().fetch(&SourceKind::LiteralPath(path)).unwrap();
    assert_eq!(content, "{}");
}

#[test]
fn file_source_replaces_invalid_utf8() {
    let (_dir, path) = gate_file(b"{\"note\": \"\xff\xfe\"}");
    let content = FileSource::default().read_path(&path).unwrap();
    assert!(content.contains('\u{FFFD}'));
}

#[test]
fn file_source_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = FileSource::default().read_path(&path).unwrap_err();
    assert!(matches!(err, FetchError::NotFound(_)), "unexpected error: {err:?}");
}

#[test]
fn file_source_reports_directories_as_io_errors() {
    let dir = tempfile::tempdir().unwrap();
    let err = FileSource::default().read_path(dir.path()).unwrap_err();
    assert!(matches!(err, FetchError::Io(_)), "unexpected error: {err:?}");
}

#[test]
fn file_source_enforces_size_limit() {
    let (_dir, path) = gate_file(&[b' '; 32]);
    let err = FileSource::new(16).read_path(&path).unwrap_err();
    assert_eq!(
        err,
        FetchError::TooLarge {
            max_bytes: 16,
            actual_bytes: 17,
        }
    );
}

#[test]
fn file_source_accepts_documents_at_the_limit() {
    let (_dir, path) = gate_file(&[b' '; 16]);
    assert_eq!(FileSource::new(16).read_path(&path).unwrap().len(), 16);
    assert!(MAX_DOCUMENT_BYTES >= 16);
}

#[test]
fn file_source_refuses_http_kinds() {
    let url = url::Url::parse("https://example.com/gate.json").unwrap();
    let err = FileSource::default().fetch(&SourceKind::Http(url)).unwrap_err();
    assert_eq!(err, FetchError::InvalidSource(InvalidSource::UnsupportedScheme("http".to_string())));
}
