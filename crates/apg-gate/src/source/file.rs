// crates/apg-gate/src/source/file.rs
// ============================================================================
// Module: Gate File Source
// Description: Filesystem-backed source for local gate documents.
// Purpose: Read gate document text from `file:` URIs and bare paths.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`FileSource`] reads gate documents from the local filesystem. Missing files
//! map to [`FetchError::NotFound`]; other I/O failures map to
//! [`FetchError::Io`].
//! Invariants:
//! - At most `max_bytes + 1` bytes are read from disk.
//! - Invalid UTF-8 is replaced, never rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use crate::source::DocumentSource;
use crate::source::FetchError;
use crate::source::MAX_DOCUMENT_BYTES;
use crate::source::SourceKind;
use crate::source::decode_lossy;
use crate::source::enforce_max_bytes;
use crate::source::read_limited;
use crate::source::unsupported_kind;

// ============================================================================
// SECTION: File Source
// ============================================================================

/// Filesystem-backed gate document source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSource {
    /// Maximum document size, in bytes.
    max_bytes: usize,
}

impl FileSource {
    /// Creates a file source with the given size limit.
    #[must_use]
    pub const fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
        }
    }

    /// Reads `path` and returns its contents as lossily decoded text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the file is missing, unreadable, or too large.
    pub fn read_path(&self, path: &Path) -> Result<String, FetchError> {
        let file = File::open(path).map_err(|err| io_error(path, &err))?;
        let bytes = read_limited(file, self.max_bytes).map_err(|err| io_error(path, &err))?;
        enforce_max_bytes(self.max_bytes, bytes.len())?;
        Ok(decode_lossy(bytes))
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new(MAX_DOCUMENT_BYTES)
    }
}

impl DocumentSource for FileSource {
    fn fetch(&self, kind: &SourceKind) -> Result<String, FetchError> {
        match kind {
            SourceKind::File(path) | SourceKind::LiteralPath(path) => self.read_path(path),
            other => Err(unsupported_kind(other)),
        }
    }
}

/// Maps an I/O error for `path` to a fetch error.
fn io_error(path: &Path, err: &std::io::Error) -> FetchError {
    if err.kind() == ErrorKind::NotFound {
        FetchError::NotFound(path.display().to_string())
    } else {
        FetchError::Io(format!("{}: {err}", path.display()))
    }
}
