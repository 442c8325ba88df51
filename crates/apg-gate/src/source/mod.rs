// crates/apg-gate/src/source/mod.rs
// ============================================================================
// Module: Gate Sources
// Description: Source classification and fetchers for gate documents.
// Purpose: Turn a configured source string into gate document text.
// Dependencies: reqwest, thiserror, url
// ============================================================================

//! ## Overview
//! A [`GateSource`] is the configured source string. Each check classifies it
//! into a closed [`SourceKind`] set and hands the result to a
//! [`DocumentSource`], which returns the document text or a [`FetchError`].
//! Invariants:
//! - Classification never reads file contents or touches the network.
//! - [`SourceKind::Invalid`] is never fetched.
//! - Document bytes are capped and decoded as UTF-8 with lossy replacement.
//!
//! Security posture: sources and their content are untrusted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod file;
pub mod http;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::io::Read;
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

pub use crate::source::file::FileSource;
pub use crate::source::http::HttpSource;
pub use crate::source::http::HttpSourceConfig;
use crate::config::GateConfig;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Default maximum gate document size in bytes.
pub const MAX_DOCUMENT_BYTES: usize = 64 * 1024;

// ============================================================================
// SECTION: Source Classification
// ============================================================================

/// Reason a source string cannot be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSource {
    /// The source string is empty after trimming.
    #[error("gate source is empty")]
    Empty,
    /// The source uses a scheme other than `http`, `https`, or `file`.
    #[error("unsupported gate source scheme: {0}")]
    UnsupportedScheme(String),
    /// The source has a supported scheme but is not a usable URI.
    #[error("malformed gate source uri: {0}")]
    MalformedUri(String),
    /// The source is a bare path that does not exist locally.
    #[error("gate source path does not exist: {0}")]
    MissingPath(String),
}

/// Closed set of gate source kinds.
///
/// # Invariants
/// - `Http` URLs always carry the `http` or `https` scheme.
/// - `LiteralPath` existed when the source was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    /// HTTP or HTTPS URL.
    Http(Url),
    /// Local path taken from a `file:` URI.
    File(PathBuf),
    /// Existing local path given without a scheme.
    LiteralPath(PathBuf),
    /// Source that cannot be fetched.
    Invalid(InvalidSource),
}

impl SourceKind {
    /// Returns a stable label for logs and diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::File(_) => "file",
            Self::LiteralPath(_) => "path",
            Self::Invalid(_) => "invalid",
        }
    }
}

/// Configured gate source string.
///
/// # Invariants
/// - The stored string is trimmed of surrounding whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSource {
    /// Trimmed source string.
    raw: String,
}

impl GateSource {
    /// Creates a gate source from a URL, `file:` URI, or bare path.
    #[must_use]
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self {
            raw: raw.as_ref().trim().to_string(),
        }
    }

    /// Returns the trimmed source string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Classifies the source by scheme.
    ///
    /// Bare strings are checked for existence on the local filesystem; nothing
    /// is read.
    #[must_use]
    pub fn classify(&self) -> SourceKind {
        let raw = self.raw.as_str();
        if raw.is_empty() {
            return SourceKind::Invalid(InvalidSource::Empty);
        }
        let scheme = split_scheme(raw).map(str::to_ascii_lowercase);
        match scheme.as_deref() {
            Some("http" | "https") => Url::parse(raw).map_or_else(
                |err| SourceKind::Invalid(InvalidSource::MalformedUri(err.to_string())),
                SourceKind::Http,
            ),
            Some("file") => classify_file_uri(raw),
            Some(other) => SourceKind::Invalid(InvalidSource::UnsupportedScheme(other.to_string())),
            None => {
                let path = PathBuf::from(raw);
                if path.exists() {
                    SourceKind::LiteralPath(path)
                } else {
                    SourceKind::Invalid(InvalidSource::MissingPath(raw.to_string()))
                }
            }
        }
    }
}

impl fmt::Display for GateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Returns the URI scheme prefix when the string starts with one.
pub(crate) fn split_scheme(raw: &str) -> Option<&str> {
    let (scheme, _) = raw.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    // Drive letters such as `C:\gate.json` are paths, not schemes.
    if cfg!(windows) && scheme.len() == 1 {
        return None;
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.')).then_some(scheme)
}

/// Converts a `file:` URI into a local path source.
///
/// `file:gate.json` names a path relative to the working directory. Only
/// URIs whose path starts with `/` go through URL parsing.
fn classify_file_uri(raw: &str) -> SourceKind {
    let rest = raw.get("file:".len() ..).unwrap_or_default();
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    if !rest.starts_with('/') {
        if rest.is_empty() {
            return SourceKind::Invalid(InvalidSource::MalformedUri(format!(
                "file uri has no path: {raw}"
            )));
        }
        return SourceKind::File(PathBuf::from(rest));
    }
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(err) => return SourceKind::Invalid(InvalidSource::MalformedUri(err.to_string())),
    };
    url.to_file_path().map_or_else(
        |()| {
            SourceKind::Invalid(InvalidSource::MalformedUri(format!(
                "file uri does not name a local path: {url}"
            )))
        },
        SourceKind::File,
    )
}

// ============================================================================
// SECTION: Fetch Errors
// ============================================================================

/// Errors returned while fetching a gate document.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The source kind cannot be fetched by this source.
    #[error("invalid gate source: {0}")]
    InvalidSource(InvalidSource),
    /// The referenced file does not exist.
    #[error("gate document not found: {0}")]
    NotFound(String),
    /// The referenced file could not be read.
    #[error("gate document read failed: {0}")]
    Io(String),
    /// The HTTP request failed before a usable response arrived.
    #[error("gate request failed: {0}")]
    Network(String),
    /// The HTTP request exceeded its timeout.
    #[error("gate request timed out")]
    Timeout,
    /// The HTTP response status was not 200.
    #[error("gate request returned http status {0}")]
    Status(u16),
    /// The document exceeded the configured size limit.
    #[error("gate document exceeds size limit ({actual_bytes} > {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Observed bytes.
        actual_bytes: usize,
    },
}

// ============================================================================
// SECTION: Source Trait
// ============================================================================

/// Fetches gate document text for a classified source.
pub trait DocumentSource: Send + Sync {
    /// Returns the document text for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the source cannot be fetched.
    fn fetch(&self, kind: &SourceKind) -> Result<String, FetchError>;
}

// ============================================================================
// SECTION: Scheme Router
// ============================================================================

/// Default document source routing each kind to its fetcher.
///
/// # Invariants
/// - `Http` goes to [`HttpSource`]; `File` and `LiteralPath` go to [`FileSource`].
/// - `Invalid` is refused without I/O.
#[derive(Debug, Clone)]
pub struct SchemeRouter {
    /// Fetcher for HTTP and HTTPS sources.
    http: HttpSource,
    /// Reader for local file sources.
    file: FileSource,
}

impl SchemeRouter {
    /// Creates a router from explicit fetchers.
    #[must_use]
    pub const fn new(http: HttpSource, file: FileSource) -> Self {
        Self {
            http,
            file,
        }
    }

    /// Creates a router using the limits and identity in `config`.
    #[must_use]
    pub fn from_config(config: &GateConfig) -> Self {
        let http = HttpSource::new(HttpSourceConfig {
            timeout: config.timeout,
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_document_bytes,
            ..HttpSourceConfig::default()
        });
        Self::new(http, FileSource::new(config.max_document_bytes))
    }
}

impl DocumentSource for SchemeRouter {
    fn fetch(&self, kind: &SourceKind) -> Result<String, FetchError> {
        match kind {
            SourceKind::Http(_) => self.http.fetch(kind),
            SourceKind::File(_) | SourceKind::LiteralPath(_) => self.file.fetch(kind),
            SourceKind::Invalid(reason) => Err(FetchError::InvalidSource(reason.clone())),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads at most `max_bytes + 1` bytes so oversize input is detectable.
pub(crate) fn read_limited<R: Read>(reader: R, max_bytes: usize) -> std::io::Result<Vec<u8>> {
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut bytes = Vec::new();
    reader.take(limit).read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Rejects payloads larger than `max_bytes`.
pub(crate) const fn enforce_max_bytes(max_bytes: usize, actual_bytes: usize) -> Result<(), FetchError> {
    if actual_bytes > max_bytes {
        return Err(FetchError::TooLarge {
            max_bytes,
            actual_bytes,
        });
    }
    Ok(())
}

/// Decodes bytes as UTF-8, replacing invalid sequences.
pub(crate) fn decode_lossy(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

/// Builds the error returned when a fetcher receives a kind it does not handle.
pub(crate) fn unsupported_kind(kind: &SourceKind) -> FetchError {
    match kind {
        SourceKind::Invalid(reason) => FetchError::InvalidSource(reason.clone()),
        other => FetchError::InvalidSource(InvalidSource::UnsupportedScheme(
            other.label().to_string(),
        )),
    }
}
