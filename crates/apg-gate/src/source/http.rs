// crates/apg-gate/src/source/http.rs
// ============================================================================
// Module: Gate HTTP Source
// Description: HTTP-backed source for remote gate documents.
// Purpose: Fetch gate document text via a single bounded HTTP GET.
// Dependencies: reqwest, url
// ============================================================================

//! ## Overview
//! [`HttpSource`] resolves `http://` and `https://` gate sources into document
//! text. Any status other than 200 fails closed.
//! Invariants:
//! - Exactly one GET is issued per fetch; there are no retries.
//! - The configured timeout bounds the whole request lifecycle.
//! - Payload bytes are capped at [`HttpSourceConfig::max_bytes`].
//!
//! Security posture: treats remote content as untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::ErrorKind;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use url::Url;

use crate::config::DEFAULT_TIMEOUT;
use crate::config::USER_AGENT;
use crate::source::DocumentSource;
use crate::source::FetchError;
use crate::source::InvalidSource;
use crate::source::MAX_DOCUMENT_BYTES;
use crate::source::SourceKind;
use crate::source::decode_lossy;
use crate::source::enforce_max_bytes;
use crate::source::read_limited;
use crate::source::unsupported_kind;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default redirect hop limit for gate requests.
const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Configuration for [`HttpSource`].
///
/// # Invariants
/// - `timeout` applies to the full request lifecycle, body included.
/// - `max_bytes` is a hard upper bound on response bodies.
/// - The final response after at most `max_redirects` hops must be 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSourceConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string for outbound requests.
    pub user_agent: String,
    /// Maximum response size allowed, in bytes.
    pub max_bytes: usize,
    /// Maximum redirect hops followed before failing.
    pub max_redirects: usize,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
            max_bytes: MAX_DOCUMENT_BYTES,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

// ============================================================================
// SECTION: HTTP Source
// ============================================================================

/// HTTP-backed gate document source.
///
/// # Invariants
/// - A fresh client is built per fetch so no connection state outlives a check.
#[derive(Debug, Clone, Default)]
pub struct HttpSource {
    /// Request limits and identity.
    config: HttpSourceConfig,
}

impl HttpSource {
    /// Creates an HTTP source with the given configuration.
    #[must_use]
    pub const fn new(config: HttpSourceConfig) -> Self {
        Self {
            config,
        }
    }

    /// Returns the source configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpSourceConfig {
        &self.config
    }

    /// Fetches `url` and returns the body as lossily decoded text.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network failure, timeout, a non-200 status,
    /// or an oversized body.
    pub fn fetch_url(&self, url: &Url) -> Result<String, FetchError> {
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(FetchError::InvalidSource(InvalidSource::UnsupportedScheme(
                    scheme.to_string(),
                )));
            }
        }
        let client = self.client()?;
        let response = client.get(url.as_str()).send().map_err(request_error)?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.as_u16()));
        }
        let max_bytes = self.config.max_bytes;
        if let Some(length) = response.content_length()
            && length > u64::try_from(max_bytes).unwrap_or(u64::MAX)
        {
            return Err(FetchError::TooLarge {
                max_bytes,
                actual_bytes: usize::try_from(length).unwrap_or(usize::MAX),
            });
        }
        let bytes = read_limited(response, max_bytes).map_err(|err| {
            if err.kind() == ErrorKind::TimedOut {
                FetchError::Timeout
            } else {
                FetchError::Network(err.to_string())
            }
        })?;
        enforce_max_bytes(max_bytes, bytes.len())?;
        Ok(decode_lossy(bytes))
    }

    /// Builds the blocking client used for a single fetch.
    fn client(&self) -> Result<Client, FetchError> {
        Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent.clone())
            .redirect(Policy::limited(self.config.max_redirects))
            .build()
            .map_err(|err| FetchError::Network(err.to_string()))
    }
}

impl DocumentSource for HttpSource {
    fn fetch(&self, kind: &SourceKind) -> Result<String, FetchError> {
        match kind {
            SourceKind::Http(url) => self.fetch_url(url),
            other => Err(unsupported_kind(other)),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a request error to a fetch error, separating timeouts.
fn request_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(err.to_string())
    }
}
