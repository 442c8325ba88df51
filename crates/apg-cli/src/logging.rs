// crates/apg-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: Installs the tracing subscriber for the CLI process.
// Purpose: Route library diagnostics to stderr under an operator filter.
// Dependencies: thiserror, tracing-subscriber
// ============================================================================

//! ## Overview
//! The gate library emits `tracing` events; this module installs a
//! `tracing-subscriber` registry with an [`EnvFilter`] taken from
//! [`LOG_ENV`]. Output always goes to stderr so `diagnose` output on stdout
//! stays clean.
//!
//! ## Invariants
//! - Unparseable filters fall back to [`DEFAULT_LOG_FILTER`].
//! - The subscriber is installed at most once per process.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "APG_LOG";
/// Filter applied when [`LOG_ENV`] is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "warn";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct LoggingError {
    /// Subscriber error description.
    message: String,
}

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Builds the log filter from raw directives.
#[must_use]
pub fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber writing to stderr.
///
/// # Errors
///
/// Returns [`LoggingError`] when a global subscriber is already installed.
pub fn init_logging(directives: Option<&str>) -> Result<(), LoggingError> {
    tracing_subscriber::registry()
        .with(log_filter(directives))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|err| LoggingError {
            message: err.to_string(),
        })
}
