// crates/apg-gate/src/lib.rs
// ============================================================================
// Module: Asset Protocol Gate Library
// Description: Startup usage gate backed by a remote or local JSON flag.
// Purpose: Decide whether the asset protocol application may run.
// Dependencies: reqwest, serde, serde_json, thiserror, toml, tracing, url
// ============================================================================

//! ## Overview
//! This crate decides, once per process start, whether the asset protocol
//! application is permitted to run. The decision is resolved from an operator
//! override, then from a gate document fetched over HTTP(S) or read from the
//! local filesystem, and defaults to "not permitted" on every failure.
//! Invariants:
//! - Only an explicit override or a successfully evaluated document grants access.
//! - Each check performs at most one outbound request or one file read.
//! - Failure details stay inside [`GateDecision`]; [`is_usage_allowed`] returns
//!   a bare boolean.
//!
//! Security posture: gate sources are untrusted and fail closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod document;
pub mod gate;
pub mod source;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ALLOW_ENV;
pub use config::CONFIG_PATH_ENV;
pub use config::ConfigError;
pub use config::DEFAULT_GATE_URL;
pub use config::DEFAULT_TIMEOUT;
pub use config::GATE_URL_ENV;
pub use config::GateConfig;
pub use config::GateFileConfig;
pub use config::TIMEOUT_ENV;
pub use config::USER_AGENT;
pub use document::DocumentError;
pub use document::EnabledPolicy;
pub use document::GateDocument;
pub use gate::AllowReason;
pub use gate::DenyReason;
pub use gate::GateDecision;
pub use gate::GateReport;
pub use gate::UsageGate;
pub use gate::is_usage_allowed;
pub use source::DocumentSource;
pub use source::FetchError;
pub use source::FileSource;
pub use source::GateSource;
pub use source::HttpSource;
pub use source::HttpSourceConfig;
pub use source::InvalidSource;
pub use source::MAX_DOCUMENT_BYTES;
pub use source::SchemeRouter;
pub use source::SourceKind;

#[cfg(test)]
mod tests;
