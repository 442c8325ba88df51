// crates/apg-gate/src/gate.rs
// ============================================================================
// Module: Usage Gate
// Description: Fail-closed startup permission check.
// Purpose: Resolve one allow/deny decision per process start.
// Dependencies: thiserror, tracing
// ============================================================================

//! ## Overview
//! [`UsageGate`] evaluates, in order: the operator override, then the gate
//! document from the configured source. Each failure stage produces its own
//! [`DenyReason`]; callers that only need the answer use
//! [`GateDecision::is_allowed`] or [`is_usage_allowed`].
//! Invariants:
//! - The override short-circuits before classification or I/O.
//! - [`SourceKind::Invalid`] sources deny without calling the document source.
//! - Nothing is cached between checks.
//!
//! Security posture: deny reasons may reveal infrastructure details and are
//! logged at `debug` only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use tracing::info;

use crate::config::DEFAULT_TIMEOUT;
use crate::config::GateConfig;
use crate::document::DocumentError;
use crate::document::GateDocument;
use crate::source::DocumentSource;
use crate::source::FetchError;
use crate::source::InvalidSource;
use crate::source::SchemeRouter;
use crate::source::SourceKind;

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Why a check granted access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    /// The operator override was set.
    Override,
    /// The gate document enabled usage.
    Enabled,
}

impl AllowReason {
    /// Returns a stable label for logs and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Enabled => "enabled",
        }
    }
}

/// Why a check denied access.
///
/// # Invariants
/// - Every failure stage maps to exactly one variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DenyReason {
    /// The source could not be classified into a fetchable kind.
    #[error("{0}")]
    InvalidSource(InvalidSource),
    /// The document could not be fetched.
    #[error("{0}")]
    Fetch(FetchError),
    /// The document could not be parsed.
    #[error("{0}")]
    Document(DocumentError),
    /// The document did not enable usage.
    #[error("gate document does not enable usage")]
    Disabled,
}

/// Outcome of a single gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Usage is permitted.
    Allowed(AllowReason),
    /// Usage is not permitted.
    Denied(DenyReason),
}

impl GateDecision {
    /// Returns true when usage is permitted.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    /// Returns the deny reason when usage is not permitted.
    #[must_use]
    pub const fn deny_reason(&self) -> Option<&DenyReason> {
        match self {
            Self::Allowed(_) => None,
            Self::Denied(reason) => Some(reason),
        }
    }
}

impl From<GateDecision> for bool {
    fn from(decision: GateDecision) -> Self {
        decision.is_allowed()
    }
}

/// Detailed record of one check, for operator diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateReport {
    /// Classified source; `None` when the override short-circuited.
    pub source_kind: Option<SourceKind>,
    /// Fetched document text, when the fetch succeeded.
    pub content: Option<String>,
    /// Final decision.
    pub decision: GateDecision,
}

// ============================================================================
// SECTION: Usage Gate
// ============================================================================

/// Fail-closed usage gate.
///
/// # Invariants
/// - At most one call to the document source per check.
pub struct UsageGate<S = SchemeRouter> {
    /// Gate configuration.
    config: GateConfig,
    /// Document source used for fetches.
    source: S,
}

impl UsageGate<SchemeRouter> {
    /// Creates a gate using the default scheme router.
    #[must_use]
    pub fn new(config: GateConfig) -> Self {
        let source = SchemeRouter::from_config(&config);
        Self {
            config,
            source,
        }
    }
}

impl<S: DocumentSource> UsageGate<S> {
    /// Creates a gate with an explicit document source.
    #[must_use]
    pub const fn with_source(config: GateConfig, source: S) -> Self {
        Self {
            config,
            source,
        }
    }

    /// Returns the gate configuration.
    #[must_use]
    pub const fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Returns the document source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Runs one check and returns the decision.
    #[must_use]
    pub fn check(&self) -> GateDecision {
        self.report().decision
    }

    /// Runs one check and returns true when usage is permitted.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.check().is_allowed()
    }

    /// Runs one check and returns the full report.
    #[must_use]
    pub fn report(&self) -> GateReport {
        if self.config.allow_override {
            info!(reason = AllowReason::Override.as_str(), "usage permitted");
            return GateReport {
                source_kind: None,
                content: None,
                decision: GateDecision::Allowed(AllowReason::Override),
            };
        }

        let kind = self.config.source.classify();
        debug!(source_kind = kind.label(), "gate source classified");
        let (content, decision) = self.evaluate(&kind);
        match &decision {
            GateDecision::Allowed(reason) => info!(reason = reason.as_str(), "usage permitted"),
            GateDecision::Denied(reason) => {
                debug!(reason = %reason, "gate check denied");
                info!("usage not permitted");
            }
        }
        GateReport {
            source_kind: Some(kind),
            content,
            decision,
        }
    }

    /// Fetches and evaluates the document for a classified source.
    fn evaluate(&self, kind: &SourceKind) -> (Option<String>, GateDecision) {
        if let SourceKind::Invalid(reason) = kind {
            return (None, GateDecision::Denied(DenyReason::InvalidSource(reason.clone())));
        }
        let content = match self.source.fetch(kind) {
            Ok(content) => content,
            Err(err) => return (None, GateDecision::Denied(DenyReason::Fetch(err))),
        };
        let decision = match GateDocument::parse(&content) {
            Ok(document) if document.is_enabled(self.config.enabled_policy) => {
                GateDecision::Allowed(AllowReason::Enabled)
            }
            Ok(_) => GateDecision::Denied(DenyReason::Disabled),
            Err(err) => GateDecision::Denied(DenyReason::Document(err)),
        };
        (Some(content), decision)
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Checks whether usage is permitted using the process environment.
///
/// `timeout` bounds any network fetch and defaults to [`DEFAULT_TIMEOUT`].
/// Every failure yields `false`.
#[must_use]
pub fn is_usage_allowed(timeout: Option<Duration>) -> bool {
    let config = GateConfig::from_env().with_timeout(timeout.unwrap_or(DEFAULT_TIMEOUT));
    UsageGate::new(config).is_allowed()
}
