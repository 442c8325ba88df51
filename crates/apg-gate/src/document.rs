// crates/apg-gate/src/document.rs
// ============================================================================
// Module: Gate Document
// Description: Parsing and evaluation of the gate JSON document.
// Purpose: Decide whether a fetched document enables usage.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A gate document is a JSON object whose `enabled` field controls access.
//! Unknown fields are ignored. [`EnabledPolicy`] selects how non-boolean
//! `enabled` values are read.
//! Invariants:
//! - Non-object documents are rejected.
//! - A missing `enabled` field never grants access.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Field consulted for the enabled flag.
pub const ENABLED_FIELD: &str = "enabled";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned while parsing a gate document.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// The fetched content was empty.
    #[error("gate document is empty")]
    Empty,
    /// The content is not valid JSON.
    #[error("gate document is not valid json: {0}")]
    Syntax(String),
    /// The content is valid JSON but not an object.
    #[error("gate document must be a json object")]
    NotAnObject,
}

// ============================================================================
// SECTION: Enabled Policy
// ============================================================================

/// How the `enabled` field is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnabledPolicy {
    /// Empty, zero, null, and `false` values deny; any other value allows.
    #[default]
    Truthy,
    /// Only the JSON literal `true` allows.
    Strict,
}

impl EnabledPolicy {
    /// Returns the canonical policy label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Truthy => "truthy",
            Self::Strict => "strict",
        }
    }

    /// Evaluates an `enabled` value under this policy.
    #[must_use]
    pub fn evaluate(self, value: &Value) -> bool {
        match self {
            Self::Strict => matches!(value, Value::Bool(true)),
            Self::Truthy => is_truthy(value),
        }
    }
}

/// Returns true for present, non-empty, non-zero values.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n.abs() > 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

// ============================================================================
// SECTION: Gate Document
// ============================================================================

/// Parsed gate document.
///
/// # Invariants
/// - Always backed by a JSON object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateDocument {
    /// Top-level document fields.
    fields: Map<String, Value>,
}

impl GateDocument {
    /// Parses document text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] when the content is empty, not JSON, or not
    /// a JSON object.
    pub fn parse(content: &str) -> Result<Self, DocumentError> {
        if content.is_empty() {
            return Err(DocumentError::Empty);
        }
        let value: Value =
            serde_json::from_str(content).map_err(|err| DocumentError::Syntax(err.to_string()))?;
        match value {
            Value::Object(fields) => Ok(Self {
                fields,
            }),
            _ => Err(DocumentError::NotAnObject),
        }
    }

    /// Returns the raw `enabled` value when present.
    #[must_use]
    pub fn enabled(&self) -> Option<&Value> {
        self.fields.get(ENABLED_FIELD)
    }

    /// Returns true when the document enables usage under `policy`.
    #[must_use]
    pub fn is_enabled(&self, policy: EnabledPolicy) -> bool {
        self.enabled().is_some_and(|value| policy.evaluate(value))
    }
}
