// crates/apg-gate/src/config.rs
// ============================================================================
// Module: Gate Configuration
// Description: Explicit configuration for the usage gate.
// Purpose: Confine environment and config-file reads to one place.
// Dependencies: serde, thiserror, toml
// ============================================================================

//! ## Overview
//! [`GateConfig`] is the explicit configuration injected into
//! [`crate::UsageGate`]. It is built from defaults, an optional TOML file
//! ([`GateFileConfig`]), and environment values supplied through a lookup
//! closure, so tests never mutate the process environment.
//! Precedence: explicit overrides > environment > config file > defaults.
//! Invariants:
//! - The override flag is set only when [`ALLOW_ENV`] equals `"1"` exactly.
//! - [`GateConfig::validate`] bounds the timeout and document size.
//! - Config files are size-capped and must be UTF-8.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::document::EnabledPolicy;
use crate::source::GateSource;
use crate::source::MAX_DOCUMENT_BYTES;
use crate::source::read_limited;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable that bypasses the gate when set to `"1"`.
pub const ALLOW_ENV: &str = "APG_ALLOW";
/// Environment variable overriding the gate source.
pub const GATE_URL_ENV: &str = "APG_GATE_URL";
/// Environment variable overriding the request timeout, in milliseconds.
pub const TIMEOUT_ENV: &str = "APG_GATE_TIMEOUT_MS";
/// Environment variable naming a TOML config file.
pub const CONFIG_PATH_ENV: &str = "APG_CONFIG";
/// Gate source used when none is configured.
pub const DEFAULT_GATE_URL: &str =
    "https://raw.githubusercontent.com/nichtkarim/Protokolle360V/main/asset-protocol-gate.json";
/// Default network timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
/// User agent sent with gate requests.
pub const USER_AGENT: &str = "asset-protocol-gui/1.0";
/// Upper bound accepted for the request timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(60);
/// Upper bound accepted for `max_document_bytes`.
pub const MAX_DOCUMENT_BYTES_LIMIT: usize = 1024 * 1024;
/// Maximum config file size, in bytes.
pub const MAX_CONFIG_FILE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors returned while loading or validating configuration.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("config file read failed: {0}")]
    Io(String),
    /// The config file is larger than [`MAX_CONFIG_FILE_BYTES`].
    #[error("config file exceeds size limit ({size} > {limit})")]
    TooLarge {
        /// Observed size in bytes.
        size: usize,
        /// Maximum allowed size in bytes.
        limit: usize,
    },
    /// The config file is not UTF-8.
    #[error("config file must be utf-8")]
    NotUtf8,
    /// The config file is not valid TOML for [`GateFileConfig`].
    #[error("config file parse failed: {0}")]
    Parse(String),
    /// An environment variable holds an unusable value.
    #[error("invalid value for {key}: {value}")]
    InvalidEnv {
        /// Environment variable name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },
    /// A resolved value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Gate Configuration
// ============================================================================

/// Explicit usage gate configuration.
///
/// # Invariants
/// - `source` is re-classified on every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Operator override; grants access without consulting the source.
    pub allow_override: bool,
    /// Source of the gate document.
    pub source: GateSource,
    /// Timeout bounding the network fetch.
    pub timeout: Duration,
    /// User agent sent with HTTP requests.
    pub user_agent: String,
    /// Maximum gate document size, in bytes.
    pub max_document_bytes: usize,
    /// Interpretation of the `enabled` field.
    pub enabled_policy: EnabledPolicy,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            allow_override: false,
            source: GateSource::new(DEFAULT_GATE_URL),
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
            max_document_bytes: MAX_DOCUMENT_BYTES,
            enabled_policy: EnabledPolicy::default(),
        }
    }
}

impl GateConfig {
    /// Builds a configuration from the process environment.
    ///
    /// Reads [`ALLOW_ENV`] and [`GATE_URL_ENV`] only.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from defaults and an environment lookup.
    ///
    /// Reads [`ALLOW_ENV`] and [`GATE_URL_ENV`] only.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().with_gate_env(&lookup)
    }

    /// Resolves a full configuration from defaults, an optional config file,
    /// and the environment lookup, then validates it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when [`TIMEOUT_ENV`] is malformed or the
    /// resolved values are out of range.
    pub fn resolve<F>(file: Option<&GateFileConfig>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(file) = file {
            config = file.apply(config);
        }
        config = config.with_gate_env(&lookup);
        if let Some(raw) = lookup(TIMEOUT_ENV) {
            let millis = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
                key: TIMEOUT_ENV,
                value: raw.clone(),
            })?;
            config.timeout = Duration::from_millis(millis);
        }
        config.validate()?;
        Ok(config)
    }

    /// Returns a copy with the given timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns a copy with the given source.
    #[must_use]
    pub fn with_source(mut self, source: impl AsRef<str>) -> Self {
        self.source = GateSource::new(source);
        self
    }

    /// Validates value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() || self.timeout > MAX_TIMEOUT {
            return Err(ConfigError::Invalid(format!(
                "timeout must be between 1 ms and {} s",
                MAX_TIMEOUT.as_secs()
            )));
        }
        if self.max_document_bytes == 0 || self.max_document_bytes > MAX_DOCUMENT_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_document_bytes must be between 1 and {MAX_DOCUMENT_BYTES_LIMIT}"
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("user_agent must not be empty".to_string()));
        }
        Ok(())
    }

    /// Applies [`ALLOW_ENV`] and [`GATE_URL_ENV`] from `lookup`.
    fn with_gate_env<F>(mut self, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        self.allow_override = lookup(ALLOW_ENV).is_some_and(|value| value == "1");
        if let Some(source) = lookup(GATE_URL_ENV) {
            self.source = GateSource::new(source);
        }
        self
    }
}

// ============================================================================
// SECTION: Config File
// ============================================================================

/// TOML config file contents. Every field is optional.
///
/// ```toml
/// source = "https://example.com/asset-protocol-gate.json"
/// timeout_ms = 2000
/// enabled_policy = "strict"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateFileConfig {
    /// Gate source URL, `file:` URI, or path.
    pub source: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Maximum gate document size in bytes.
    pub max_document_bytes: Option<usize>,
    /// Interpretation of the `enabled` field.
    pub enabled_policy: Option<EnabledPolicy>,
    /// User agent sent with HTTP requests.
    pub user_agent: Option<String>,
}

impl GateFileConfig {
    /// Loads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable, oversized, not
    /// UTF-8, or not valid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        let bytes = read_limited(file, MAX_CONFIG_FILE_BYTES)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_BYTES {
            return Err(ConfigError::TooLarge {
                size: bytes.len(),
                limit: MAX_CONFIG_FILE_BYTES,
            });
        }
        let text = String::from_utf8(bytes).map_err(|_| ConfigError::NotUtf8)?;
        Self::parse(&text)
    }

    /// Parses config file text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid TOML for this
    /// structure.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Overlays the present fields onto `config`.
    #[must_use]
    pub fn apply(&self, mut config: GateConfig) -> GateConfig {
        if let Some(source) = &self.source {
            config.source = GateSource::new(source);
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(max_document_bytes) = self.max_document_bytes {
            config.max_document_bytes = max_document_bytes;
        }
        if let Some(policy) = self.enabled_policy {
            config.enabled_policy = policy;
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent.clone_from(user_agent);
        }
        config
    }
}
