// crates/apg-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Provides message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for English and German output.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The gate CLI stores user-facing strings in a small translation catalog so
//! the hosting application sees consistent messages in either locale. All
//! runtime output should be routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to English and then to the key itself.
//! - Substitution is a single pass; substituted values are never rescanned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Supported CLI locales.
///
/// # Invariants
/// - Variants are stable for CLI parsing and catalog lookup.
/// - [`Locale::En`] is the default fallback locale.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Locale {
    /// English (default).
    En,
    /// German.
    De,
}

impl Locale {
    /// Returns the canonical locale label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
        }
    }

    /// Attempts to parse a locale value (case-insensitive, tolerant of region tags).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        let normalized = value.to_ascii_lowercase();
        let lang = normalized.split(['-', '_', '.']).next().unwrap_or("");
        match lang {
            "en" => Some(Self::En),
            "de" => Some(Self::De),
            _ => None,
        }
    }
}

/// Ordered list of supported CLI locales.
pub const SUPPORTED_LOCALES: &[Locale] = &[Locale::En, Locale::De];

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `path`).
/// - `value` is preformatted and should be safe for display.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Locale Selection
// ============================================================================

/// Global locale selection for CLI output.
static CURRENT_LOCALE: OnceLock<Locale> = OnceLock::new();

/// Sets the CLI locale. Only the first call wins.
pub fn set_locale(locale: Locale) {
    let _ = CURRENT_LOCALE.set(locale);
}

/// Returns the current CLI locale (defaults to English).
#[must_use]
pub fn current_locale() -> Locale {
    CURRENT_LOCALE.get().copied().unwrap_or(Locale::En)
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static English catalog entries.
const CATALOG_EN: &[(&str, &str)] = &[
    ("main.version", "asset-protocol-gate {version}"),
    ("check.denied", "error"),
    ("timeout.invalid", "Invalid timeout '{value}': expected a positive number of seconds."),
    ("config.load_failed", "Failed to load config file {path}: {error}"),
    ("config.invalid", "Invalid configuration: {error}"),
    ("logging.init_failed", "Failed to initialize logging: {error}"),
    ("diagnose.header", "Asset protocol gate diagnosis:"),
    ("diagnose.override", "- Override ({env}): {value}"),
    ("diagnose.unset", "(unset)"),
    ("diagnose.config_error", "- Configuration error: {error}"),
    ("diagnose.source", "- Source: {source}"),
    ("diagnose.kind", "- Source kind: {kind}"),
    ("diagnose.kind.skipped", "not classified"),
    ("diagnose.fetched", "- Fetched {length} characters: {preview}"),
    ("diagnose.fetch_failed", "- Fetch failed: {error}"),
    ("diagnose.fetch_skipped", "- Fetch skipped"),
    ("diagnose.decision.allowed", "- Decision: allowed ({reason})"),
    ("diagnose.decision.denied", "- Decision: denied ({reason})"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    (
        "i18n.disclaimer.machine_translated",
        "Note: non-English output is machine-translated and may be inaccurate.",
    ),
];

/// Static German catalog entries.
const CATALOG_DE: &[(&str, &str)] = &[
    ("main.version", "asset-protocol-gate {version}"),
    ("check.denied", "Fehler"),
    ("timeout.invalid", "Ungültiges Timeout '{value}': erwartet wird eine positive Sekundenzahl."),
    ("config.load_failed", "Konfigurationsdatei {path} konnte nicht geladen werden: {error}"),
    ("config.invalid", "Ungültige Konfiguration: {error}"),
    ("logging.init_failed", "Protokollierung konnte nicht initialisiert werden: {error}"),
    ("diagnose.header", "Diagnose der Asset-Protokoll-Freigabe:"),
    ("diagnose.override", "- Übersteuerung ({env}): {value}"),
    ("diagnose.unset", "(nicht gesetzt)"),
    ("diagnose.config_error", "- Konfigurationsfehler: {error}"),
    ("diagnose.source", "- Quelle: {source}"),
    ("diagnose.kind", "- Quellenart: {kind}"),
    ("diagnose.kind.skipped", "nicht klassifiziert"),
    ("diagnose.fetched", "- {length} Zeichen abgerufen: {preview}"),
    ("diagnose.fetch_failed", "- Abruf fehlgeschlagen: {error}"),
    ("diagnose.fetch_skipped", "- Abruf übersprungen"),
    ("diagnose.decision.allowed", "- Entscheidung: erlaubt ({reason})"),
    ("diagnose.decision.denied", "- Entscheidung: verweigert ({reason})"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "Ausgabe"),
    ("output.write_failed", "Schreiben nach {stream} fehlgeschlagen: {error}"),
    (
        "i18n.disclaimer.machine_translated",
        "Hinweis: Nicht-englische Ausgaben sind maschinell übersetzt und können ungenau sein.",
    ),
];

/// Returns the raw catalog entries for the requested locale.
pub(crate) const fn catalog_entries_for(locale: Locale) -> &'static [(&'static str, &'static str)] {
    match locale {
        Locale::En => CATALOG_EN,
        Locale::De => CATALOG_DE,
    }
}

/// Indexed catalogs, one per entry of [`SUPPORTED_LOCALES`].
type CatalogIndex = [HashMap<&'static str, &'static str>; 2];

/// Looks up the template for `key` in one locale only.
pub(crate) fn lookup(locale: Locale, key: &str) -> Option<&'static str> {
    static INDEX: OnceLock<CatalogIndex> = OnceLock::new();
    let index = INDEX.get_or_init(|| {
        [Locale::En, Locale::De].map(|locale| catalog_entries_for(locale).iter().copied().collect())
    });
    let slot = match locale {
        Locale::En => 0,
        Locale::De => 1,
    };
    index[slot].get(key).copied()
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the selected locale while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: &[MessageArg]) -> String {
    translate_in(current_locale(), key, args)
}

/// Translates `key` for an explicit locale.
///
/// Falls back to English, then to the key itself.
#[must_use]
pub fn translate_in(locale: Locale, key: &str, args: &[MessageArg]) -> String {
    let template = lookup(locale, key).or_else(|| lookup(Locale::En, key)).unwrap_or(key);
    render(template, args)
}

/// Substitutes `{name}` placeholders in a single left-to-right pass.
///
/// Substituted values are never rescanned. Placeholders without a matching
/// argument are kept verbatim.
fn render(template: &str, args: &[MessageArg]) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[.. open]);
        let tail = &rest[open + 1 ..];
        let Some(close) = tail.find('}') else {
            rendered.push_str(&rest[open ..]);
            return rendered;
        };
        let name = &tail[.. close];
        match args.iter().find(|arg| arg.key == name) {
            Some(arg) => rendered.push_str(&arg.value),
            None => rendered.push_str(&rest[open ..= open + close + 1]),
        }
        rest = &tail[close + 1 ..];
    }
    rendered.push_str(rest);
    rendered
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a catalog key and named arguments.
///
/// Each `name = value` pair fills the `{name}` placeholder with the value's
/// [`Display`](std::fmt::Display) output.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {
        $crate::i18n::translate(
            $key,
            &[$($crate::i18n::MessageArg::new(stringify!($name), $value.to_string())),*],
        )
    };
}
