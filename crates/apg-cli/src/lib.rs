// crates/apg-cli/src/lib.rs
// ============================================================================
// Module: Asset Protocol Gate CLI Library
// Description: Shared helpers for the asset protocol gate command-line interface.
// Purpose: Provide reusable components (i18n, logging) for the CLI binary and tests.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! This library module houses shared CLI utilities: the internationalized
//! message catalog and the log subscriber setup. The binary entry point
//! (`src/main.rs`) imports these helpers to keep all user-facing output
//! consistent.
//!
//! Security posture: the `check` command must never reveal why access was
//! denied; only the `diagnose` command prints reasons.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Internationalization helpers and message catalog.
pub mod i18n;
/// Log subscriber initialization.
pub mod logging;
