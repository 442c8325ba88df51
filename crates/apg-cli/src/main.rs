// crates/apg-cli/src/main.rs
// ============================================================================
// Module: Asset Protocol Gate CLI Entry Point
// Description: Command dispatcher for the usage gate check and diagnosis.
// Purpose: Let a hosting application gate startup on the process exit code.
// Dependencies: apg-gate, clap, thiserror, tracing
// ============================================================================

//! ## Overview
//! `asset-protocol-gate` runs the usage gate once and exits. `check` (the
//! default) exits with success only when usage is allowed and otherwise
//! prints a generic localized message. `diagnose` prints every step of the
//! decision for operators. All user-facing strings are routed through the
//! i18n catalog.
//!
//! Security posture: `check` must not disclose the deny reason.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use apg_cli::i18n::Locale;
use apg_cli::i18n::set_locale;
use apg_cli::logging::LOG_ENV;
use apg_cli::logging::init_logging;
use apg_cli::t;
use apg_gate::ALLOW_ENV;
use apg_gate::CONFIG_PATH_ENV;
use apg_gate::DenyReason;
use apg_gate::GateConfig;
use apg_gate::GateDecision;
use apg_gate::GateFileConfig;
use apg_gate::GateReport;
use apg_gate::UsageGate;
use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "APG_LANG";
/// Number of characters of fetched content shown by `diagnose`.
const PREVIEW_CHARS: usize = 80;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "asset-protocol-gate",
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `APG_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand; `check` when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the usage gate; exit 0 only when usage is allowed.
    Check(GateArgs),
    /// Print each step of the gate decision.
    Diagnose(GateArgs),
}

/// Gate resolution flags shared by `check` and `diagnose`.
#[derive(Args, Debug, Default, Clone)]
struct GateArgs {
    /// Network timeout in seconds.
    #[arg(long, value_name = "SECS", value_parser = parse_timeout)]
    timeout: Option<Duration>,
    /// Gate source URL, `file:` URI, or path (overrides `APG_GATE_URL`).
    #[arg(long, value_name = "SOURCE")]
    source: Option<String>,
    /// TOML config file (overrides `APG_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum LangArg {
    /// English.
    En,
    /// German.
    De,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::De => Self::De,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let log_directives = std::env::var(LOG_ENV).ok();
    init_logging(log_directives.as_deref())
        .map_err(|err| CliError::new(t!("logging.init_failed", error = err)))?;

    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref());
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let lookup = |key: &str| std::env::var(key).ok();
    match cli.command.unwrap_or_else(|| Commands::Check(GateArgs::default())) {
        Commands::Check(args) => command_check(&args, &lookup),
        Commands::Diagnose(args) => command_diagnose(&args, &lookup),
    }
}

// ============================================================================
// SECTION: Check Command
// ============================================================================

/// Executes the `check` command.
fn command_check<F>(args: &GateArgs, lookup: &F) -> CliResult<ExitCode>
where
    F: Fn(&str) -> Option<String>,
{
    if check_allowed(args, lookup) {
        return Ok(ExitCode::SUCCESS);
    }
    write_stderr_line(&t!("check.denied"))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    Ok(ExitCode::FAILURE)
}

/// Resolves configuration and runs the gate.
///
/// A configuration error denies unless the override is set.
fn check_allowed<F>(args: &GateArgs, lookup: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    match resolve_config(args, lookup) {
        Ok(config) => UsageGate::new(config).is_allowed(),
        Err(err) => {
            tracing::debug!(error = %err, "configuration rejected");
            GateConfig::from_lookup(lookup).allow_override
        }
    }
}

// ============================================================================
// SECTION: Diagnose Command
// ============================================================================

/// Executes the `diagnose` command.
fn command_diagnose<F>(args: &GateArgs, lookup: &F) -> CliResult<ExitCode>
where
    F: Fn(&str) -> Option<String>,
{
    let override_value = lookup(ALLOW_ENV).unwrap_or_else(|| t!("diagnose.unset"));
    let mut lines = vec![
        t!("diagnose.header"),
        t!("diagnose.override", env = ALLOW_ENV, value = override_value),
    ];
    match resolve_config(args, lookup) {
        Ok(config) => {
            let gate = UsageGate::new(config);
            let report = gate.report();
            lines.extend(describe_report(gate.config(), &report));
        }
        Err(err) => lines.push(t!("diagnose.config_error", error = err)),
    }
    for line in lines {
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Renders the diagnosis lines for a gate report.
fn describe_report(config: &GateConfig, report: &GateReport) -> Vec<String> {
    let kind = report
        .source_kind
        .as_ref()
        .map_or_else(|| t!("diagnose.kind.skipped"), |kind| kind.label().to_string());
    let fetch = match (&report.content, &report.decision) {
        (Some(content), _) => t!(
            "diagnose.fetched",
            length = content.chars().count(),
            preview = content_preview(content)
        ),
        (None, GateDecision::Denied(DenyReason::Fetch(err))) => {
            t!("diagnose.fetch_failed", error = err)
        }
        (None, _) => t!("diagnose.fetch_skipped"),
    };
    let decision = match &report.decision {
        GateDecision::Allowed(reason) => {
            t!("diagnose.decision.allowed", reason = reason.as_str())
        }
        GateDecision::Denied(reason) => t!("diagnose.decision.denied", reason = reason),
    };
    vec![
        t!("diagnose.source", source = config.source),
        t!("diagnose.kind", kind = kind),
        fetch,
        decision,
    ]
}

/// Returns the escaped leading characters of fetched content.
fn content_preview(content: &str) -> String {
    content.chars().take(PREVIEW_CHARS).flat_map(char::escape_debug).collect()
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Resolves the gate configuration from flags, environment, and config file.
fn resolve_config<F>(args: &GateArgs, lookup: &F) -> CliResult<GateConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let path = args.config.clone().or_else(|| lookup(CONFIG_PATH_ENV).map(PathBuf::from));
    let file = match &path {
        Some(path) => Some(GateFileConfig::load(path).map_err(|err| {
            CliError::new(t!("config.load_failed", path = path.display(), error = err))
        })?),
        None => None,
    };
    let mut config = GateConfig::resolve(file.as_ref(), lookup)
        .map_err(|err| CliError::new(t!("config.invalid", error = err)))?;
    if let Some(source) = &args.source {
        config = config.with_source(source);
    }
    if let Some(timeout) = args.timeout {
        config = config.with_timeout(timeout);
        config.validate().map_err(|err| CliError::new(t!("config.invalid", error = err)))?;
    }
    Ok(config)
}

/// Parses a `--timeout` value in seconds.
fn parse_timeout(raw: &str) -> Result<Duration, String> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .ok_or_else(|| t!("timeout.invalid", value = raw))
}

/// Resolves the CLI locale from flags or environment.
///
/// An unsupported environment value falls back to English so it can never
/// block the gate.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> Locale {
    if let Some(lang) = lang {
        return lang.into();
    }
    let Some(value) = env_lang else {
        return Locale::En;
    };
    Locale::parse(value).unwrap_or_else(|| {
        tracing::debug!(env = LANG_ENV, value, "unsupported locale, using en");
        Locale::En
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
