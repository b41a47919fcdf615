// src/logging.rs

//! Logging setup for `assetpipe` using `tracing` + `tracing-subscriber`.
//!
//! Filter selection, first match wins:
//! 1. `--log-level` on the command line applies to `assetpipe` itself
//! 2. `ASSETPIPE_LOG` as a full filter directive (`debug`,
//!    `assetpipe=trace,lightningcss=warn`, ...)
//! 3. `info`
//!
//! Transform crates are capped at `warn` unless a directive names them.
//! Logs go to STDERR; task summaries are printed on stdout.

use anyhow::{anyhow, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Environment variable holding a filter directive.
pub const LOG_ENV: &str = "ASSETPIPE_LOG";

/// Crates whose own logging is only interesting when something breaks.
const QUIET_DEPENDENCIES: &[&str] = &["notify", "oxipng", "rav1e", "lightningcss"];

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => with_quiet_dependencies(level_from_log_level(lvl).as_str()),
        None => match std::env::var(LOG_ENV) {
            Ok(spec) if !spec.trim().is_empty() => build_filter(&spec)?,
            _ => with_quiet_dependencies("info"),
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

/// Parse a directive string; a bare level also quiets the transform crates.
fn build_filter(spec: &str) -> Result<EnvFilter> {
    if let Some(level) = parse_level_str(spec) {
        return Ok(with_quiet_dependencies(level.as_str()));
    }
    EnvFilter::try_new(spec).map_err(|e| anyhow!("invalid {LOG_ENV} value {spec:?}: {e}"))
}

fn with_quiet_dependencies(level: &str) -> EnvFilter {
    let mut directives = vec![level.to_ascii_lowercase()];
    directives.extend(QUIET_DEPENDENCIES.iter().map(|krate| format!("{krate}=warn")));
    EnvFilter::new(directives.join(","))
}

fn level_from_log_level(lvl: LogLevel) -> Level {
    match lvl {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

/// Parse a plain level name, case-insensitively.
pub fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
