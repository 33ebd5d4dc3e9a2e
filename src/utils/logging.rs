//! Logging setup and output formatting

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::error::{TrimError, TrimResult};

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
    /// JSON format for structured logging
    Json,
}

/// Filter from `RUST_LOG` when set, otherwise from `level`
pub fn build_filter(level: &str) -> TrimResult<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| TrimError::ConfigError {
        message: format!("invalid log level '{}': {}", level, e),
    })
}

/// Install the global subscriber, writing to stderr.
///
/// A subscriber that is already installed is left in place.
pub fn init_logging(level: &str, format: LogFormat) -> TrimResult<()> {
    let filter = build_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = match format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    tracing::debug!("Logging initialized: level={}, format={:?}", level, format);
    Ok(())
}
