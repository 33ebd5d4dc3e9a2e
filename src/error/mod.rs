//! Error handling module for smart-trim

use thiserror::Error;

use crate::domain::model::{SegmentKind, Span};

/// Main error type for trim operations
#[derive(Error, Debug)]
pub enum TrimError {
    /// Requested bounds are out of order or outside the source
    #[error("Invalid time range: {message}")]
    InvalidRange { message: String },

    /// Invalid time format
    #[error("Invalid time format: {time}. Expected seconds, MM:SS.ms or HH:MM:SS.ms")]
    InvalidTimeFormat { time: String },

    /// Source could not be probed for duration, streams or keyframes
    #[error("Failed to probe media file {path}: {message}")]
    ProbeError { path: String, message: String },

    /// Engine failed while producing one segment
    #[error("Segment {index} ({kind} {span}) failed: {message}{}", stderr_tail(.stderr))]
    EncodeError {
        index: usize,
        kind: SegmentKind,
        span: Span,
        message: String,
        stderr: String,
    },

    /// Engine failed while joining the segments
    #[error("Failed to concatenate {segments} segment(s): {message}{}", stderr_tail(.stderr))]
    ConcatError {
        segments: usize,
        message: String,
        stderr: String,
    },

    /// Settings file or values rejected
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TrimError {
    /// Shorthand for an [`TrimError::InvalidRange`] with a formatted message
    pub fn invalid_range(message: impl Into<String>) -> Self {
        TrimError::InvalidRange {
            message: message.into(),
        }
    }

    /// Process exit code reported by the CLI for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            TrimError::InvalidRange { .. } | TrimError::InvalidTimeFormat { .. } => 2,
            TrimError::ProbeError { .. } => 3,
            TrimError::EncodeError { .. } => 4,
            TrimError::ConcatError { .. } => 5,
            TrimError::ConfigError { .. } => 6,
            TrimError::IoError(_) => 1,
        }
    }
}

/// Last lines of an engine's stderr, prefixed for display
fn stderr_tail(stderr: &str) -> String {
    const MAX_LINES: usize = 12;

    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return String::new();
    }

    let skip = lines.len().saturating_sub(MAX_LINES);
    let mut out = String::from("\nengine stderr:");
    for line in &lines[skip..] {
        out.push_str("\n  ");
        out.push_str(line);
    }
    out
}

/// Result type alias for trim operations
pub type TrimResult<T> = std::result::Result<T, TrimError>;
