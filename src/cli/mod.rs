//! CLI module for smart-trim
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::Parser;

use crate::utils::LogFormat;

pub mod commands;

/// Keyframe-aware video trimming
///
/// Re-encodes only the short segments between each cut point and its nearest
/// keyframe, stream copies everything in between, and joins the parts.
#[derive(Parser, Debug)]
#[command(name = "smart-trim")]
#[command(version)]
#[command(about = "Trim a video between two timestamps, re-encoding only the boundaries")]
pub struct Cli {
    /// Source video file
    pub input: PathBuf,

    /// Start time (seconds, MM:SS.ms or HH:MM:SS.ms)
    #[arg(long = "start_time", visible_alias = "start-time", value_name = "TIME", allow_hyphen_values = true)]
    pub start_time: String,

    /// End time (seconds, MM:SS.ms or HH:MM:SS.ms)
    #[arg(long = "end_time", visible_alias = "end-time", value_name = "TIME", allow_hyphen_values = true)]
    pub end_time: String,

    /// Output file path
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Settings file (defaults to ./smart_trim.toml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory for the temporary workspace
    #[arg(long, value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Path to the ffmpeg binary
    #[arg(long, value_name = "PATH")]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe binary
    #[arg(long, value_name = "PATH")]
    pub ffprobe: Option<PathBuf>,

    /// Kill any engine call running longer than this many seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Probe and plan only; print the segment plan as JSON
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (RUST_LOG takes precedence)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_underscore_and_dash_flags() {
        let cli = Cli::try_parse_from([
            "smart-trim",
            "in.mp4",
            "--start_time",
            "3",
            "--end-time",
            "00:17",
            "-o",
            "out.mp4",
        ])
        .unwrap();
        assert_eq!(cli.input, PathBuf::from("in.mp4"));
        assert_eq!(cli.start_time, "3");
        assert_eq!(cli.end_time, "00:17");
        assert_eq!(cli.output, PathBuf::from("out.mp4"));
        assert!(!cli.dry_run);
        assert_eq!(cli.log_format, None);
    }

    #[test]
    fn test_optional_flags() {
        let cli = Cli::try_parse_from([
            "smart-trim",
            "in.mkv",
            "--start-time",
            "1.5",
            "--end_time",
            "9",
            "--output",
            "out.mkv",
            "--timeout",
            "30",
            "--dry-run",
            "--log-format",
            "json",
            "--ffprobe",
            "/opt/ffprobe",
        ])
        .unwrap();
        assert_eq!(cli.timeout, Some(30));
        assert!(cli.dry_run);
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert_eq!(cli.ffprobe, Some(PathBuf::from("/opt/ffprobe")));
    }

    #[test]
    fn test_missing_required_arguments() {
        assert!(Cli::try_parse_from(["smart-trim", "in.mp4", "--start_time", "1"]).is_err());
        assert!(Cli::try_parse_from([
            "smart-trim",
            "in.mp4",
            "--start_time",
            "1",
            "--end_time",
            "2",
            "--output",
            "o.mp4",
            "--timeout",
            "0"
        ])
        .is_err());
    }
}
