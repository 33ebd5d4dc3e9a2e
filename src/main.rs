//! smart-trim CLI
//!
//! Cuts a video between two timestamps while re-encoding only the segments
//! between each cut point and its nearest keyframe.
//!
//! # Usage
//!
//! ```bash
//! smart-trim input.mp4 --start_time 3 --end_time 00:17 --output clip.mp4
//! smart-trim input.mkv --start_time 01:02:03.5 --end_time 01:04:00 -o clip.mkv --dry-run
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use smart_trim::adapters::Settings;
use smart_trim::cli::{commands, Cli};
use smart_trim::utils::init_logging;
use smart_trim::TrimError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    commands::apply_cli_overrides(&cli, &mut settings)?;
    init_logging(&settings.logging.level, settings.logging.format)?;

    commands::trim(&cli, &settings).await
}

/// Exit code of the first [`TrimError`] in the chain, 1 otherwise
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<TrimError>())
        .map(TrimError::exit_code)
        .unwrap_or(1)
}
