//! Command implementations

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::Settings;
use crate::app::AppContainer;
use crate::cli::Cli;
use crate::domain::model::{TimeSpec, TrimRequest};

/// Layer command-line flags over loaded settings, then re-validate
pub fn apply_cli_overrides(cli: &Cli, settings: &mut Settings) -> Result<()> {
    if let Some(ffmpeg) = &cli.ffmpeg {
        settings.tools.ffmpeg = Some(ffmpeg.clone());
    }
    if let Some(ffprobe) = &cli.ffprobe {
        settings.tools.ffprobe = Some(ffprobe.clone());
    }
    if let Some(timeout) = cli.timeout {
        settings.tools.timeout_secs = Some(timeout);
    }
    if let Some(temp_dir) = &cli.temp_dir {
        settings.workspace.temp_dir = Some(temp_dir.clone());
    }
    if let Some(level) = &cli.log_level {
        settings.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        settings.logging.format = format;
    }
    settings.validate().context("Invalid command-line settings")?;
    Ok(())
}

/// Build the request from the command line
pub fn build_request(cli: &Cli) -> Result<TrimRequest> {
    let start_time = TimeSpec::parse(&cli.start_time)
        .with_context(|| format!("Invalid start time '{}'", cli.start_time))?;
    let end_time = TimeSpec::parse(&cli.end_time)
        .with_context(|| format!("Invalid end time '{}'", cli.end_time))?;

    let request = TrimRequest::new(&cli.input, start_time, end_time, &cli.output)
        .context("Invalid trim request")?;
    Ok(request)
}

/// Execute the trim command
pub async fn trim(cli: &Cli, settings: &Settings) -> Result<()> {
    let request = build_request(cli)?;
    info!("Input: {}", request.source_path.display());
    info!("Range: {} - {}", request.start_time, request.end_time);
    info!("Output: {}", request.output_path.display());

    let container = AppContainer::new(settings);
    let planner = container.trim_planner();

    let plan = planner
        .plan(&request)
        .await
        .with_context(|| format!("Failed to plan trim of {}", request.source_path.display()))?;

    if cli.dry_run {
        let json = serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?;
        println!("{}", json);
        return Ok(());
    }

    let output = planner
        .execute(&plan, &request)
        .await
        .with_context(|| format!("Failed to write {}", request.output_path.display()))?;

    println!(
        "Wrote {}: {} segment(s), {} re-encoded, {} stream copied",
        output.output_path.display(),
        output.segments.len(),
        output.reencoded,
        output.copied
    );
    Ok(())
}
