//! FFprobe adapter for media file probing
//!
//! Shells out to `ffprobe` twice: once for container and stream metadata,
//! once for the keyframe timestamps of the primary video stream.
//!
//! ffprobe prints absolute presentation timestamps while ffmpeg's input
//! `-ss` counts from the container start time, so keyframes are rebased
//! onto the container start before planning.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use crate::adapters::command::ToolCommand;
use crate::domain::model::{MediaInfo, StreamInfo, StreamKind, TimeSpec};
use crate::ports::{EngineFailure, ProbePort};

/// FFprobe-based probe adapter
#[derive(Debug, Clone)]
pub struct FFprobeAdapter {
    ffprobe_path: PathBuf,
    timeout: Option<Duration>,
}

impl FFprobeAdapter {
    pub fn new(ffprobe_path: PathBuf, timeout: Option<Duration>) -> Self {
        Self {
            ffprobe_path,
            timeout,
        }
    }

    async fn run(&self, args: &[&str], source: &Path) -> Result<String, EngineFailure> {
        let mut cmd = ToolCommand::new(self.ffprobe_path.clone());
        cmd.args(args.iter().copied())
            .arg(source)
            .timeout(self.timeout);
        Ok(cmd.execute().await?.stdout)
    }
}

const STREAMS_ARGS: &[&str] = &[
    "-v",
    "error",
    "-print_format",
    "json",
    "-show_format",
    "-show_streams",
];

const KEYFRAME_ARGS: &[&str] = &[
    "-v",
    "error",
    "-select_streams",
    "v:0",
    "-skip_frame",
    "nokey",
    "-show_entries",
    "frame=pts_time,pkt_pts_time,best_effort_timestamp_time",
    "-print_format",
    "json",
];

#[async_trait]
impl ProbePort for FFprobeAdapter {
    async fn probe(&self, source: &Path) -> Result<MediaInfo, EngineFailure> {
        if !source.is_file() {
            return Err(EngineFailure::new("source file does not exist"));
        }

        info!("Probing {}", source.display());
        let streams_json = self.run(STREAMS_ARGS, source).await?;
        let mut media = parse_streams_json(source, &streams_json)?;

        let frames_json = self.run(KEYFRAME_ARGS, source).await?;
        media.keyframes = parse_keyframes_json(&frames_json, media.start_time)?;

        debug!(
            "Probed {}: format={}, start={}, duration={}, {} streams, {} keyframes",
            source.display(),
            media.format,
            media.start_time,
            media.duration,
            media.streams.len(),
            media.keyframes.len()
        );
        Ok(media)
    }
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    start_time: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    index: usize,
    codec_type: Option<String>,
    codec_name: Option<String>,
    start_time: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFrames {
    #[serde(default)]
    frames: Vec<FfprobeFrame>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFrame {
    pts_time: Option<String>,
    pkt_pts_time: Option<String>,
    best_effort_timestamp_time: Option<String>,
}

/// Parse a positive seconds value as printed by ffprobe ("N/A" yields None)
fn parse_seconds(value: Option<&str>) -> Option<TimeSpec> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
        .map(TimeSpec::from_seconds)
}

/// Parse a timestamp that may be zero or negative
fn parse_timestamp(value: Option<&str>) -> Option<TimeSpec> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .map(TimeSpec::from_seconds)
}

/// Build [`MediaInfo`] from `-show_format -show_streams` output
pub fn parse_streams_json(source: &Path, json: &str) -> Result<MediaInfo, EngineFailure> {
    let output: FfprobeOutput = serde_json::from_str(json)
        .map_err(|e| EngineFailure::new(format!("ffprobe JSON parse error: {}", e)))?;

    let streams: Vec<StreamInfo> = output
        .streams
        .iter()
        .map(|s| {
            let kind = match s.codec_type.as_deref() {
                Some("video") => StreamKind::Video,
                Some("audio") => StreamKind::Audio,
                Some("subtitle") => StreamKind::Subtitle,
                _ => StreamKind::Data,
            };
            StreamInfo::new(s.index, kind, s.codec_name.clone().unwrap_or_default())
        })
        .collect();

    let video = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| EngineFailure::new("no video stream found"))?;

    // Prefer the video stream's own duration; containers such as MKV only
    // report it at format level.
    let format_duration = output
        .format
        .as_ref()
        .and_then(|f| parse_seconds(f.duration.as_deref()));
    let duration = parse_seconds(video.duration.as_deref())
        .or(format_duration)
        .ok_or_else(|| EngineFailure::new("could not determine media duration"))?;

    // ffmpeg seeks relative to the container start; the video stream's own
    // start only stands in when the container reports none.
    let start_time = output
        .format
        .as_ref()
        .and_then(|f| parse_timestamp(f.start_time.as_deref()))
        .or_else(|| parse_timestamp(video.start_time.as_deref()))
        .unwrap_or(TimeSpec::ZERO);

    Ok(MediaInfo {
        path: source.to_path_buf(),
        format: output
            .format
            .and_then(|f| f.format_name)
            .unwrap_or_else(|| "unknown".to_string()),
        start_time,
        duration,
        streams,
        keyframes: Vec::new(),
    })
}

/// Extract keyframe timestamps from `-skip_frame nokey -show_entries frame=...`
/// output, measured from `origin` (the container start time)
pub fn parse_keyframes_json(
    json: &str,
    origin: TimeSpec,
) -> Result<Vec<TimeSpec>, EngineFailure> {
    let output: FfprobeFrames = serde_json::from_str(json)
        .map_err(|e| EngineFailure::new(format!("ffprobe JSON parse error: {}", e)))?;

    let keyframes = output
        .frames
        .iter()
        .filter_map(|frame| {
            // Field name changed across ffprobe releases.
            [
                frame.pts_time.as_deref(),
                frame.pkt_pts_time.as_deref(),
                frame.best_effort_timestamp_time.as_deref(),
            ]
            .into_iter()
            .flatten()
            .find_map(|v| v.trim().parse::<f64>().ok().filter(|s| s.is_finite()))
        })
        .map(|pts| TimeSpec::from_seconds(pts) - origin)
        .collect();

    Ok(keyframes)
}
