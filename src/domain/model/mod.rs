// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{TrimError, TrimResult};

const MICROS_PER_SECOND: i64 = 1_000_000;

/// Point in media time with microsecond precision (the engine's time base)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct TimeSpec {
    micros: i64,
}

impl TimeSpec {
    pub const ZERO: TimeSpec = TimeSpec { micros: 0 };

    /// Create a TimeSpec from seconds, rounded to the nearest microsecond
    pub fn from_seconds(seconds: f64) -> Self {
        Self {
            micros: (seconds * MICROS_PER_SECOND as f64).round() as i64,
        }
    }

    /// Create a TimeSpec from whole microseconds
    pub fn from_micros(micros: i64) -> Self {
        Self { micros }
    }

    pub fn as_seconds(&self) -> f64 {
        self.micros as f64 / MICROS_PER_SECOND as f64
    }

    pub fn as_micros(&self) -> i64 {
        self.micros
    }

    pub fn is_negative(&self) -> bool {
        self.micros < 0
    }

    /// Parse time string in various formats
    pub fn parse(time_str: &str) -> TrimResult<Self> {
        let trimmed = time_str.trim();
        let invalid = || TrimError::InvalidTimeFormat {
            time: time_str.to_string(),
        };

        // Try parsing as seconds (float)
        if let Ok(seconds) = trimmed.parse::<f64>() {
            if !seconds.is_finite() {
                return Err(invalid());
            }
            if seconds < 0.0 {
                return Err(TrimError::invalid_range(format!(
                    "time cannot be negative: {}",
                    trimmed
                )));
            }
            return Ok(Self::from_seconds(seconds));
        }

        // Try parsing as HH:MM:SS.ms or MM:SS.ms
        let parts: Vec<&str> = trimmed.split(':').collect();
        let (hours, minutes, seconds_part) = match parts.as_slice() {
            [m, s] => (0, m.parse::<u32>().map_err(|_| invalid())?, *s),
            [h, m, s] => {
                let hours = h.parse::<u32>().map_err(|_| invalid())?;
                let minutes = m.parse::<u32>().map_err(|_| invalid())?;
                if minutes >= 60 {
                    return Err(invalid());
                }
                (hours, minutes, *s)
            }
            _ => return Err(invalid()),
        };

        let seconds = seconds_part.parse::<f64>().map_err(|_| invalid())?;
        if !(0.0..60.0).contains(&seconds) {
            return Err(invalid());
        }

        Ok(Self::from_seconds(
            hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
        ))
    }

    /// Format as HH:MM:SS.mmm (hours omitted when zero)
    pub fn format_hms(&self) -> String {
        let sign = if self.micros < 0 { "-" } else { "" };
        let total_millis = self.micros.abs() / 1000;
        let hours = total_millis / 3_600_000;
        let minutes = (total_millis % 3_600_000) / 60_000;
        let seconds = (total_millis % 60_000) / 1000;
        let milliseconds = total_millis % 1000;

        if hours > 0 {
            format!("{}{:02}:{:02}:{:02}.{:03}", sign, hours, minutes, seconds, milliseconds)
        } else {
            format!("{}{:02}:{:02}.{:03}", sign, minutes, seconds, milliseconds)
        }
    }

    /// Exact decimal seconds as passed to the engine, e.g. `12.500000`
    pub fn to_engine_arg(&self) -> String {
        let sign = if self.micros < 0 { "-" } else { "" };
        let abs = self.micros.abs();
        format!(
            "{}{}.{:06}",
            sign,
            abs / MICROS_PER_SECOND,
            abs % MICROS_PER_SECOND
        )
    }
}

impl From<f64> for TimeSpec {
    fn from(seconds: f64) -> Self {
        TimeSpec::from_seconds(seconds)
    }
}

impl From<TimeSpec> for f64 {
    fn from(time: TimeSpec) -> Self {
        time.as_seconds()
    }
}

impl std::ops::Sub for TimeSpec {
    type Output = TimeSpec;

    fn sub(self, rhs: TimeSpec) -> TimeSpec {
        TimeSpec::from_micros(self.micros - rhs.micros)
    }
}

impl std::ops::Add for TimeSpec {
    type Output = TimeSpec;

    fn add(self, rhs: TimeSpec) -> TimeSpec {
        TimeSpec::from_micros(self.micros + rhs.micros)
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

/// Half-open time interval `[start, end)` with `start < end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: TimeSpec,
    pub end: TimeSpec,
}

impl Span {
    pub fn new(start: TimeSpec, end: TimeSpec) -> TrimResult<Self> {
        if start >= end {
            return Err(TrimError::invalid_range(format!(
                "start ({}) must be before end ({})",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> TimeSpec {
        self.end - self.start
    }

    /// Whether `other` begins exactly where this span ends
    pub fn is_followed_by(&self, other: &Span) -> bool {
        self.end == other.start
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A single trim invocation as requested on the command line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrimRequest {
    pub source_path: PathBuf,
    pub start_time: TimeSpec,
    pub end_time: TimeSpec,
    pub output_path: PathBuf,
}

impl TrimRequest {
    /// Create a request; rejects negative or out-of-order bounds
    pub fn new(
        source_path: impl Into<PathBuf>,
        start_time: TimeSpec,
        end_time: TimeSpec,
        output_path: impl Into<PathBuf>,
    ) -> TrimResult<Self> {
        if start_time.is_negative() {
            return Err(TrimError::invalid_range(format!(
                "start ({}) cannot be negative",
                start_time
            )));
        }
        Span::new(start_time, end_time)?;

        Ok(Self {
            source_path: source_path.into(),
            start_time,
            end_time,
            output_path: output_path.into(),
        })
    }

    pub fn span(&self) -> Span {
        Span {
            start: self.start_time,
            end: self.end_time,
        }
    }

    /// Check the requested bounds against the probed source duration
    pub fn validate_against_duration(&self, duration: TimeSpec) -> TrimResult<()> {
        if self.start_time >= duration {
            return Err(TrimError::invalid_range(format!(
                "start ({}) is at or beyond the source duration ({})",
                self.start_time, duration
            )));
        }
        if self.end_time > duration {
            return Err(TrimError::invalid_range(format!(
                "end ({}) is beyond the source duration ({})",
                self.end_time, duration
            )));
        }
        Ok(())
    }
}

/// Kind of elementary stream in the source container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
}

/// Elementary stream information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub index: usize,
    pub kind: StreamKind,
    pub codec: String,
}

impl StreamInfo {
    pub fn new(index: usize, kind: StreamKind, codec: impl Into<String>) -> Self {
        Self {
            index,
            kind,
            codec: codec.into(),
        }
    }
}

/// Probe result for a source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub format: String,
    /// Container start timestamp. Seeks, `duration` and `keyframes` are
    /// measured from it.
    #[serde(default)]
    pub start_time: TimeSpec,
    pub duration: TimeSpec,
    pub streams: Vec<StreamInfo>,
    /// Keyframe timestamps of the primary video stream, in probe order
    pub keyframes: Vec<TimeSpec>,
}

impl MediaInfo {
    /// Get primary video stream (the first one)
    pub fn primary_video_stream(&self) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.kind == StreamKind::Video)
    }

    /// Get primary audio stream
    pub fn primary_audio_stream(&self) -> Option<&StreamInfo> {
        self.streams.iter().find(|s| s.kind == StreamKind::Audio)
    }
}

/// How a segment is produced by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutMethod {
    /// Full decode/encode restricted to the segment
    Reencode,
    /// Packet-level copy between keyframes
    StreamCopy,
}

/// Role of a segment inside a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// From the requested start up to the first keyframe
    ReencodeLead,
    /// Between the first and last keyframe
    StreamCopyMiddle,
    /// From the last keyframe up to the requested end
    ReencodeTail,
    /// The whole request, when no keyframe pair lies inside it
    ReencodeWhole,
}

impl SegmentKind {
    pub fn method(&self) -> CutMethod {
        match self {
            SegmentKind::StreamCopyMiddle => CutMethod::StreamCopy,
            SegmentKind::ReencodeLead | SegmentKind::ReencodeTail | SegmentKind::ReencodeWhole => {
                CutMethod::Reencode
            }
        }
    }

    /// Short name used in temporary file names
    pub fn slug(&self) -> &'static str {
        match self {
            SegmentKind::ReencodeLead => "lead",
            SegmentKind::StreamCopyMiddle => "middle",
            SegmentKind::ReencodeTail => "tail",
            SegmentKind::ReencodeWhole => "whole",
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SegmentKind::ReencodeLead => "re-encode lead",
            SegmentKind::StreamCopyMiddle => "stream copy",
            SegmentKind::ReencodeTail => "re-encode tail",
            SegmentKind::ReencodeWhole => "re-encode",
        };
        f.write_str(name)
    }
}

/// One planned piece of the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub kind: SegmentKind,
    pub span: Span,
}

impl Segment {
    pub fn new(kind: SegmentKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn method(&self) -> CutMethod {
        self.kind.method()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.span)
    }
}

/// Codecs used for the re-encoded segments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReencodeTarget {
    pub video_codec: String,
    pub audio_codec: Option<String>,
    pub crf: Option<u8>,
    pub preset: Option<String>,
}

impl ReencodeTarget {
    /// Match the source codecs so re-encoded and copied segments concatenate
    pub fn matching_source(media: &MediaInfo) -> Option<Self> {
        let video = media.primary_video_stream()?;
        Some(Self {
            video_codec: video.codec.clone(),
            audio_codec: media.primary_audio_stream().map(|a| a.codec.clone()),
            crf: None,
            preset: None,
        })
    }

    /// Replace codecs and quality options with any configured overrides
    pub fn with_overrides(mut self, overrides: &EncoderOverrides) -> Self {
        if let Some(video) = &overrides.video_encoder {
            self.video_codec = video.clone();
        }
        if let Some(audio) = &overrides.audio_encoder {
            self.audio_codec = Some(audio.clone());
        }
        self.crf = overrides.crf.or(self.crf);
        self.preset = overrides.preset.clone().or(self.preset);
        self
    }
}

/// Encoder choices from settings, applied on top of the source codecs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncoderOverrides {
    pub video_encoder: Option<String>,
    pub audio_encoder: Option<String>,
    pub crf: Option<u8>,
    pub preset: Option<String>,
}

/// Ordered, gap-free sequence of 1 to 3 segments covering a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPlan {
    pub source: PathBuf,
    pub span: Span,
    pub target: ReencodeTarget,
    segments: Vec<Segment>,
}

impl SegmentPlan {
    /// Build a plan, checking that `segments` tile `span` exactly
    pub fn new(
        source: impl Into<PathBuf>,
        span: Span,
        target: ReencodeTarget,
        segments: Vec<Segment>,
    ) -> TrimResult<Self> {
        if segments.is_empty() || segments.len() > 3 {
            return Err(TrimError::invalid_range(format!(
                "a plan needs 1 to 3 segments, got {}",
                segments.len()
            )));
        }
        let first = segments[0].span.start;
        let last = segments[segments.len() - 1].span.end;
        let contiguous = segments.windows(2).all(|w| w[0].span.is_followed_by(&w[1].span));
        if first != span.start || last != span.end || !contiguous {
            return Err(TrimError::invalid_range(format!(
                "segments do not tile {} exactly",
                span
            )));
        }

        Ok(Self {
            source: source.into(),
            span,
            target,
            segments,
        })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total time that goes through a decode/encode pass
    pub fn reencoded_duration(&self) -> TimeSpec {
        self.duration_of(CutMethod::Reencode)
    }

    /// Total time copied packet-for-packet
    pub fn copied_duration(&self) -> TimeSpec {
        self.duration_of(CutMethod::StreamCopy)
    }

    /// True when nothing is re-encoded
    pub fn is_lossless(&self) -> bool {
        self.segments.iter().all(|s| s.method() == CutMethod::StreamCopy)
    }

    fn duration_of(&self, method: CutMethod) -> TimeSpec {
        self.segments
            .iter()
            .filter(|s| s.method() == method)
            .fold(TimeSpec::ZERO, |acc, s| acc + s.span.duration())
    }
}

/// Successful outcome of a trim
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrimOutput {
    pub output_path: PathBuf,
    pub segments: Vec<Segment>,
    pub reencoded: TimeSpec,
    pub copied: TimeSpec,
    pub elapsed: Duration,
}
