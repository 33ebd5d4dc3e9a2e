//! Fake media engine shared by the integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use smart_trim::domain::model::{MediaInfo, ReencodeTarget, Span, StreamInfo, StreamKind, TimeSpec};
use smart_trim::adapters::probe_ffprobe::{parse_keyframes_json, parse_streams_json};
use smart_trim::ports::{EngineFailure, ExecutePort, ProbePort};
use smart_trim::{PlannerOptions, TrimPlanner, TrimRequest};

/// Where the fake engine should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Probe,
    /// 1-based segment call
    Segment(usize),
    /// Segment call succeeds without writing its file
    SilentSegment(usize),
    Concat,
}

/// Engine call as seen by the fake
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Reencode(Span),
    StreamCopy(Span),
    Concat(Vec<String>),
}

pub struct FakeEngine {
    media: MediaInfo,
    fault: Option<Fault>,
    calls: Mutex<Vec<Call>>,
}

impl FakeEngine {
    pub fn new(media: MediaInfo) -> Arc<Self> {
        Self::with_fault(media, None)
    }

    pub fn with_fault(media: MediaInfo, fault: Option<Fault>) -> Arc<Self> {
        Arc::new(Self {
            media,
            fault,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn segment_calls(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| !matches!(c, Call::Concat(_)))
            .count()
    }

    fn write_segment(&self, call: Call, output: &Path) -> Result<(), EngineFailure> {
        self.calls.lock().unwrap().push(call.clone());
        let number = self.segment_calls();

        match self.fault {
            Some(Fault::Segment(n)) if n == number => {
                fs::write(output, b"partial").unwrap();
                Err(EngineFailure::with_stderr(
                    "ffmpeg exited with exit status: 1",
                    "Error while opening encoder\n",
                ))
            }
            Some(Fault::SilentSegment(n)) if n == number => Ok(()),
            _ => {
                fs::write(output, format!("{:?}\n", call)).unwrap();
                Ok(())
            }
        }
    }
}

#[async_trait]
impl ProbePort for FakeEngine {
    async fn probe(&self, _source: &Path) -> Result<MediaInfo, EngineFailure> {
        if self.fault == Some(Fault::Probe) {
            return Err(EngineFailure::with_stderr(
                "ffprobe exited with exit status: 1",
                "moov atom not found\n",
            ));
        }
        Ok(self.media.clone())
    }
}

#[async_trait]
impl ExecutePort for FakeEngine {
    async fn trim_reencode(
        &self,
        _source: &Path,
        span: Span,
        _target: &ReencodeTarget,
        output: &Path,
    ) -> Result<(), EngineFailure> {
        self.write_segment(Call::Reencode(span), output)
    }

    async fn trim_streamcopy(
        &self,
        _source: &Path,
        span: Span,
        output: &Path,
    ) -> Result<(), EngineFailure> {
        self.write_segment(Call::StreamCopy(span), output)
    }

    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<(), EngineFailure> {
        let names = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        self.calls.lock().unwrap().push(Call::Concat(names));

        if self.fault == Some(Fault::Concat) {
            fs::write(output, b"half a file").unwrap();
            return Err(EngineFailure::with_stderr(
                "ffmpeg exited with exit status: 1",
                "Non-monotonous DTS in output stream\n",
            ));
        }

        let mut joined = Vec::new();
        for input in inputs {
            joined.extend(fs::read(input).unwrap());
        }
        fs::write(output, joined).unwrap();
        Ok(())
    }
}

pub fn t(seconds: f64) -> TimeSpec {
    TimeSpec::from_seconds(seconds)
}

pub fn span(start: f64, end: f64) -> Span {
    Span::new(t(start), t(end)).unwrap()
}

/// Twenty second H.264/AAC source with a keyframe every five seconds
pub fn sample_media() -> MediaInfo {
    MediaInfo {
        path: PathBuf::from("source.mp4"),
        format: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
        start_time: TimeSpec::ZERO,
        duration: t(20.0),
        streams: vec![
            StreamInfo::new(0, StreamKind::Video, "h264"),
            StreamInfo::new(1, StreamKind::Audio, "aac"),
        ],
        keyframes: [0.0, 5.0, 10.0, 15.0].map(t).to_vec(),
    }
}

/// MPEG-TS source as ffprobe reports it: timestamps start at 1.4s and
/// keyframes fall every five seconds after that
pub fn offset_ts_media() -> MediaInfo {
    let streams = r#"{
        "streams": [
            {"index": 0, "codec_name": "h264", "codec_type": "video", "start_time": "1.400000", "duration": "20.000000"},
            {"index": 1, "codec_name": "aac", "codec_type": "audio", "start_time": "1.400000", "duration": "20.000000"}
        ],
        "format": {"format_name": "mpegts", "start_time": "1.400000", "duration": "20.000000"}
    }"#;
    let frames = r#"{"frames": [
        {"pts_time": "1.400000"}, {"pts_time": "6.400000"},
        {"pts_time": "11.400000"}, {"pts_time": "16.400000"}
    ]}"#;

    let mut media = parse_streams_json(Path::new("source.ts"), streams).unwrap();
    media.keyframes = parse_keyframes_json(frames, media.start_time).unwrap();
    media
}

/// Scratch directories for one test: a temp root and an output directory
pub struct Scratch {
    pub temp_root: TempDir,
    pub out_dir: TempDir,
}

impl Scratch {
    pub fn new() -> Self {
        Self {
            temp_root: tempfile::tempdir().unwrap(),
            out_dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn output(&self) -> PathBuf {
        self.out_dir.path().join("clip.mp4")
    }

    pub fn request(&self, start: f64, end: f64) -> TrimRequest {
        TrimRequest::new("source.mp4", t(start), t(end), self.output()).unwrap()
    }

    pub fn planner(&self, engine: &Arc<FakeEngine>) -> TrimPlanner {
        let options = PlannerOptions {
            temp_root: Some(self.temp_root.path().to_path_buf()),
            ..PlannerOptions::default()
        };
        TrimPlanner::new(engine.clone(), engine.clone(), options)
    }

    pub fn temp_entries(&self) -> usize {
        fs::read_dir(self.temp_root.path()).unwrap().count()
    }

    pub fn out_entries(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.out_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}
