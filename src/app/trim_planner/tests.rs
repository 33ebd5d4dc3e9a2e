// Unit tests for trim planning

use std::path::Path;

use async_trait::async_trait;

use super::*;

struct StaticProbe(Result<MediaInfo, EngineFailure>);

#[async_trait]
impl ProbePort for StaticProbe {
    async fn probe(&self, _source: &Path) -> Result<MediaInfo, EngineFailure> {
        self.0.clone()
    }
}

/// Planning never reaches the engine
struct UnusedEngine;

#[async_trait]
impl ExecutePort for UnusedEngine {
    async fn trim_reencode(
        &self,
        _source: &Path,
        _span: Span,
        _target: &ReencodeTarget,
        _output: &Path,
    ) -> Result<(), EngineFailure> {
        Err(EngineFailure::new("unexpected engine call"))
    }

    async fn trim_streamcopy(
        &self,
        _source: &Path,
        _span: Span,
        _output: &Path,
    ) -> Result<(), EngineFailure> {
        Err(EngineFailure::new("unexpected engine call"))
    }

    async fn concat(&self, _inputs: &[PathBuf], _output: &Path) -> Result<(), EngineFailure> {
        Err(EngineFailure::new("unexpected engine call"))
    }
}

fn t(seconds: f64) -> TimeSpec {
    TimeSpec::from_seconds(seconds)
}

fn media() -> MediaInfo {
    MediaInfo {
        path: PathBuf::from("in.mp4"),
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

fn planner_with(probe: Result<MediaInfo, EngineFailure>, options: PlannerOptions) -> TrimPlanner {
    TrimPlanner::new(Arc::new(StaticProbe(probe)), Arc::new(UnusedEngine), options)
}

fn planner() -> TrimPlanner {
    planner_with(Ok(media()), PlannerOptions::default())
}

fn request(start: f64, end: f64) -> TrimRequest {
    TrimRequest::new("in.mp4", t(start), t(end), "out.mp4").unwrap()
}

fn kinds(plan: &SegmentPlan) -> Vec<SegmentKind> {
    plan.segments().iter().map(|s| s.kind).collect()
}

#[tokio::test]
async fn test_plan_unaligned_range() {
    let plan = planner().plan(&request(3.0, 17.0)).await.unwrap();
    assert_eq!(
        kinds(&plan),
        vec![
            SegmentKind::ReencodeLead,
            SegmentKind::StreamCopyMiddle,
            SegmentKind::ReencodeTail
        ]
    );
    assert_eq!(plan.segments()[1].span, Span::new(t(5.0), t(15.0)).unwrap());
    assert_eq!(plan.target.video_codec, "h264");
    assert_eq!(plan.target.audio_codec.as_deref(), Some("aac"));
}

#[tokio::test]
async fn test_plan_aligned_range_is_single_copy() {
    let plan = planner().plan(&request(5.0, 15.0)).await.unwrap();
    assert_eq!(kinds(&plan), vec![SegmentKind::StreamCopyMiddle]);
    assert!(plan.is_lossless());
}

#[tokio::test]
async fn test_plan_inside_one_gop_is_single_reencode() {
    let plan = planner().plan(&request(6.0, 8.0)).await.unwrap();
    assert_eq!(kinds(&plan), vec![SegmentKind::ReencodeWhole]);
    assert_eq!(plan.reencoded_duration(), t(2.0));
}

#[tokio::test]
async fn test_plan_past_duration_is_invalid_range() {
    let err = planner().plan(&request(21.0, 25.0)).await.unwrap_err();
    assert!(matches!(err, TrimError::InvalidRange { .. }));

    let err = planner().plan(&request(10.0, 20.5)).await.unwrap_err();
    assert!(matches!(err, TrimError::InvalidRange { .. }));
}

#[tokio::test]
async fn test_plan_whole_file() {
    let plan = planner().plan(&request(0.0, 20.0)).await.unwrap();
    assert_eq!(kinds(&plan), vec![SegmentKind::StreamCopyMiddle]);
}

#[tokio::test]
async fn test_plan_is_idempotent() {
    let planner = planner();
    let request = request(3.3, 16.9);
    let first = planner.plan(&request).await.unwrap();
    let second = planner.plan(&request).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_probe_failure_becomes_probe_error() {
    let planner = planner_with(
        Err(EngineFailure::with_stderr(
            "ffprobe exited with exit status: 1",
            "in.mp4: Invalid data found when processing input\n",
        )),
        PlannerOptions::default(),
    );
    let err = planner.plan(&request(3.0, 17.0)).await.unwrap_err();
    match err {
        TrimError::ProbeError { path, message } => {
            assert_eq!(path, "in.mp4");
            assert!(message.contains("Invalid data found"));
        }
        other => panic!("expected ProbeError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_encoder_overrides_reach_the_plan() {
    let options = PlannerOptions {
        encoder: EncoderOverrides {
            video_encoder: Some("libx264".to_string()),
            crf: Some(18),
            ..EncoderOverrides::default()
        },
        ..PlannerOptions::default()
    };
    let plan = planner_with(Ok(media()), options)
        .plan(&request(3.0, 17.0))
        .await
        .unwrap();
    assert_eq!(plan.target.video_codec, "libx264");
    assert_eq!(plan.target.crf, Some(18));
    assert_eq!(plan.target.audio_codec.as_deref(), Some("aac"));
}

#[test]
fn test_plan_with_media_without_video_is_probe_error() {
    let audio_only = MediaInfo {
        streams: vec![StreamInfo::new(0, StreamKind::Audio, "mp3")],
        ..media()
    };
    let err = planner()
        .plan_with_media(&request(1.0, 2.0), &audio_only)
        .unwrap_err();
    assert!(matches!(err, TrimError::ProbeError { .. }));
}

#[test]
fn test_plan_serializes_for_dry_run() {
    let plan = planner().plan_with_media(&request(3.0, 17.0), &media()).unwrap();
    let json: serde_json::Value = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["span"]["start"], 3.0);
    assert_eq!(json["segments"][0]["kind"], "reencode_lead");
    assert_eq!(json["segments"][1]["kind"], "stream_copy_middle");
    assert_eq!(json["segments"][2]["span"]["end"], 17.0);
}
