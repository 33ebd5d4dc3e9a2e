//! smart-trim library
//!
//! Keyframe-aware video trimming on top of the `ffmpeg` and `ffprobe`
//! binaries. A trim is split into a re-encoded lead-in, a stream-copied
//! middle that starts and ends on keyframes, and a re-encoded tail; the
//! parts are then joined with the concat demuxer.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod domain;
pub mod engine;
pub mod error;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{PlannerOptions, TrimPlanner};
pub use domain::model::{MediaInfo, Segment, SegmentKind, SegmentPlan, TimeSpec, TrimOutput, TrimRequest};
pub use error::{TrimError, TrimResult};
