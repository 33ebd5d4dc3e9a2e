// Trim planner - Orchestrates the smart trim use case

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::domain::model::*;
use crate::engine::HybridExecutor;
use crate::error::{TrimError, TrimResult};
use crate::planner::{plan_segments, KeyframeIndex};
use crate::ports::*;

/// Workspace and encoder options for a [`TrimPlanner`]
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerOptions {
    /// Directory under which per-invocation workspaces are created
    pub temp_root: Option<PathBuf>,
    /// Container extension of the intermediate segment files
    pub segment_format: String,
    pub encoder: EncoderOverrides,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            temp_root: None,
            segment_format: "ts".to_string(),
            encoder: EncoderOverrides::default(),
        }
    }
}

/// Plans a trim against the probed keyframes and drives the engine to produce it
pub struct TrimPlanner {
    probe_port: Arc<dyn ProbePort>,
    executor: HybridExecutor,
    options: PlannerOptions,
}

impl TrimPlanner {
    /// Create new trim planner with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        execute_port: Arc<dyn ExecutePort>,
        options: PlannerOptions,
    ) -> Self {
        let executor = HybridExecutor::new(
            execute_port,
            options.temp_root.clone(),
            options.segment_format.clone(),
        );
        Self {
            probe_port,
            executor,
            options,
        }
    }

    /// Probe the request's source for duration, streams and keyframes
    pub async fn probe(&self, request: &TrimRequest) -> TrimResult<MediaInfo> {
        self.probe_port
            .probe(&request.source_path)
            .await
            .map_err(|failure| probe_error(request, failure))
    }

    /// Probe the source and compute the segment plan. Creates no files.
    pub async fn plan(&self, request: &TrimRequest) -> TrimResult<SegmentPlan> {
        let media = self.probe(request).await?;
        info!(
            "Media file probed: {} streams, duration: {}, {} keyframes",
            media.streams.len(),
            media.duration,
            media.keyframes.len()
        );
        self.plan_with_media(request, &media)
    }

    /// Compute the segment plan from an existing probe result
    pub fn plan_with_media(
        &self,
        request: &TrimRequest,
        media: &MediaInfo,
    ) -> TrimResult<SegmentPlan> {
        request.validate_against_duration(media.duration)?;

        let index = KeyframeIndex::new(media.keyframes.iter().copied(), media.duration);
        if let Some(gop) = index.mean_interval() {
            info!("Keyframe index: {} cut points, mean GOP {}", index.len(), gop);
        }

        let target = ReencodeTarget::matching_source(media)
            .ok_or_else(|| probe_error(request, EngineFailure::new("no video stream found")))?
            .with_overrides(&self.options.encoder);

        let segments = plan_segments(&index, request.start_time, request.end_time);
        let plan = SegmentPlan::new(request.source_path.clone(), request.span(), target, segments)?;

        info!(
            "Planned {} segment(s): {} re-encoded, {} stream copied",
            plan.len(),
            plan.reencoded_duration(),
            plan.copied_duration()
        );
        Ok(plan)
    }

    /// Produce `plan` and write the result to the request's output path
    pub async fn execute(&self, plan: &SegmentPlan, request: &TrimRequest) -> TrimResult<TrimOutput> {
        self.executor.run(plan, &request.output_path).await
    }

    /// Plan then execute
    pub async fn trim(&self, request: &TrimRequest) -> TrimResult<TrimOutput> {
        let plan = self.plan(request).await?;
        self.execute(&plan, request).await
    }

    pub fn options(&self) -> &PlannerOptions {
        &self.options
    }
}

fn probe_error(request: &TrimRequest, failure: EngineFailure) -> TrimError {
    let message = match failure.stderr.lines().rev().find(|l| !l.trim().is_empty()) {
        Some(last) => format!("{} ({})", failure.message, last.trim()),
        None => failure.message,
    };
    TrimError::ProbeError {
        path: request.source_path.display().to_string(),
        message,
    }
}

#[cfg(test)]
mod tests;
