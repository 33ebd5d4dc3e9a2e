//! Hybrid execution: re-encode the boundaries, stream copy the middle, concatenate

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::domain::model::{CutMethod, Segment, SegmentPlan, TrimOutput};
use crate::engine::workspace::{StagedOutput, TrimWorkspace};
use crate::error::{TrimError, TrimResult};
use crate::ports::{EngineFailure, ExecutePort};

/// Runs a [`SegmentPlan`] against the engine, one call per segment.
pub struct HybridExecutor {
    execute: Arc<dyn ExecutePort>,
    temp_root: Option<PathBuf>,
    segment_format: String,
}

impl HybridExecutor {
    pub fn new(
        execute: Arc<dyn ExecutePort>,
        temp_root: Option<PathBuf>,
        segment_format: impl Into<String>,
    ) -> Self {
        Self {
            execute,
            temp_root,
            segment_format: segment_format.into(),
        }
    }

    /// Produce every segment, join them and move the result onto `output_path`.
    ///
    /// All temporary files are removed on return, including on error, and
    /// `output_path` is only written once the join has succeeded.
    pub async fn run(&self, plan: &SegmentPlan, output_path: &Path) -> TrimResult<TrimOutput> {
        let started = Instant::now();
        let workspace = TrimWorkspace::create(self.temp_root.as_deref(), &self.segment_format)?;
        let staged = StagedOutput::create(output_path)?;

        let total = plan.len();
        let mut segment_files = Vec::with_capacity(total);

        for (position, segment) in plan.segments().iter().enumerate() {
            let path = workspace.segment_path(position, segment.kind);
            info!(
                "Step {}/{}: {} {} ({})",
                position + 1,
                total + 1,
                segment.kind,
                segment.span,
                segment.span.duration()
            );

            self.produce(plan, segment, &path)
                .await
                .map_err(|failure| encode_error(position, segment, failure))?;

            if !has_content(&path) {
                return Err(encode_error(
                    position,
                    segment,
                    EngineFailure::new("engine reported success but wrote no segment file"),
                ));
            }
            segment_files.push(path);
        }

        info!(
            "Step {}/{}: concatenating {} segment(s)",
            total + 1,
            total + 1,
            segment_files.len()
        );
        self.execute
            .concat(&segment_files, staged.path())
            .await
            .map_err(|failure| TrimError::ConcatError {
                segments: segment_files.len(),
                message: failure.message,
                stderr: failure.stderr,
            })?;

        let output_path = staged.commit()?;
        workspace.close();

        let output = TrimOutput {
            output_path,
            segments: plan.segments().to_vec(),
            reencoded: plan.reencoded_duration(),
            copied: plan.copied_duration(),
            elapsed: started.elapsed(),
        };
        info!(
            "Wrote {} ({} re-encoded, {} stream copied) in {:.2?}",
            output.output_path.display(),
            output.reencoded,
            output.copied,
            output.elapsed
        );
        Ok(output)
    }

    async fn produce(
        &self,
        plan: &SegmentPlan,
        segment: &Segment,
        path: &Path,
    ) -> Result<(), EngineFailure> {
        match segment.method() {
            CutMethod::Reencode => {
                debug!("Re-encoding {} to {}", segment.span, path.display());
                self.execute
                    .trim_reencode(&plan.source, segment.span, &plan.target, path)
                    .await
            }
            CutMethod::StreamCopy => {
                debug!("Stream copying {} to {}", segment.span, path.display());
                self.execute
                    .trim_streamcopy(&plan.source, segment.span, path)
                    .await
            }
        }
    }
}

/// Segment numbers in errors are 1-based
fn encode_error(position: usize, segment: &Segment, failure: EngineFailure) -> TrimError {
    TrimError::EncodeError {
        index: position + 1,
        kind: segment.kind,
        span: segment.span,
        message: failure.message,
        stderr: failure.stderr,
    }
}

fn has_content(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}
