use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::adapters::{FFmpegAdapter, FFprobeAdapter, Settings};
use crate::app::trim_planner::{PlannerOptions, TrimPlanner};
use crate::ports::{ExecutePort, ProbePort};

/// Wires the ffmpeg/ffprobe adapters into a [`TrimPlanner`] from settings
pub struct AppContainer {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    planner: Arc<TrimPlanner>,
}

impl AppContainer {
    pub fn new(settings: &Settings) -> Self {
        let ffmpeg = resolve_tool(settings.tools.ffmpeg.as_deref(), "ffmpeg");
        let ffprobe = resolve_tool(settings.tools.ffprobe.as_deref(), "ffprobe");
        let timeout = settings.tools.timeout();

        let probe_port = Arc::new(FFprobeAdapter::new(ffprobe.clone(), timeout));
        let execute_port = Arc::new(FFmpegAdapter::new(ffmpeg.clone(), timeout));

        let options = PlannerOptions {
            temp_root: settings.workspace.temp_dir.clone(),
            segment_format: settings.encode.segment_format.clone(),
            encoder: settings.encode.overrides(),
        };

        let planner = Arc::new(TrimPlanner::new(
            probe_port as Arc<dyn ProbePort>,
            execute_port as Arc<dyn ExecutePort>,
            options,
        ));

        Self {
            ffmpeg,
            ffprobe,
            planner,
        }
    }

    pub fn trim_planner(&self) -> Arc<TrimPlanner> {
        Arc::clone(&self.planner)
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn ffprobe_path(&self) -> &Path {
        &self.ffprobe
    }
}

/// Configured path, else the first match on `PATH`, else the bare name
fn resolve_tool(configured: Option<&Path>, name: &str) -> PathBuf {
    if let Some(path) = configured {
        return path.to_path_buf();
    }
    match which::which(name) {
        Ok(path) => {
            debug!("Found {} at {}", name, path.display());
            path
        }
        Err(e) => {
            debug!("{} not found on PATH ({}), using bare name", name, e);
            PathBuf::from(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_tool_paths_win() {
        let mut settings = Settings::default();
        settings.tools.ffmpeg = Some(PathBuf::from("/opt/ff/ffmpeg"));
        settings.tools.ffprobe = Some(PathBuf::from("/opt/ff/ffprobe"));

        let container = AppContainer::new(&settings);
        assert_eq!(container.ffmpeg_path(), Path::new("/opt/ff/ffmpeg"));
        assert_eq!(container.ffprobe_path(), Path::new("/opt/ff/ffprobe"));
        assert_eq!(container.trim_planner().options().segment_format, "ts");
    }

    #[test]
    fn test_missing_tool_falls_back_to_bare_name() {
        assert_eq!(
            resolve_tool(None, "definitely-not-a-real-tool-xyz"),
            PathBuf::from("definitely-not-a-real-tool-xyz")
        );
    }
}
