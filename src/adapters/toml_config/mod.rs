// TOML config adapter - Settings loaded from defaults, file and environment

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::model::EncoderOverrides;
use crate::error::{TrimError, TrimResult};
use crate::utils::logging::LogFormat;

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "smart_trim.toml";

/// Environment variables and the setting each one overrides
pub const ENV_FFMPEG: &str = "SMART_TRIM_FFMPEG";
pub const ENV_FFPROBE: &str = "SMART_TRIM_FFPROBE";
pub const ENV_TIMEOUT: &str = "SMART_TRIM_TIMEOUT";
pub const ENV_TEMP_DIR: &str = "SMART_TRIM_TEMP_DIR";
pub const ENV_LOG_LEVEL: &str = "SMART_TRIM_LOG_LEVEL";

/// Complete runtime settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub tools: ToolSettings,
    pub encode: EncodeSettings,
    pub workspace: WorkspaceSettings,
    pub logging: LoggingSettings,
}

/// External engine binaries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolSettings {
    pub ffmpeg: Option<PathBuf>,
    pub ffprobe: Option<PathBuf>,
    /// Per-subprocess limit; unset means no limit
    pub timeout_secs: Option<u64>,
}

impl ToolSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Re-encode and intermediate segment options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodeSettings {
    pub video_encoder: Option<String>,
    pub audio_encoder: Option<String>,
    pub crf: Option<u8>,
    pub preset: Option<String>,
    /// Container extension of the temporary segments
    pub segment_format: String,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_encoder: None,
            audio_encoder: None,
            crf: None,
            preset: None,
            segment_format: "ts".to_string(),
        }
    }
}

impl EncodeSettings {
    pub fn overrides(&self) -> EncoderOverrides {
        EncoderOverrides {
            video_encoder: self.video_encoder.clone(),
            audio_encoder: self.audio_encoder.clone(),
            crf: self.crf,
            preset: self.preset.clone(),
        }
    }
}

/// Where per-invocation temporary directories are created
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceSettings {
    /// Defaults to the OS temp directory
    pub temp_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Settings {
    /// Load settings: defaults, then a TOML file, then the process environment.
    ///
    /// An explicit `path` must exist; otherwise [`DEFAULT_CONFIG_FILE`] is used
    /// when present in the working directory.
    pub fn load(path: Option<&Path>) -> TrimResult<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        settings.apply_env(|key| std::env::var(key).ok())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and parse one TOML settings file
    pub fn from_file(path: &Path) -> TrimResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TrimError::ConfigError {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        let settings: Self = toml::from_str(&content).map_err(|e| TrimError::ConfigError {
            message: format!("failed to parse {}: {}", path.display(), e),
        })?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(content: &str) -> TrimResult<Self> {
        toml::from_str(content).map_err(|e| TrimError::ConfigError {
            message: format!("failed to parse TOML settings: {}", e),
        })
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> TrimResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_FFMPEG) {
            debug!("Environment override: {} = {}", ENV_FFMPEG, value);
            self.tools.ffmpeg = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_FFPROBE) {
            debug!("Environment override: {} = {}", ENV_FFPROBE, value);
            self.tools.ffprobe = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_TIMEOUT) {
            let secs = value.trim().parse::<u64>().map_err(|e| TrimError::ConfigError {
                message: format!("invalid {} value '{}': {}", ENV_TIMEOUT, value, e),
            })?;
            self.tools.timeout_secs = Some(secs);
        }
        if let Some(value) = lookup(ENV_TEMP_DIR) {
            self.workspace.temp_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup(ENV_LOG_LEVEL) {
            self.logging.level = value;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> TrimResult<()> {
        if let Some(crf) = self.encode.crf {
            if crf > 51 {
                return Err(TrimError::ConfigError {
                    message: format!("crf must be between 0 and 51, got {}", crf),
                });
            }
        }

        let format = &self.encode.segment_format;
        if format.is_empty() || !format.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TrimError::ConfigError {
                message: format!("segment_format must be a plain extension, got '{}'", format),
            });
        }

        if self.tools.timeout_secs == Some(0) {
            return Err(TrimError::ConfigError {
                message: "timeout_secs must be greater than zero".to_string(),
            });
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
            other => Err(TrimError::ConfigError {
                message: format!(
                    "invalid log level: {}. Valid levels: trace, debug, info, warn, error, off",
                    other
                ),
            }),
        }
    }
}
