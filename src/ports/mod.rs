// Ports - Interface definitions (contracts) for the external media engine

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::model::{MediaInfo, ReencodeTarget, Span};

/// Failure reported by an engine call, before trim context is attached
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EngineFailure {
    pub message: String,
    /// Captured standard error of the engine, possibly empty
    pub stderr: String,
}

impl EngineFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stderr: String::new(),
        }
    }

    pub fn with_stderr(message: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stderr: stderr.into(),
        }
    }
}

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Probe duration, streams and primary video keyframes
    async fn probe(&self, source: &Path) -> Result<MediaInfo, EngineFailure>;
}

/// Port for segment production and assembly
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Decode and encode `span` of `source` into `output`
    async fn trim_reencode(
        &self,
        source: &Path,
        span: Span,
        target: &ReencodeTarget,
        output: &Path,
    ) -> Result<(), EngineFailure>;

    /// Copy the packets of `span` of `source` into `output` without decoding
    async fn trim_streamcopy(
        &self,
        source: &Path,
        span: Span,
        output: &Path,
    ) -> Result<(), EngineFailure>;

    /// Join `inputs` in order into `output`
    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<(), EngineFailure>;
}
