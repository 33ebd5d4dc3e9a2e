//! Temporary files owned by a single trim

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tempfile::{TempDir, TempPath};
use tracing::{debug, warn};

use crate::domain::model::SegmentKind;
use crate::error::{TrimError, TrimResult};

/// Uniquely named directory holding the segment files of one invocation.
///
/// The directory and everything in it is removed when the workspace is
/// dropped, whether the trim succeeded or not.
#[derive(Debug)]
pub struct TrimWorkspace {
    dir: TempDir,
    segment_format: String,
}

impl TrimWorkspace {
    /// Create the directory under `root`, or the OS temp dir when `None`
    pub fn create(root: Option<&Path>, segment_format: &str) -> TrimResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("smart-trim-");
        let dir = match root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }?;

        debug!("Created workspace {}", dir.path().display());
        Ok(Self {
            dir,
            segment_format: segment_format.to_string(),
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `NN_<kind>.<format>`, numbered from zero in plan order
    pub fn segment_path(&self, position: usize, kind: SegmentKind) -> PathBuf {
        self.dir.path().join(format!(
            "{:02}_{}.{}",
            position,
            kind.slug(),
            self.segment_format
        ))
    }

    /// Remove the workspace now, logging instead of failing if that is not possible
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            warn!("Failed to remove workspace {}: {}", path.display(), e);
        }
    }
}

/// Temporary file next to the final output that replaces it on commit.
///
/// Dropping an uncommitted stage deletes the file, so the output path is never
/// left holding a partial result.
#[derive(Debug)]
pub struct StagedOutput {
    temp: TempPath,
    target: PathBuf,
}

impl StagedOutput {
    /// Reserve a staging file in `output`'s directory with `output`'s extension
    pub fn create(output: &Path) -> TrimResult<Self> {
        let dir = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut suffix = OsString::new();
        if let Some(ext) = output.extension() {
            suffix.push(".");
            suffix.push(ext);
        }

        let mut builder = tempfile::Builder::new();
        builder.prefix(".smart-trim-").suffix(&suffix);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Same mode as a plain file create; the umask still applies.
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let temp = builder.tempfile_in(dir)?.into_temp_path();

        debug!("Staging output at {}", temp.display());
        Ok(Self {
            temp,
            target: output.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.temp
    }

    /// Move the staged file onto the output path
    pub fn commit(self) -> TrimResult<PathBuf> {
        self.temp
            .persist(&self.target)
            .map_err(|e| TrimError::IoError(e.error))?;
        Ok(self.target)
    }
}
