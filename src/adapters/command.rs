//! Runner for external engine commands with optional timeout.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::ports::EngineFailure;

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for one invocation of ffmpeg or ffprobe.
///
/// ```no_run
/// # use smart_trim::adapters::command::ToolCommand;
/// # use std::path::PathBuf;
/// # async fn example() -> Result<(), smart_trim::ports::EngineFailure> {
/// let output = ToolCommand::new(PathBuf::from("ffprobe"))
///     .args(["-v", "error", "-show_format", "-print_format", "json"])
///     .arg("/path/to/video.mkv")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Option<Duration>,
}

impl ToolCommand {
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Paths are passed through as-is, without any UTF-8 conversion.
    pub fn arg(&mut self, s: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(s.as_ref().to_os_string());
        self
    }

    pub fn args(&mut self, iter: impl IntoIterator<Item = impl AsRef<OsStr>>) -> &mut Self {
        self.args
            .extend(iter.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Kill the process if it runs longer than `d`. `None` waits forever.
    pub fn timeout(&mut self, d: Option<Duration>) -> &mut Self {
        self.timeout = d;
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// Spawn failures, I/O errors, timeouts and non-zero exits all come back
    /// as [`EngineFailure`]; the latter two carry the captured stderr.
    pub async fn execute(&self) -> Result<ToolOutput, EngineFailure> {
        let program_name = self.program_name();
        debug!(
            "Running {} {}",
            self.program.display(),
            self.args
                .iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .map_err(|e| EngineFailure::new(format!("failed to spawn {}: {}", program_name, e)))?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                // Dropping the future drops the child, which kills it.
                Err(_elapsed) => {
                    return Err(EngineFailure::new(format!(
                        "{} timed out after {:?}",
                        program_name, limit
                    )))
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(|e| {
            EngineFailure::new(format!("I/O error waiting for {}: {}", program_name, e))
        })?;

        let tool_output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            return Err(EngineFailure::with_stderr(
                format!("{} exited with {}", program_name, output.status),
                tool_output.stderr,
            ));
        }

        Ok(tool_output)
    }
}
