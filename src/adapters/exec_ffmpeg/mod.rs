//! FFmpeg execution adapter
//!
//! Produces segments and joins them by invoking the `ffmpeg` binary.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::adapters::command::ToolCommand;
use crate::domain::model::{ReencodeTarget, Span};
use crate::ports::{EngineFailure, ExecutePort};

/// FFmpeg-based execution adapter
#[derive(Debug, Clone)]
pub struct FFmpegAdapter {
    ffmpeg_path: PathBuf,
    timeout: Option<Duration>,
}

impl FFmpegAdapter {
    pub fn new(ffmpeg_path: PathBuf, timeout: Option<Duration>) -> Self {
        Self {
            ffmpeg_path,
            timeout,
        }
    }

    async fn run(&self, args: Vec<OsString>) -> Result<(), EngineFailure> {
        let mut cmd = ToolCommand::new(self.ffmpeg_path.clone());
        cmd.args(args).timeout(self.timeout);
        cmd.execute().await.map(|_| ())
    }
}

const COMMON_ARGS: &[&str] = &["-hide_banner", "-nostdin", "-v", "error", "-y"];

fn common_args() -> Vec<OsString> {
    COMMON_ARGS.iter().map(OsString::from).collect()
}

/// Seek, limit and stream selection shared by both segment kinds.
/// Both streams get the same trim so A/V stay in sync across boundaries.
fn trim_input_args(source: &Path, span: Span) -> Vec<OsString> {
    let mut args = common_args();
    args.push("-ss".into());
    args.push(span.start.to_engine_arg().into());
    args.push("-i".into());
    args.push(source.into());
    args.push("-t".into());
    args.push(span.duration().to_engine_arg().into());
    for flag in ["-map", "0:v:0", "-map", "0:a:0?", "-sn", "-dn"] {
        args.push(flag.into());
    }
    args
}

/// Arguments for a decode/encode pass over `span`
pub fn reencode_args(
    source: &Path,
    span: Span,
    target: &ReencodeTarget,
    output: &Path,
) -> Vec<OsString> {
    let mut args = trim_input_args(source, span);

    args.push("-c:v".into());
    args.push(target.video_codec.as_str().into());
    if let Some(preset) = &target.preset {
        args.push("-preset".into());
        args.push(preset.as_str().into());
    }
    if let Some(crf) = target.crf {
        args.push("-crf".into());
        args.push(crf.to_string().into());
    }
    if let Some(audio) = &target.audio_codec {
        args.push("-c:a".into());
        args.push(audio.as_str().into());
    }

    args.push("-avoid_negative_ts".into());
    args.push("make_zero".into());
    args.push(output.into());
    args
}

/// Arguments for a packet copy of `span`
pub fn streamcopy_args(source: &Path, span: Span, output: &Path) -> Vec<OsString> {
    let mut args = trim_input_args(source, span);
    for flag in ["-c", "copy", "-avoid_negative_ts", "make_zero"] {
        args.push(flag.into());
    }
    args.push(output.into());
    args
}

/// Arguments for the concat demuxer reading `list`
pub fn concat_args(list: &Path, output: &Path) -> Vec<OsString> {
    let mut args = common_args();
    for flag in ["-f", "concat", "-safe", "0", "-i"] {
        args.push(flag.into());
    }
    args.push(list.into());
    for flag in ["-map", "0", "-c", "copy", "-avoid_negative_ts", "make_non_negative"] {
        args.push(flag.into());
    }
    args.push(output.into());
    args
}

/// Concat demuxer list body, one quoted `file` line per input.
/// Paths are written byte for byte.
pub fn concat_list(inputs: &[PathBuf]) -> Result<Vec<u8>, EngineFailure> {
    let mut list = Vec::new();
    for input in inputs {
        list.extend_from_slice(b"file '");
        for &byte in path_bytes(input)? {
            if byte == b'\'' {
                list.extend_from_slice(br"'\''");
            } else {
                list.push(byte);
            }
        }
        list.extend_from_slice(b"'\n");
    }
    Ok(list)
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> Result<&[u8], EngineFailure> {
    use std::os::unix::ffi::OsStrExt;
    Ok(path.as_os_str().as_bytes())
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Result<&[u8], EngineFailure> {
    path.to_str().map(str::as_bytes).ok_or_else(|| {
        EngineFailure::new(format!(
            "segment path is not valid UTF-8: {}",
            path.display()
        ))
    })
}

#[async_trait]
impl ExecutePort for FFmpegAdapter {
    async fn trim_reencode(
        &self,
        source: &Path,
        span: Span,
        target: &ReencodeTarget,
        output: &Path,
    ) -> Result<(), EngineFailure> {
        self.run(reencode_args(source, span, target, output)).await
    }

    async fn trim_streamcopy(
        &self,
        source: &Path,
        span: Span,
        output: &Path,
    ) -> Result<(), EngineFailure> {
        self.run(streamcopy_args(source, span, output)).await
    }

    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<(), EngineFailure> {
        let first = inputs
            .first()
            .ok_or_else(|| EngineFailure::new("no segments to concatenate"))?;
        let list_dir = first
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        // Lives next to the segments and is removed when dropped.
        let mut list_file = tempfile::Builder::new()
            .prefix("concat-")
            .suffix(".txt")
            .tempfile_in(list_dir)
            .map_err(|e| EngineFailure::new(format!("failed to create concat list: {}", e)))?;
        let body = concat_list(inputs)?;
        list_file
            .write_all(&body)
            .and_then(|_| list_file.flush())
            .map_err(|e| EngineFailure::new(format!("failed to write concat list: {}", e)))?;
        debug!("Concat list at {}", list_file.path().display());

        self.run(concat_args(list_file.path(), output)).await
    }
}
