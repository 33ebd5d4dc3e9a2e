// Adapters - External system implementations

pub mod command;
pub mod exec_ffmpeg;
pub mod probe_ffprobe;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::FFmpegAdapter;
pub use probe_ffprobe::FFprobeAdapter;
pub use toml_config::Settings;
