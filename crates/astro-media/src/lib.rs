//! FFmpeg CLI wrapper for multimodal input decoding.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with timeouts
//! - FFprobe stream inspection
//! - Frame and audio extraction from an uploaded video
//! - Scratch file management with guaranteed cleanup

pub mod command;
pub mod config;
pub mod decode;
pub mod error;
pub mod probe;
pub mod scratch;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use config::MediaConfig;
pub use decode::{split_png_stream, FfmpegDecoder, MediaDecoder};
pub use error::{MediaError, MediaResult};
pub use probe::{probe_media, MediaInfo};
pub use scratch::{ScratchDir, ScratchFile, ScratchKind};
