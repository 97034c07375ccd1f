//! Media configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Default number of frames sampled from a video.
pub const DEFAULT_MAX_FRAMES: usize = 50;

/// Default audio sample rate expected by the speech classifier.
pub const DEFAULT_SAMPLE_RATE: u32 = 22_050;

/// Media decoding configuration.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Directory for transient artifacts (uploaded video, extracted audio)
    pub scratch_dir: PathBuf,
    /// Maximum frames extracted per video
    pub max_frames: usize,
    /// Target sample rate for extracted audio
    pub sample_rate: u32,
    /// Per-invocation FFmpeg/FFprobe timeout
    pub ffmpeg_timeout: Duration,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir().join("astro"),
            max_frames: DEFAULT_MAX_FRAMES,
            sample_rate: DEFAULT_SAMPLE_RATE,
            ffmpeg_timeout: Duration::from_secs(60),
        }
    }
}

impl MediaConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            scratch_dir: std::env::var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| std::env::temp_dir().join("astro")),
            max_frames: std::env::var("MAX_FRAMES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_FRAMES),
            sample_rate: std::env::var("AUDIO_SAMPLE_RATE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_SAMPLE_RATE),
            ffmpeg_timeout: Duration::from_secs(
                std::env::var("FFMPEG_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        }
    }
}
