//! Frame and audio extraction from an uploaded video.

use std::path::Path;

use async_trait::async_trait;
use astro_models::{AudioBuffer, EncodedFrame};
use tracing::{debug, info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_media;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Decodes the two signal sources out of a video file.
#[async_trait]
pub trait MediaDecoder: Send + Sync {
    /// Up to `max_frames` PNG-encoded stills in presentation order. A video
    /// without a video stream yields an empty list.
    async fn extract_frames(&self, video: &Path) -> MediaResult<Vec<EncodedFrame>>;

    /// Mono f32 PCM at the configured rate. `output` is the scratch path
    /// the raw samples are written to before loading.
    async fn extract_audio(&self, video: &Path, output: &Path) -> MediaResult<AudioBuffer>;
}

/// Production decoder backed by the FFmpeg CLI.
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    runner: FfmpegRunner,
    max_frames: usize,
    sample_rate: u32,
}

impl FfmpegDecoder {
    pub fn new(config: &MediaConfig) -> Self {
        Self {
            runner: FfmpegRunner::new().with_timeout(config.ffmpeg_timeout),
            max_frames: config.max_frames,
            sample_rate: config.sample_rate,
        }
    }
}

#[async_trait]
impl MediaDecoder for FfmpegDecoder {
    async fn extract_frames(&self, video: &Path) -> MediaResult<Vec<EncodedFrame>> {
        let info = probe_media(video, self.runner.timeout()).await?;
        if !info.has_video {
            info!(path = %video.display(), "No video stream, skipping frame extraction");
            return Ok(Vec::new());
        }

        let cmd = FfmpegCommand::to_stdout(video)
            .no_audio()
            .max_frames(self.max_frames)
            .format("image2pipe")
            .video_codec("png");

        let stdout = self.runner.output(&cmd).await?;
        let frames: Vec<EncodedFrame> = split_png_stream(&stdout)?
            .into_iter()
            .take(self.max_frames)
            .enumerate()
            .map(|(i, data)| EncodedFrame::new(i, data))
            .collect();

        debug!(
            path = %video.display(),
            frames = frames.len(),
            bytes = stdout.len(),
            "Frame extraction complete"
        );

        Ok(frames)
    }

    async fn extract_audio(&self, video: &Path, output: &Path) -> MediaResult<AudioBuffer> {
        let info = probe_media(video, self.runner.timeout()).await?;
        if !info.has_audio {
            return Err(MediaError::NoAudioStream(video.to_path_buf()));
        }

        let cmd = FfmpegCommand::new(video, output)
            .no_video()
            .mono_audio(self.sample_rate)
            .format("f32le");

        self.runner.run(&cmd).await?;

        let samples = load_f32le(output).await?;
        if samples.is_empty() {
            return Err(MediaError::EmptyAudio);
        }

        debug!(
            path = %video.display(),
            samples = samples.len(),
            sample_rate = self.sample_rate,
            "Audio extraction complete"
        );

        Ok(AudioBuffer::new(samples, self.sample_rate))
    }
}

/// Load raw f32le samples from a file.
async fn load_f32le(path: &Path) -> MediaResult<Vec<f32>> {
    let bytes = tokio::fs::read(path).await?;
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

/// Split concatenated PNG images (as produced by `image2pipe`) into one
/// buffer per image.
///
/// A truncated trailing image is dropped with a warning. Data that does not
/// start with a PNG signature is rejected.
pub fn split_png_stream(data: &[u8]) -> MediaResult<Vec<Vec<u8>>> {
    let mut images = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        let start = pos;
        if data.len() - pos < PNG_SIGNATURE.len() || data[pos..pos + 8] != PNG_SIGNATURE {
            if images.is_empty() {
                return Err(MediaError::invalid_video("frame stream is not PNG"));
            }
            warn!(offset = pos, "Trailing bytes after last PNG frame, ignoring");
            break;
        }
        pos += PNG_SIGNATURE.len();

        let mut complete = false;
        // length(4) + type(4) + data(length) + crc(4)
        while pos + 8 <= data.len() {
            let len = u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
                as usize;
            let chunk_type = &data[pos + 4..pos + 8];
            let end = pos + 12 + len;
            if end > data.len() {
                break;
            }
            pos = end;
            if chunk_type == b"IEND" {
                complete = true;
                break;
            }
        }

        if !complete {
            warn!(offset = start, "Truncated PNG frame at end of stream, dropping");
            break;
        }
        images.push(data[start..pos].to_vec());
    }

    Ok(images)
}
