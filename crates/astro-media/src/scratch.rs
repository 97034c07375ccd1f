//! Request-scoped scratch files.
//!
//! Every uploaded video and every extracted audio track lives in a uniquely
//! named file under one scratch directory. The [`ScratchFile`] guard removes
//! its file exactly once, whichever way the owning task exits. Removal
//! failures are logged and counted, never returned.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// What a scratch file holds. Decides the name prefix and extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScratchKind {
    Video,
    Audio,
}

impl ScratchKind {
    fn prefix(&self) -> &'static str {
        match self {
            ScratchKind::Video => "video-",
            ScratchKind::Audio => "audio-",
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            ScratchKind::Video => ".webm",
            ScratchKind::Audio => ".pcm",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScratchKind::Video => "video",
            ScratchKind::Audio => "audio",
        }
    }
}

/// Root directory for scratch files.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    /// Use `root` as the scratch directory, creating it if needed.
    pub fn create(root: impl Into<PathBuf>) -> MediaResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reserve a new, empty, uniquely named file.
    pub fn allocate(&self, kind: ScratchKind) -> MediaResult<ScratchFile> {
        let path = tempfile::Builder::new()
            .prefix(kind.prefix())
            .suffix(kind.suffix())
            .tempfile_in(&self.root)?
            .into_temp_path();

        debug!(kind = kind.as_str(), path = %path.display(), "Allocated scratch file");

        Ok(ScratchFile {
            kind,
            path: Some(path),
        })
    }

    /// Write `bytes` to a new scratch file and hand back its guard.
    ///
    /// The guard is created before the write, so a failed write still
    /// removes the file.
    pub async fn materialize(&self, kind: ScratchKind, bytes: &[u8]) -> MediaResult<ScratchFile> {
        let file = self.allocate(kind)?;
        tokio::fs::write(file.path(), bytes).await?;
        Ok(file)
    }

    /// Run `writer` against a fresh scratch path and remove the file
    /// afterwards, on success and on error alike.
    pub async fn with_scratch_file<F, Fut, T, E>(&self, kind: ScratchKind, writer: F) -> Result<T, E>
    where
        F: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<MediaError>,
    {
        let file = self.allocate(kind)?;
        let result = writer(file.path().to_path_buf()).await;
        file.release();
        result
    }
}

/// RAII guard for one scratch file.
#[derive(Debug)]
pub struct ScratchFile {
    kind: ScratchKind,
    path: Option<TempPath>,
}

impl ScratchFile {
    pub fn kind(&self) -> ScratchKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        match &self.path {
            Some(path) => &**path,
            None => Path::new(""),
        }
    }

    /// Remove the file now.
    pub fn release(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        let display_path = path.display().to_string();

        match path.close() {
            Ok(()) => debug!(kind = self.kind.as_str(), path = %display_path, "Removed scratch file"),
            // A writer is allowed to consume the file.
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(kind = self.kind.as_str(), path = %display_path, "Scratch file already gone")
            }
            Err(e) => {
                metrics::counter!("astro_scratch_cleanup_failures_total").increment(1);
                warn!(
                    kind = self.kind.as_str(),
                    path = %display_path,
                    error = %e,
                    "Failed to remove scratch file"
                );
            }
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        self.remove();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_allocate_names_by_kind() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(tmp.path()).unwrap();

        let video = scratch.allocate(ScratchKind::Video).unwrap();
        let audio = scratch.allocate(ScratchKind::Audio).unwrap();

        let video_name = video.path().file_name().unwrap().to_string_lossy().to_string();
        let audio_name = audio.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(video_name.starts_with("video-") && video_name.ends_with(".webm"));
        assert!(audio_name.starts_with("audio-") && audio_name.ends_with(".pcm"));
        assert_eq!(entries(tmp.path()), 2);

        drop(video);
        audio.release();
        assert_eq!(entries(tmp.path()), 0);
    }

    #[test]
    fn test_allocations_never_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(tmp.path()).unwrap();

        let files: Vec<_> = (0..32)
            .map(|_| scratch.allocate(ScratchKind::Audio).unwrap())
            .collect();
        let mut paths: Vec<_> = files.iter().map(|f| f.path().to_path_buf()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 32);
    }

    #[tokio::test]
    async fn test_materialize_writes_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(tmp.path()).unwrap();

        let file = scratch.materialize(ScratchKind::Video, b"webm").await.unwrap();
        assert_eq!(std::fs::read(file.path()).unwrap(), b"webm");
        drop(file);
        assert_eq!(entries(tmp.path()), 0);
    }

    #[tokio::test]
    async fn test_with_scratch_file_removes_on_error() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(tmp.path()).unwrap();

        let result: MediaResult<()> = scratch
            .with_scratch_file(ScratchKind::Audio, |path| async move {
                tokio::fs::write(&path, b"pcm").await?;
                Err(MediaError::EmptyAudio)
            })
            .await;

        assert!(matches!(result, Err(MediaError::EmptyAudio)));
        assert_eq!(entries(tmp.path()), 0);
    }

    #[tokio::test]
    async fn test_with_scratch_file_tolerates_consumed_file() {
        let tmp = tempfile::tempdir().unwrap();
        let scratch = ScratchDir::create(tmp.path()).unwrap();

        let value: MediaResult<u32> = scratch
            .with_scratch_file(ScratchKind::Audio, |path| async move {
                tokio::fs::remove_file(&path).await?;
                Ok(7)
            })
            .await;

        assert_eq!(value.unwrap(), 7);
        assert_eq!(entries(tmp.path()), 0);
    }
}
