use bytes::Bytes;
use futures::Stream;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::{self, File};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use crate::humanize::ByteSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    FullAudio,
    TrimmedAudio,
}

/// A live, non-empty audio file on ephemeral storage.
///
/// Whoever holds the value owns the file. It is deleted exactly once: by
/// [`Artifact::release`], or by `Drop` on any path that never released it
/// (errors, early returns, a dropped request future).
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
    size_bytes: u64,
    kind: ArtifactKind,
    live: bool,
}

impl Artifact {
    /// Take ownership of `path` if it holds a non-empty file.
    ///
    /// An empty file is deleted and `None` returned; a missing file is `None`.
    pub async fn adopt(path: PathBuf, kind: ArtifactKind) -> io::Result<Option<Self>> {
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(Some(Self {
                path,
                size_bytes: meta.len(),
                kind,
                live: true,
            })),
            Ok(_) => {
                remove_if_exists(&path).await?;
                Ok(None)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Delete the backing file now.
    pub fn release(mut self) -> io::Result<()> {
        self.live = false;
        unlink(&self.path)?;
        debug!(kind = ?self.kind, "Artifact released");
        Ok(())
    }

    /// Stream the file as an HTTP body; the stream owns the artifact and
    /// releases it when it finishes or is dropped.
    pub async fn into_body_stream(self) -> io::Result<ArtifactStream> {
        let file = File::open(&self.path).await?;
        Ok(ArtifactStream {
            inner: ReaderStream::new(file),
            artifact: Some(self),
        })
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        match unlink(&self.path) {
            Ok(()) => debug!(kind = ?self.kind, "Artifact released on drop"),
            Err(e) => warn!(kind = ?self.kind, error = %e, "Failed to release artifact"),
        }
    }
}

/// Response body over an artifact's bytes.
pub struct ArtifactStream {
    inner: ReaderStream<File>,
    artifact: Option<Artifact>,
}

impl Stream for ArtifactStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;
        let poll = Pin::new(&mut this.inner).poll_next(cx);

        if let Poll::Ready(None) = poll {
            if let Some(artifact) = this.artifact.take() {
                let size = ByteSize(artifact.size_bytes());
                let kind = artifact.kind();
                match artifact.release() {
                    Ok(()) => info!(?kind, size = %size, "Audio sent successfully"),
                    Err(e) => warn!(?kind, error = %e, "Audio sent, cleanup failed"),
                }
            }
        }

        poll
    }
}

impl Drop for ArtifactStream {
    fn drop(&mut self) {
        if self.artifact.is_some() {
            warn!("Response body dropped before completion, releasing artifact");
        }
    }
}

/// Delete `path`, treating an already-missing file as success.
pub async fn remove_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Synchronous delete for `Drop` impls and `poll_next`, which cannot await.
/// Unlinking only touches the directory entry, not the file data.
pub(super) fn unlink(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tempfile::TempDir;

    async fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, bytes).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_adopt_non_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.mp3", b"audio").await;

        let artifact = Artifact::adopt(path.clone(), ArtifactKind::FullAudio)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(artifact.size_bytes(), 5);
        assert_eq!(artifact.kind(), ArtifactKind::FullAudio);

        artifact.release().unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_adopt_empty_file_deletes_it() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "empty.mp3", b"").await;

        let adopted = Artifact::adopt(path.clone(), ArtifactKind::FullAudio).await.unwrap();
        assert!(adopted.is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_adopt_missing_file() {
        let dir = TempDir::new().unwrap();
        let adopted = Artifact::adopt(dir.path().join("nope.mp3"), ArtifactKind::TrimmedAudio)
            .await
            .unwrap();
        assert!(adopted.is_none());
    }

    #[tokio::test]
    async fn test_drop_releases() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.mp3", b"audio").await;

        {
            let _artifact = Artifact::adopt(path.clone(), ArtifactKind::FullAudio)
                .await
                .unwrap()
                .unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_stream_releases_after_completion() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.mp3", b"some audio bytes").await;
        let artifact = Artifact::adopt(path.clone(), ArtifactKind::TrimmedAudio)
            .await
            .unwrap()
            .unwrap();

        let mut stream = artifact.into_body_stream().await.unwrap();
        let mut body = Vec::new();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk.unwrap());
        }

        assert_eq!(body, b"some audio bytes");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_stream_releases_when_dropped_early() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.mp3", b"some audio bytes").await;
        let artifact = Artifact::adopt(path.clone(), ArtifactKind::FullAudio)
            .await
            .unwrap()
            .unwrap();

        let stream = artifact.into_body_stream().await.unwrap();
        assert!(path.exists());
        drop(stream);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_remove_if_exists() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.mp3", b"x").await;

        assert!(remove_if_exists(&path).await.unwrap());
        assert!(!remove_if_exists(&path).await.unwrap());
    }
}
