//! Read-only storage backend decorator.

use async_trait::async_trait;
use std::path::Path;

use crate::{BackendHandle, StorageBackend, backend::FileInfoStream, error::Result, file::FileInfo};

/// Wraps another backend and silently drops writes, logging an
/// [`info event`](tracing::Event) instead.
///
/// Used for the secondary store, which is never written to.
#[derive(Clone)]
pub struct ReadOnlyBackend {
    inner: BackendHandle,
}
impl ReadOnlyBackend {
    pub fn new(inner: BackendHandle) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl StorageBackend for ReadOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        self.inner.list_stream(prefix)
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        self.inner.exists(path).await
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.inner.read(path).await
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        tracing::info!(backend = self.name(), path = %path.display(), bytes = data.len(), "Skipping write to read-only backend");
        Ok(())
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        self.inner.stat(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::LocalBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_writes_are_dropped_reads_pass_through() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("existing.pdf"), b"%PDF").unwrap();
        let local: BackendHandle = Arc::new(LocalBackend::new("fileserver", temp_dir.path()).unwrap());
        let backend = ReadOnlyBackend::new(local);

        backend.write(Path::new("new.pdf"), b"data").await.unwrap();
        assert!(!temp_dir.path().join("new.pdf").exists());
        assert!(!backend.exists(Path::new("new.pdf")).await.unwrap());

        assert_eq!(backend.read(Path::new("existing.pdf")).await.unwrap(), b"%PDF");
        assert_eq!(backend.list(None).await.unwrap().len(), 1);
        assert_eq!(backend.name(), "fileserver");
    }
}
