//! Extension-filtered storage backend decorator.

use crate::backend::FileInfoStream;
use crate::error::ErrorKind;
use crate::{BackendHandle, StorageBackend, error::Result, file::FileInfo};
use async_trait::async_trait;
use futures::StreamExt;
use std::path::Path;

/// Restricts another backend to files with one of a set of extensions
/// (compared case-insensitively, without the leading dot).
///
/// Listings silently drop everything else; direct operations on a filtered
/// path return [`FilteredPath`](ErrorKind::FilteredPath).
#[derive(Clone)]
pub struct DocumentsOnlyBackend {
    inner: BackendHandle,
    extensions: Vec<String>,
}
impl DocumentsOnlyBackend {
    pub fn new(inner: BackendHandle, extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.into().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        Self { inner, extensions }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn is_document_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
    }

    fn check(&self, path: &Path) -> Result<()> {
        if !self.is_document_path(path) {
            exn::bail!(ErrorKind::FilteredPath(path.to_path_buf()));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for DocumentsOnlyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        Box::pin(self.inner.list_stream(prefix).filter(move |item| {
            std::future::ready(match item {
                Ok(info) => self.is_document_path(&info.path),
                Err(_) => true,
            })
        }))
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        self.check(path)?;
        self.inner.exists(path).await
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.check(path)?;
        self.inner.read(path).await
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        self.check(path)?;
        self.inner.write(path, data).await
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        self.check(path)?;
        self.inner.stat(path).await
    }
}
