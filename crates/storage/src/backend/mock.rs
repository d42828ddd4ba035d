//! In-memory storage backend for testing.

use super::FileInfoStream;
use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use crate::file::FileInfo;
use crate::path::validate as validate_path;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use time::OffsetDateTime;
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Files live in a sorted map behind a [`RwLock`], so listings come back in
/// path order. [`failing()`](Self::failing) turns every listing into an
/// error, to stand in for an unreachable file server.
///
/// # Examples
///
/// ```
/// use docwatch_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([
///     ("QA/PZ nr 1.1.1.1.pdf", b"%PDF"),
/// ]);
/// assert!(backend.exists(Path::new("QA/PZ nr 1.1.1.1.pdf")).await?);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    storage: RwLock<BTreeMap<PathBuf, (OffsetDateTime, Vec<u8>)>>,
    unavailable: AtomicBool,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path fails validation: a broken test setup should not
    /// pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let now = OffsetDateTime::now_utc();
        let storage = files
            .into_iter()
            .map(|(path, data)| {
                let path = path.into();
                let Ok(validated) = validate_path(&path) else {
                    panic!("MockBackend::with_files: invalid path {}", path.display());
                };
                (validated, (now, data.into()))
            })
            .collect();
        Self {
            name: "mock".to_string(),
            storage: RwLock::new(storage),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Make every operation fail with a [`BackendError`](ErrorKind::BackendError).
    pub fn failing(self) -> Self {
        self.set_available(false);
        self
    }

    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            exn::bail!(ErrorKind::BackendError(format!("{} is unavailable", self.name)));
        }
        Ok(())
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        if let Err(error) = self.check_available() {
            return Box::pin(futures::stream::once(async { Err(error) }));
        }
        let validated_prefix = match prefix.map(validate_path).transpose() {
            Ok(pfx) => pfx,
            Err(e) => return Box::pin(futures::stream::once(async { Err(e) })),
        };

        Box::pin(stream! {
            // Snapshot under the read lock, then release it before yielding.
            let entries: Vec<FileInfo> = {
                let guard = self.storage.read().await;
                guard
                    .iter()
                    .filter(|(path, _)| validated_prefix.as_ref().is_none_or(|pfx| path.starts_with(pfx)))
                    .map(|(path, (modified, data))| FileInfo::new(path.clone(), data.len() as u64, *modified))
                    .collect()
            };
            for info in entries {
                yield Ok(info);
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        self.check_available()?;
        let path = validate_path(path)?;
        Ok(self.storage.read().await.contains_key(&path))
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.check_available()?;
        let path = validate_path(path)?;
        let guard = self.storage.read().await;
        match guard.get(&path) {
            Some((_, data)) => Ok(data.clone()),
            None => exn::bail!(ErrorKind::NotFound(path)),
        }
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        self.check_available()?;
        let path = validate_path(path)?;
        self.storage.write().await.insert(path, (OffsetDateTime::now_utc(), data.to_vec()));
        Ok(())
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        self.check_available()?;
        let path = validate_path(path)?;
        let guard = self.storage.read().await;
        match guard.get(&path) {
            Some((modified, data)) => Ok(FileInfo::new(path.clone(), data.len() as u64, *modified)),
            None => exn::bail!(ErrorKind::NotFound(path)),
        }
    }
}
