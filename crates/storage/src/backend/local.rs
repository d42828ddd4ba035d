//! Local filesystem storage backend.
//!
//! Files are read from and written to a directory on the local filesystem
//! (including network shares mounted into it) via `tokio::fs`.

use crate::backend::FileInfoStream;
use crate::error::ErrorKind;
use crate::{FileInfo, StorageBackend, error::Result, path::validate as validate_path};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};

enum WalkEntry {
    File(FileInfo),
    Descend(PathBuf),
    Skip,
}

/// Local filesystem storage backend.
///
/// All paths are relative to the configured root directory.
///
/// # Examples
///
/// ```no_run
/// use docwatch_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("fileserver", "/mnt/fileserver/phocadownload")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) if `root` is not
    /// absolute or exists but is not a directory. A missing root is not an
    /// error here: it is created by the first write, but listing it fails
    /// with [`NotFound`](ErrorKind::NotFound).
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() || (root.exists() && !root.is_dir()) {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        Ok(Self { name: name.into(), root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    fn relative_path(&self, absolute: impl AsRef<Path>) -> Result<PathBuf> {
        let absolute = absolute.as_ref();
        let relative = absolute.strip_prefix(&self.root).or_raise(|| {
            ErrorKind::BackendError(format!("path `{}` is not within root `{}`", absolute.display(), self.root.display()))
        })?;
        validate_path(relative)
    }

    fn file_info(path: &Path, metadata: &Metadata) -> Result<FileInfo> {
        let modified = metadata.modified().map_err(ErrorKind::Io)?;
        Ok(FileInfo::new(path, metadata.len(), modified))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Classifies one directory entry so the stream body below only has to
    /// match, never `?`.
    async fn process_entry(&self, entry: DirEntry, prefix: Option<&Path>) -> Result<WalkEntry> {
        let path = entry.path();
        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            // Most likely a broken symlink.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(WalkEntry::Skip),
            Err(e) => exn::bail!(Self::map_io_error(e, &path)),
        };
        let relative = self.relative_path(&path)?;
        if metadata.is_dir() {
            // Keep descending towards the prefix, but not away from it.
            return match prefix {
                Some(pfx) if !relative.starts_with(pfx) && !pfx.starts_with(&relative) => Ok(WalkEntry::Skip),
                _ => Ok(WalkEntry::Descend(path)),
            };
        }
        if let Some(pfx) = prefix
            && !relative.starts_with(pfx)
        {
            return Ok(WalkEntry::Skip);
        }
        if metadata.is_file() {
            return Ok(WalkEntry::File(Self::file_info(&relative, &metadata)?));
        }
        Ok(WalkEntry::Skip)
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    /// Depth-first walk from the root. Directories are visited in the order
    /// the operating system returns them; callers needing a stable order sort
    /// the results.
    ///
    /// A missing root (an unmounted share) is an error; a missing directory
    /// below it lists as empty.
    fn list_stream<'a>(&'a self, prefix: Option<&'a Path>) -> FileInfoStream<'a> {
        let validated_prefix = match prefix.map(validate_path).transpose() {
            Ok(pfx) => pfx,
            Err(e) => return Box::pin(futures::stream::once(async { Result::Err(e) })),
        };
        let mut stack = vec![self.root.clone()];

        Box::pin(stream! {
            'dirs: while let Some(current) = stack.pop() {
                let mut entries = match fs::read_dir(&current).await {
                    Ok(entries) => entries,
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound && current != self.root => continue 'dirs,
                    Err(err) => {
                        yield Err(exn::Exn::from(Self::map_io_error(err, &current)));
                        continue 'dirs;
                    }
                };
                'entries: loop {
                    let entry = match entries.next_entry().await {
                        Ok(Some(entry)) => entry,
                        Ok(None) => break 'entries,
                        Err(e) => {
                            yield Err(exn::Exn::from(Self::map_io_error(e, &current)));
                            continue 'entries;
                        },
                    };
                    match self.process_entry(entry, validated_prefix.as_deref()).await {
                        Ok(WalkEntry::File(f)) => yield Ok(f),
                        Ok(WalkEntry::Descend(d)) => stack.push(d),
                        Ok(WalkEntry::Skip) => {},
                        Err(e) => yield Err(e),
                    };
                }
            }
        })
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::try_exists(&abs_path).await.map_err(ErrorKind::Io)?)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::read(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        if let Some(parent) = abs_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, path))?;
        }
        Ok(fs::write(&abs_path, data).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let abs_path = self.absolute_path(path)?;
        let metadata = fs::metadata(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?;
        Self::file_info(&validate_path(path)?, &metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> (tempfile::TempDir, LocalBackend) {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("fileserver", temp_dir.path()).unwrap();
        (temp_dir, backend)
    }

    #[test]
    fn test_new_requires_absolute_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new("fileserver", temp_dir.path()).is_ok());
        assert!(LocalBackend::new("fileserver", temp_dir.path().join("not-yet-created")).is_ok());
        assert!(LocalBackend::new("fileserver", "relative/path").is_err());
        let file = temp_dir.path().join("file.pdf");
        std::fs::write(&file, b"%PDF").unwrap();
        assert!(LocalBackend::new("fileserver", &file).is_err());
    }

    #[test]
    fn test_relative_path() {
        let (temp_dir, backend) = backend();
        let abs = temp_dir.path().join("QA/report 1.1.1.1.pdf");
        assert_eq!(backend.relative_path(&abs).unwrap(), Path::new("QA/report 1.1.1.1.pdf"));
        assert!(backend.relative_path("/somewhere/else.pdf").is_err());
    }

    #[tokio::test]
    async fn test_write_read_and_stat() {
        let (_temp_dir, backend) = backend();
        backend.write(Path::new("QA/Procedures/PZ 1.1.1.1.pdf"), b"%PDF-1.7").await.unwrap();
        assert_eq!(backend.read(Path::new("QA/Procedures/PZ 1.1.1.1.pdf")).await.unwrap(), b"%PDF-1.7");
        let info = backend.stat(Path::new("QA/Procedures/PZ 1.1.1.1.pdf")).await.unwrap();
        assert_eq!(info.path, Path::new("QA/Procedures/PZ 1.1.1.1.pdf"));
        assert_eq!(info.size, 8);
    }

    #[tokio::test]
    async fn test_exists() {
        let (_temp_dir, backend) = backend();
        assert!(!backend.exists(Path::new("report.pdf")).await.unwrap());
        backend.write(Path::new("report.pdf"), b"data").await.unwrap();
        assert!(backend.exists(Path::new("report.pdf")).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing() {
        let (_temp_dir, backend) = backend();
        let err = backend.read(Path::new("missing.pdf")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_walks_the_whole_tree() {
        let (_temp_dir, backend) = backend();
        backend.write(Path::new("root.pdf"), b"1").await.unwrap();
        backend.write(Path::new("QA/a.pdf"), b"2").await.unwrap();
        backend.write(Path::new("QA/Procedures/b.pdf"), b"3").await.unwrap();
        backend.write(Path::new("HR/deep/er/c.txt"), b"4").await.unwrap();
        let mut paths: Vec<_> = backend.list(None).await.unwrap().into_iter().map(|f| f.path).collect();
        paths.sort();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("HR/deep/er/c.txt"),
                PathBuf::from("QA/Procedures/b.pdf"),
                PathBuf::from("QA/a.pdf"),
                PathBuf::from("root.pdf"),
            ]
        );
    }

    #[tokio::test]
    async fn test_list_with_prefix_is_component_based() {
        let (_temp_dir, backend) = backend();
        backend.write(Path::new("QA/Sub/file.pdf"), b"1").await.unwrap();
        backend.write(Path::new("QA/Subdir/file.pdf"), b"2").await.unwrap();
        backend.write(Path::new("QA/Subfile.pdf"), b"3").await.unwrap();
        let files = backend.list(Some(Path::new("QA/Sub"))).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, Path::new("QA/Sub/file.pdf"));
    }

    #[tokio::test]
    async fn test_list_missing_root_fails() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("fileserver", temp_dir.path().join("unmounted")).unwrap();
        let err = backend.list(None).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(path) if path.ends_with("unmounted")));
        assert!(backend.list(Some(Path::new("QA"))).await.is_err());
    }

    #[tokio::test]
    async fn test_list_missing_prefix_is_empty() {
        let (_temp_dir, backend) = backend();
        backend.write(Path::new("QA/a.pdf"), b"1").await.unwrap();
        assert!(backend.list(Some(Path::new("nonexistent"))).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_path_security() {
        let (_temp_dir, backend) = backend();
        assert!(backend.read(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.write(Path::new("QA/../../escape.pdf"), b"data").await.is_err());
        assert!(backend.list(Some(Path::new("../"))).await.is_err());
    }
}
