//! Relative path validation for storage backends.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Resolves a storage path and rejects anything that would leave the storage
/// root.
///
/// `.` and empty components are dropped, `..` pops the previous component,
/// and leading `/` is ignored so that listing records (`/dir/file.pdf`) and
/// relative paths resolve the same way. Null bytes, Windows prefixes and paths
/// that resolve to nothing are [`InvalidPath`](ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use docwatch_storage::validate_path;
///
/// assert_eq!(validate_path("/Procedures/PZ 1.1.1.1.pdf").unwrap(), Path::new("Procedures/PZ 1.1.1.1.pdf"));
/// assert_eq!(validate_path("a/./b/../c.pdf").unwrap(), Path::new("a/c.pdf"));
/// assert!(validate_path("../outside.pdf").is_err());
/// assert!(validate_path("./").is_err());
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let original = path.as_ref();
    let invalid = || ErrorKind::InvalidPath(original.to_path_buf());
    let mut resolved: Vec<&std::ffi::OsStr> = Vec::new();
    for component in original.components() {
        match component {
            Component::Normal(part) if part.as_encoded_bytes().contains(&0) => exn::bail!(invalid()),
            Component::Normal(part) => resolved.push(part),
            Component::CurDir | Component::RootDir => {},
            Component::ParentDir => {
                if resolved.pop().is_none() {
                    exn::bail!(invalid());
                }
            },
            Component::Prefix(_) => exn::bail!(invalid()),
        }
    }
    if resolved.is_empty() {
        exn::bail!(invalid());
    }
    Ok(resolved.into_iter().collect())
}
