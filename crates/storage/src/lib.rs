//! File store backends.
//!
//! The secondary store (a mounted file server, usually) is only ever read:
//! walked for document files. Reports are archived through the same
//! [`StorageBackend`] interface, so a backend can also write.

pub mod backend;
pub mod error;
pub mod file;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::file::FileInfo;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
