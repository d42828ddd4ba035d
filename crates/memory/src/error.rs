//! Memory Error Types

use derive_more::{Display, Error};

/// A memory error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for memory operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    #[display("database migration error")]
    Migration,
    /// Nothing has been stored under the key yet. A normal condition on the
    /// very first run.
    #[display("no snapshot stored under '{_0}'")]
    Empty(#[error(not(source))] String),
    /// Serialization/deserialization error.
    #[display("invalid memory data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }
}
