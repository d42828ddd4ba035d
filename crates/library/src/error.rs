//! Library Error Types
//!
//! Errors from the crates this one drives are raised into the kinds below,
//! so callers only need to tell an unreachable source (skip this pass) apart
//! from everything else (stop).

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("repository unavailable")]
    RepositoryUnavailable,
    #[display("secondary store unavailable")]
    SecondaryUnavailable,
    /// The repository answered, but the pass cannot use the answer.
    #[display("issue with the repository")]
    Repository,
    #[display("issue with the snapshot memory")]
    Memory,
    #[display("could not render the report")]
    Report,
    #[display("could not deliver the report")]
    Notify,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        self.is_source_unavailable()
    }

    /// One of the two sources could not be read; the pass was abandoned
    /// before anything was compared, notified or stored.
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, Self::RepositoryUnavailable | Self::SecondaryUnavailable)
    }
}
