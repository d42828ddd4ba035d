//! Repository Error Types

use derive_more::{Display, Error};

/// A repository error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The listing source could not be reached or refused the request.
    #[display("repository unavailable: {_0}")]
    Unavailable(#[error(not(source))] String),
    /// The listing source answered with something that could not be parsed.
    #[display("malformed repository listing: {_0}")]
    MalformedListing(#[error(not(source))] String),
    /// No client binary could be found to talk to the repository.
    #[display("repository client not found: {_0}")]
    ClientNotFound(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }

    /// The repository could not be listed this time round. Callers skip the
    /// pass instead of failing.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::MalformedListing(_))
    }
}
