//! Report Error Types

use derive_more::{Display, Error};

/// A report or notification error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The report template did not compile or failed to render.
    #[display("issue with the report template")]
    Template,
    /// Template was not loadable (either file or builtin).
    #[display("template not found: {_0}")]
    AssetNotFound(#[error(not(source))] String),
    #[display("sendmail not detected on your system")]
    SendmailNotFound,
    /// Sendmail exited with a non-zero exit code, or was killed by a signal
    /// (no code).
    #[display("sendmail exited unsuccessfully: {}", _0.map_or("killed by signal".to_string(), |c| format!("code {c}")))]
    SendmailFailed(#[error(not(source))] Option<i32>),
    /// A message header would need characters that cannot appear in it.
    #[display("invalid message header: {_0}")]
    InvalidHeader(#[error(not(source))] &'static str),
    /// The archive backend refused the report.
    #[display("could not archive report")]
    Archive,
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SendmailFailed(_) | Self::Archive | Self::Io)
    }
}
