//! Document Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An identity error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for identity operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The filename carries no `a.b.c.d` symbol. Not a failure: callers are
    /// expected to drop the file and carry on.
    #[display("not a document: {_0}")]
    NotADocument(#[error(not(source))] String),
    /// A symbol was found but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The field that failed to parse.
        field: &'static str,
        /// Details about the parsing failure.
        value: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A filename either names a document or it doesn't.
        false
    }

    /// Returns `true` if the error only signals that a file should be skipped.
    pub fn is_not_a_document(&self) -> bool {
        matches!(self, Self::NotADocument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::NotADocument("notes.pdf".to_string()).to_string(), "not a document: notes.pdf");
        assert_eq!(
            ErrorKind::ParseError { field: "symbol", value: "1.2.3".to_string() }.to_string(),
            "failed to parse field 'symbol', found value: 1.2.3"
        );
    }

    #[test]
    fn only_missing_symbol_is_a_filter_signal() {
        assert!(ErrorKind::NotADocument(String::new()).is_not_a_document());
        assert!(!ErrorKind::ParseError { field: "symbol", value: String::new() }.is_not_a_document());
    }
}
