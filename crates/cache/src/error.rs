//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A query error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for query and rendering operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required collaborator was not supplied to the service builder.
    #[display("invalid configuration: {_0}")]
    Configuration(#[error(not(source))] &'static str),
    /// A render stage failed; the records could not be prepared for publication.
    #[display("render failed")]
    Render,
    /// Rendered records could not be written as bytes.
    #[display("serialization failed")]
    Serialize,
    /// A compressed representation could not be produced.
    #[display("compression failed")]
    Compression,
    /// The encoding exists but this service was not configured to produce it.
    #[display("encoding not enabled: {_0}")]
    DisabledEncoding(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Failed renders are never cached, so the next query tries again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Render | Self::Serialize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Render.to_string(), "render failed");
        assert_eq!(ErrorKind::DisabledEncoding("br".to_string()).to_string(), "encoding not enabled: br");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Render.is_retryable());
        assert!(!ErrorKind::DisabledEncoding("br".to_string()).is_retryable());
    }
}
