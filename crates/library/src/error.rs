//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// ### Fatal
/// - [`ErrorKind::Configuration`] - the library cannot become ready.
/// - [`ErrorKind::Scheduler`] - the refresh timer could not be started.
///
/// ### Recoverable
/// - [`ErrorKind::Source`] - raised by [`Source`](crate::Source)
///   implementations. The library logs it and keeps serving the previous index.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required collaborator or setting is missing or invalid.
    #[display("invalid configuration: {_0}")]
    Configuration(#[error(not(source))] &'static str),
    /// The source collaborator failed to produce records.
    #[display("source execution failed")]
    Source,
    /// The background refresh thread could not be spawned.
    #[display("could not start refresh scheduler")]
    Scheduler,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Source)
    }
}
