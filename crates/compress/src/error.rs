use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

/// Ways a content coding can fail.
///
/// Encoding only ever writes to memory, so none of these go away by trying
/// again with the same input.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The codec rejected the representation while compressing it.
    #[display("could not encode representation")]
    Encode,
    /// The bytes are not a valid stream in the claimed coding.
    #[display("could not decode representation")]
    Decode,
    /// Not an HTTP content coding this crate knows.
    #[display("unknown content coding: {_0}")]
    Unknown(#[error(not(source))] String),
    /// A known content coding whose codec was not compiled in.
    #[display("content coding not available in this build: {_0}")]
    Unavailable(#[error(not(source))] String),
}

impl ErrorKind {
    /// The client named a coding that cannot be produced, as opposed to a
    /// codec failure on the server side.
    pub fn is_request_error(&self) -> bool {
        matches!(self, Self::Unknown(_) | Self::Unavailable(_))
    }
}
