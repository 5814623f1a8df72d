//! Index Error Types

use derive_more::{Display, Error};

/// An index parsing error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for index operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The underlying stream failed. For a compressed index this is usually
    /// a corrupt or truncated download, since decoders report bad data as
    /// read errors.
    #[display("failed to read {_0} index")]
    Read(#[error(not(source))] &'static str),
}
