//! Repository Error Types

use derive_more::{Display, Error};

/// A repository error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for repository operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a repository failure.
///
/// ### Operational Errors
/// - [`ErrorKind::PackageNotFound`]
/// - [`ErrorKind::MissingFilename`]
/// - [`ErrorKind::Incomplete`]
///
/// ### Dependency Errors
/// - [`ErrorKind::Transport`]
/// - [`ErrorKind::Index`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// [`ClientBuilder::build`](crate::ClientBuilder::build) was missing a setting.
    #[display("client is missing its {_0}")]
    Incomplete(#[error(not(source))] &'static str),
    /// Fetching an index or package failed (network or cache).
    #[display("failed to fetch {_0}")]
    Transport(#[error(not(source))] String),
    /// An index couldn't be decompressed or read.
    #[display("failed to read index {_0}")]
    Index(#[error(not(source))] String),
    /// No paragraph of the `Packages` index has this name.
    #[display("package {_0} not found")]
    PackageNotFound(#[error(not(source))] String),
    /// The package exists, but its paragraph has no `Filename:` to download.
    #[display("package {_0} has no filename")]
    MissingFilename(#[error(not(source))] String),
}
