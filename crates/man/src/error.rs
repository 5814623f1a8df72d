//! Manual Page Error Types

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("unknown manual section: {_0}")]
    UnknownSection(#[error(not(source))] String),
    /// Querying the repository, or downloading from it, failed.
    #[display("repository lookup failed for {_0}")]
    Repository(#[error(not(source))] String),
    #[display("failed to extract {_0}")]
    Extract(#[error(not(source))] String),
    #[display("failed to write {}", _0.display())]
    Store(#[error(not(source))] PathBuf),
    /// The formatter or pager couldn't be started, or exited unsuccessfully.
    #[display("`{_0}` failed")]
    Command(#[error(not(source))] String),
}
