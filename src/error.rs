//! Command-line Error Types

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("{_0}")]
    Usage(#[error(not(source))] String),
    #[display("invalid configuration")]
    Config,
    #[display("could not set up the repository client")]
    Setup,
    #[display("fetching manual pages failed")]
    Fetch,
}
