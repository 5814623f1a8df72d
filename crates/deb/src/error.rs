//! Package Extraction Error Types

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a file couldn't be extracted.
///
/// [`Malformed`](ErrorKind::Malformed) and [`MissingMember`](ErrorKind::MissingMember)
/// mean the package itself is broken (or isn't the layout we support);
/// [`FileNotFound`](ErrorKind::FileNotFound) means the package is fine but
/// doesn't ship the path.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A layer of the container couldn't be decoded. Names the layer.
    #[display("malformed {_0} data")]
    Malformed(#[error(not(source))] &'static str),
    /// The `ar` archive ended without the named member.
    #[display("{_0} not found")]
    MissingMember(#[error(not(source))] &'static str),
    /// The payload has no entry at the requested path.
    #[display("file not found in package: {_0}")]
    FileNotFound(#[error(not(source))] String),
    /// The entry exists but is a link (or directory), not file content.
    #[display("not a regular file in package: {_0}")]
    NotRegular(#[error(not(source))] String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::MissingMember("data.tar.xz").to_string(), "data.tar.xz not found");
        assert_eq!(ErrorKind::Malformed("ar").to_string(), "malformed ar data");
        assert_eq!(
            ErrorKind::FileNotFound("usr/share/man/man1/tar.1.gz".to_string()).to_string(),
            "file not found in package: usr/share/man/man1/tar.1.gz"
        );
    }
}
