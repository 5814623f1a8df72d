//! Transport Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A transport error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// ### Network Errors
/// - [`ErrorKind::Client`]
/// - [`ErrorKind::Network`]
/// - [`ErrorKind::Status`]
/// - [`ErrorKind::MissingHeader`]
/// - [`ErrorKind::InvalidHeader`]
/// - [`ErrorKind::Truncated`]
///
/// ### Local Errors
/// - [`ErrorKind::Cache`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The HTTP client could not be constructed (TLS backend, mostly).
    #[display("failed to initialize HTTP client")]
    Client,
    /// Connecting, sending, or reading the response body failed.
    #[display("request to {_0} failed")]
    Network(#[error(not(source))] String),
    /// The server answered, but not with a success status.
    #[display("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    /// A header the cache depends on wasn't sent. Responses can't be cached
    /// without a validator and a length, and uncached fetches aren't a thing.
    #[display("response is missing the {_0} header")]
    MissingHeader(#[error(not(source))] &'static str),
    /// A header the cache depends on was sent, but isn't usable.
    #[display("response has an invalid {_0} header")]
    InvalidHeader(#[error(not(source))] &'static str),
    /// The body ended before `Content-Length` bytes arrived (or kept going
    /// after). The partial cache entry is repaired on the next fetch.
    #[display("expected {expected} bytes but received {actual}")]
    Truncated { expected: u64, actual: u64 },
    /// Creating, reading, or writing the cache directory or a cache entry failed.
    #[display("cache I/O error: {}", _0.display())]
    Cache(#[error(not(source))] PathBuf),
}
