//! HTTP transport with a validator-keyed download cache.
//!
//! Everything a mirror serves (indices and `.deb` blobs alike) goes through
//! [`CachingTransport::get`], which issues the request, keys the response by
//! its `ETag`, and only streams the body to disk when the cached copy is
//! missing or the wrong size. Callers always get back a rewound [`File`].
//!
//! The network side sits behind the [`Fetch`] trait so that the cache (and
//! everything built on top of it) can be exercised without a network; see
//! `MockFetcher` behind the `mock` feature.
//!
//! [`File`]: std::fs::File

mod cache;
pub mod error;
mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use crate::cache::CachingTransport;
pub use crate::http::HttpFetcher;
#[cfg(any(test, feature = "mock"))]
pub use crate::mock::MockFetcher;
use crate::error::Result;
use std::io::Read;
use std::sync::Arc;

pub type FetcherHandle = Arc<dyn Fetch + Send + Sync>;

/// A response whose headers have arrived but whose body hasn't been read.
///
/// Header values are passed through untouched; deciding whether they're
/// usable is the cache's job, not the fetcher's.
pub struct Response {
    /// Raw `ETag` header value, quotes and all.
    pub etag: Option<String>,
    /// Raw `Content-Length` header value.
    pub content_length: Option<String>,
    pub body: Box<dyn Read + Send>,
}

/// Something that can perform a GET.
pub trait Fetch {
    /// Send the request and return as soon as the headers are in. A non-2xx
    /// status is an error.
    fn get(&self, url: &str) -> Result<Response>;
}
