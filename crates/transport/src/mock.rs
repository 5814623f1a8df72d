//! In-memory fetcher for testing.

use crate::error::{ErrorKind, Result};
use crate::{Fetch, Response};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Clone)]
struct Route {
    etag: Option<String>,
    content_length: Option<String>,
    body: Vec<u8>,
}

/// In-memory [`Fetch`] implementation for testing.
///
/// Serves canned responses by exact URL and keeps count of how many requests
/// were made and how many body bytes were actually read, which is the number
/// that matters when checking whether the cache did its job. Unknown URLs get
/// a 404, same as a real mirror.
#[derive(Default)]
pub struct MockFetcher {
    routes: RwLock<HashMap<String, Route>>,
    requests: AtomicUsize,
    downloaded: Arc<AtomicU64>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `url` with a quoted `ETag` of `etag` and a correct
    /// `Content-Length`. Replaces whatever was previously served there.
    pub fn serve(&self, url: impl Into<String>, etag: &str, body: impl Into<Vec<u8>>) {
        let body = body.into();
        let content_length = Some(body.len().to_string());
        self.serve_raw(url, Some(&format!("\"{etag}\"")), content_length.as_deref(), body);
    }

    /// Serve a response with arbitrary (or missing) header values.
    pub fn serve_raw(
        &self,
        url: impl Into<String>,
        etag: Option<&str>,
        content_length: Option<&str>,
        body: impl Into<Vec<u8>>,
    ) {
        let route = Route {
            etag: etag.map(str::to_string),
            content_length: content_length.map(str::to_string),
            body: body.into(),
        };
        self.routes.write().unwrap_or_else(PoisonError::into_inner).insert(url.into(), route);
    }

    /// Number of requests made, whether or not their bodies were read.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Total body bytes read by callers across every request.
    pub fn bytes_downloaded(&self) -> u64 {
        self.downloaded.load(Ordering::SeqCst)
    }
}

struct CountingBody {
    inner: Cursor<Vec<u8>>,
    downloaded: Arc<AtomicU64>,
}

impl Read for CountingBody {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let read = self.inner.read(buf)?;
        self.downloaded.fetch_add(read as u64, Ordering::SeqCst);
        Ok(read)
    }
}

impl Fetch for MockFetcher {
    fn get(&self, url: &str) -> Result<Response> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let routes = self.routes.read().unwrap_or_else(PoisonError::into_inner);
        let Some(route) = routes.get(url).cloned() else {
            exn::bail!(ErrorKind::Status { url: url.to_string(), status: 404 });
        };
        Ok(Response {
            etag: route.etag,
            content_length: route.content_length,
            body: Box::new(CountingBody { inner: Cursor::new(route.body), downloaded: self.downloaded.clone() }),
        })
    }
}
