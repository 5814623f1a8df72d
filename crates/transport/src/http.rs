use crate::error::{ErrorKind, Result};
use crate::{Fetch, Response};
use exn::ResultExt;
use reqwest::blocking::Client;
use reqwest::header::{CONTENT_LENGTH, ETAG, HeaderMap, HeaderName};
use std::time::Duration;
use tracing::instrument;

const USER_AGENT: &str = concat!("man-get/", env!("CARGO_PKG_VERSION"));

/// [`Fetch`] over a blocking [`reqwest`] client.
///
/// There's no retry logic here: a failed request fails the whole fetch.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher. `None` means requests wait for as long as the server
    /// takes, which is how every fetch behaved before timeouts were configurable.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .or_raise(|| ErrorKind::Client)?;
        Ok(Self { client })
    }
}

fn header(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers.get(name).and_then(|value| value.to_str().ok()).map(str::to_string)
}

impl Fetch for HttpFetcher {
    #[instrument(skip(self), fields(status))]
    fn get(&self, url: &str) -> Result<Response> {
        let response = self.client.get(url).send().or_raise(|| ErrorKind::Network(url.to_string()))?;
        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());
        if !status.is_success() {
            exn::bail!(ErrorKind::Status { url: url.to_string(), status: status.as_u16() });
        }
        let etag = header(response.headers(), ETAG);
        let content_length = header(response.headers(), CONTENT_LENGTH);
        Ok(Response { etag, content_length, body: Box::new(response) })
    }
}
