//! Client for a single distribution/architecture of a Debian mirror.
//!
//! Answers the two questions the rest of the tool needs: *which package ships
//! this file?* ([`Client::query_contents`]) and *where do I download this
//! package from?* ([`Client::query_package`]), plus the download itself.
//!
//! Nothing is indexed in memory. Every query streams the relevant index from
//! the [`CachingTransport`](manget_transport::CachingTransport), which makes
//! repeat queries cheap on the network but linear in index size.

mod client;
pub mod error;

pub use crate::client::{Client, ClientBuilder};
pub use manget_index::{Contents, Package};
