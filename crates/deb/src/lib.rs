//! Pull one file out of a `.deb` without unpacking the rest of it.
//!
//! A binary package is an `ar` archive whose `data.tar.xz` member holds the
//! installed file tree. [`extract_file`] walks that chain strictly forwards:
//!
//! ```text
//! package bytes ─▶ ar member ─▶ XZ decoder ─▶ tar entries ─▶ (gzip) ─▶ file bytes
//! ```
//!
//! Each layer is a plain [`Read`](std::io::Read)er over the one before it, so
//! nothing upstream of the matched tar entry is ever buffered. The entry
//! itself is read into memory; manual pages are small.

pub mod error;
mod extract;
#[cfg(any(test, feature = "mock"))]
pub mod fixture;

pub use crate::extract::{DATA_MEMBER, Payload, extract_file};
