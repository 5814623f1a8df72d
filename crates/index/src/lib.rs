//! Streaming parsers for the two Debian repository indices.
//!
//! - [`PackageReader`] walks the RFC822-style `Packages` index, one
//!   [`Package`] per paragraph.
//! - [`ContentsReader`] walks the `Contents-{arch}` index, one [`Contents`]
//!   per line.
//!
//! Both are plain [`Iterator`]s over any [`Read`](std::io::Read)er of
//! *decompressed* index text, pulling one record at a time. A full `Contents`
//! index is hundreds of megabytes once decompressed, so nothing here ever
//! holds more than the current line.

mod contents;
pub mod error;
mod lines;
mod package;

pub use crate::contents::{Contents, ContentsReader};
pub use crate::package::{Package, PackageReader};
