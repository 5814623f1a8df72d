//! Fetch Debian manual pages one section at a time.
//!
//! A [`PageFetcher`] finds which package ships `usr/share/man/man{N}/{page}.{section}.gz`
//! for every [`Section`] in [`Section::PRIORITY`], pulls that one file out of
//! the package and hands it to a [`PageSink`]: a [`PageStore`] that keeps the
//! gzipped page for `MANPATH`, or a [`Pager`] that shows it straight away.

pub mod error;
mod fetch;
mod section;
pub mod sink;

pub use crate::fetch::{PageFetcher, PageReport};
pub use crate::section::Section;
pub use crate::sink::{Delivery, PageSink, PageStore, Pager};
