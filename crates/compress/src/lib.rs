//! Decompression for the formats a Debian mirror actually serves.
//!
//! Repository indices (`Packages.gz`, `Contents-*.gz`) and installed manual
//! pages are gzip, while the payload of a `.deb` (`data.tar.xz`) is XZ. This
//! crate puts both behind a single [`Compression`] enum, providing:
//!
//! - **Streaming** via wrapped readers ([`Compression::wrap_reader`]) so an
//!   index of several hundred megabytes never has to be held in memory
//! - **In-memory** decoding ([`Compression::decompress`]) plus encoding, which
//!   is mostly useful for building test fixtures
//!
//! Gzip is always available. XZ is behind the `xz` feature flag, since only
//! the package extractor needs it.

pub mod error;
mod ops;
mod util;

/// A supported compression format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Gzip compression (.gz)
    Gzip,
    /// XZ/LZMA compression (.xz)
    #[cfg(feature = "xz")]
    Xz,
}

