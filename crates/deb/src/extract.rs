use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use manget_compress::Compression;
use std::io::Read;
use tracing::{debug, instrument, trace};

/// The only payload layout supported: an XZ-compressed tar.
pub const DATA_MEMBER: &str = "data.tar.xz";

/// What the caller wants done with the matched entry's bytes.
///
/// Decided by the caller, never by sniffing: a page store keeps the `.gz`
/// as installed, a pager needs plain roff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Payload {
    /// The entry's bytes exactly as stored in the package.
    Raw,
    /// The entry's bytes run through a gzip decoder.
    Decompressed,
}

/// Extract the file at `path` (relative to the filesystem root, no leading
/// `/`) from a `.deb` stream.
///
/// Fails fast at the first broken layer: a bad `ar` container or a missing
/// [`DATA_MEMBER`] is [`Malformed`](ErrorKind::Malformed) /
/// [`MissingMember`](ErrorKind::MissingMember), a payload without the path is
/// [`FileNotFound`](ErrorKind::FileNotFound).
#[instrument(skip(package, payload), fields(payload = ?payload, size))]
pub fn extract_file(package: impl Read, path: &str, payload: Payload) -> Result<Vec<u8>> {
    let mut archive = ar::Archive::new(package);
    while let Some(member) = archive.next_entry() {
        let member = member.or_raise(|| ErrorKind::Malformed("ar"))?;
        let name = member.header().identifier();
        // GNU ar ends names with a slash; dpkg pads them with spaces.
        if name.strip_suffix(b"/").unwrap_or(name) == DATA_MEMBER.as_bytes() {
            return scan_data(member, path, payload);
        }
        trace!(member = %String::from_utf8_lossy(name), "skipping ar member");
    }
    exn::bail!(ErrorKind::MissingMember(DATA_MEMBER))
}

/// Find `path` in the XZ-compressed tar stream of a [`DATA_MEMBER`].
fn scan_data(data: impl Read, path: &str, payload: Payload) -> Result<Vec<u8>> {
    let mut archive = tar::Archive::new(Compression::Xz.wrap_reader(data));
    // dpkg-deb always stores paths relative to "./".
    let wanted = format!("./{path}");
    for entry in archive.entries().or_raise(|| ErrorKind::Malformed(DATA_MEMBER))? {
        let mut entry = entry.or_raise(|| ErrorKind::Malformed(DATA_MEMBER))?;
        if *entry.path_bytes() != *wanted.as_bytes() {
            continue;
        }
        if !entry.header().entry_type().is_file() {
            exn::bail!(ErrorKind::NotRegular(path.to_string()));
        }
        let mut stored = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry.read_to_end(&mut stored).or_raise(|| ErrorKind::Malformed(DATA_MEMBER))?;
        tracing::Span::current().record("size", stored.len());
        debug!(bytes = stored.len(), "matched entry");
        return match payload {
            Payload::Raw => Ok(stored),
            Payload::Decompressed => Compression::Gzip.decompress(&stored).or_raise(|| ErrorKind::Malformed("gzip")),
        };
    }
    exn::bail!(ErrorKind::FileNotFound(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture;
    use rstest::rstest;

    const PAGE: &[u8] = b".TH BAR 1\n.SH NAME\nbar \\- does bar things\n";

    fn gzipped_page() -> Vec<u8> {
        Compression::Gzip.compress(PAGE).unwrap()
    }

    #[test]
    fn test_extracts_raw_entry() {
        let gz = gzipped_page();
        let deb = fixture::ar(&[(DATA_MEMBER, &Compression::Xz.compress(&fixture::tar(&[("./foo/bar.gz", &gz)])).unwrap())]);

        assert_eq!(extract_file(deb.as_slice(), "foo/bar.gz", Payload::Raw).unwrap(), gz);
    }

    #[test]
    fn test_extracts_and_decompresses_entry() {
        let deb = fixture::deb(&[
            ("./usr/", b""),
            ("./usr/share/man/man1/foo.1.gz", &Compression::Gzip.compress(b"other page").unwrap()),
            ("./usr/share/man/man1/bar.1.gz", &gzipped_page()),
        ]);

        let page = extract_file(deb.as_slice(), "usr/share/man/man1/bar.1.gz", Payload::Decompressed).unwrap();
        assert_eq!(page, PAGE);
    }

    #[rstest]
    #[case::other_file("foo/baz.gz")]
    #[case::without_prefix_match("bar.gz")]
    #[case::leading_slash("/foo/bar.gz")]
    fn test_missing_file(#[case] path: &str) {
        let deb = fixture::deb(&[("./foo/bar.gz", &gzipped_page())]);
        let err = extract_file(deb.as_slice(), path, Payload::Raw).unwrap_err();
        assert_eq!(*err, ErrorKind::FileNotFound(path.to_string()));
    }

    #[test]
    fn test_entries_without_dot_prefix_do_not_match() {
        let deb = fixture::ar(&[(DATA_MEMBER, &Compression::Xz.compress(&fixture::tar(&[("foo/bar.gz", PAGE)])).unwrap())]);
        let err = extract_file(deb.as_slice(), "foo/bar.gz", Payload::Raw).unwrap_err();
        assert!(matches!(&*err, ErrorKind::FileNotFound(_)));
    }

    #[test]
    fn test_missing_data_member() {
        let deb = fixture::ar(&[("debian-binary", b"2.0\n"), ("data.tar.zst", b"not supported")]);
        let err = extract_file(deb.as_slice(), "foo/bar.gz", Payload::Raw).unwrap_err();
        assert_eq!(*err, ErrorKind::MissingMember(DATA_MEMBER));
    }

    #[rstest]
    #[case::empty(b"")]
    #[case::html(b"<html>404 Not Found</html>")]
    #[case::zip(b"PK\x03\x04 definitely a zip")]
    fn test_not_an_ar_archive(#[case] data: &[u8]) {
        let err = extract_file(data, "foo/bar.gz", Payload::Raw).unwrap_err();
        assert_eq!(*err, ErrorKind::Malformed("ar"));
    }

    #[test]
    fn test_gnu_member_names() {
        let data = Compression::Xz.compress(&fixture::tar(&[("./foo/bar.gz", PAGE)])).unwrap();
        let deb = fixture::gnu_ar(&[("debian-binary", b"2.0\n"), (DATA_MEMBER, &data)]);
        assert_eq!(extract_file(deb.as_slice(), "foo/bar.gz", Payload::Raw).unwrap(), PAGE);
    }

    #[test]
    fn test_members_before_data_are_skipped_unread() {
        // Odd-sized members exercise the padding between bodies.
        let data = Compression::Xz.compress(&fixture::tar(&[("./foo/bar.gz", PAGE)])).unwrap();
        let deb = fixture::ar(&[("debian-binary", b"2.0\n"), ("control.tar.xz", b"odd"), (DATA_MEMBER, &data)]);
        assert_eq!(extract_file(deb.as_slice(), "foo/bar.gz", Payload::Raw).unwrap(), PAGE);
    }

    #[test]
    fn test_truncated_member_header() {
        let mut deb = fixture::ar(&[("debian-binary", b"2.0\n")]);
        deb.extend_from_slice(b"data.tar.xz     0     ");
        let err = extract_file(deb.as_slice(), "foo/bar.gz", Payload::Raw).unwrap_err();
        assert_eq!(*err, ErrorKind::Malformed("ar"));
    }

    #[test]
    fn test_truncated_data_member() {
        let mut state = 0x2545_f491_u32;
        let noise: Vec<u8> = (0..64 * 1024)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                state as u8
            })
            .collect();
        let data = Compression::Xz.compress(&fixture::tar(&[("./noise", &noise), ("./foo/bar.gz", PAGE)])).unwrap();
        let mut deb = fixture::ar(&[(DATA_MEMBER, &data)]);
        deb.truncate(deb.len() - data.len() / 2);

        let err = extract_file(deb.as_slice(), "foo/bar.gz", Payload::Raw).unwrap_err();
        assert_eq!(*err, ErrorKind::Malformed(DATA_MEMBER));
    }

    #[test]
    fn test_data_member_is_not_xz() {
        let deb = fixture::ar(&[(DATA_MEMBER, &fixture::tar(&[("./foo/bar.gz", PAGE)]))]);
        let err = extract_file(deb.as_slice(), "foo/bar.gz", Payload::Raw).unwrap_err();
        assert_eq!(*err, ErrorKind::Malformed(DATA_MEMBER));
    }

    #[test]
    fn test_entry_is_not_gzip() {
        let deb = fixture::deb(&[("./foo/bar.gz", PAGE)]);
        let err = extract_file(deb.as_slice(), "foo/bar.gz", Payload::Decompressed).unwrap_err();
        assert_eq!(*err, ErrorKind::Malformed("gzip"));
        // Still fine when the caller asks for the stored bytes.
        assert_eq!(extract_file(deb.as_slice(), "foo/bar.gz", Payload::Raw).unwrap(), PAGE);
    }
}
