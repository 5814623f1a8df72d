//! Builders for synthetic packages, for tests here and downstream.
//!
//! These panic on failure. If fixture setup is wrong, the test should not pass.

use manget_compress::Compression;
use tar::{Builder, EntryType, Header};

fn ar_header(name: &str, body: &[u8]) -> ::ar::Header {
    let mut header = ::ar::Header::new(name.as_bytes().to_vec(), body.len() as u64);
    header.set_mode(0o100644);
    header
}

/// Build an `ar` archive from `(name, body)` pairs with space-padded names,
/// the way `dpkg-deb` writes them.
pub fn ar(members: &[(&str, &[u8])]) -> Vec<u8> {
    let mut archive = Vec::new();
    let mut builder = ::ar::Builder::new(&mut archive);
    for (name, body) in members {
        builder.append(&ar_header(name, body), *body).unwrap();
    }
    drop(builder);
    archive
}

/// Same as [`ar`], but with GNU `name/` member names.
pub fn gnu_ar(members: &[(&str, &[u8])]) -> Vec<u8> {
    let names = members.iter().map(|(name, _)| name.as_bytes().to_vec()).collect();
    let mut archive = Vec::new();
    let mut builder = ::ar::GnuBuilder::new(&mut archive, names);
    for (name, body) in members {
        builder.append(&ar_header(name, body), *body).unwrap();
    }
    drop(builder);
    archive
}

/// Build an uncompressed tar stream from `(path, contents)` pairs.
///
/// Paths are written verbatim, leading `./` included, the way `dpkg-deb`
/// writes them. ([`Builder::append_data`] would normalize it away.)
pub fn tar(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = Builder::new(Vec::new());
    for (path, contents) in entries {
        let mut header = Header::new_gnu();
        let name = &mut header.as_old_mut().name;
        assert!(path.len() < name.len(), "tar path too long: {path}");
        name[..path.len()].copy_from_slice(path.as_bytes());
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(EntryType::Regular);
        header.set_cksum();
        builder.append(&header, *contents).unwrap();
    }
    builder.into_inner().unwrap()
}

/// Build a `.deb` whose `data.tar.xz` holds `files`, with the usual
/// `debian-binary` and `control.tar.xz` members in front of it.
pub fn deb(files: &[(&str, &[u8])]) -> Vec<u8> {
    let control = Compression::Xz.compress(&tar(&[("./control", b"Package: fixture\n")])).unwrap();
    let data = Compression::Xz.compress(&tar(files)).unwrap();
    ar(&[("debian-binary", b"2.0\n"), ("control.tar.xz", &control), ("data.tar.xz", &data)])
}
