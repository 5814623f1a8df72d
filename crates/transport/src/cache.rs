use crate::error::{ErrorKind, Result};
use crate::{FetcherHandle, Response};
use exn::{OptionExt, ResultExt};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind as IoErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// GET with an on-disk cache keyed by the response's `ETag`.
///
/// Every call still sends the request; it's the *body* that gets skipped. The
/// cache entry at `{cache_dir}/{etag}` is only trusted when its size equals
/// the response's `Content-Length`:
///
/// | Entry exists | Size matches | Action                                  |
/// |--------------|--------------|-----------------------------------------|
/// | no           | -            | download into a new entry, rewind       |
/// | yes          | yes          | drop the response body, open the entry  |
/// | yes          | no           | truncate, download again, rewind        |
///
/// So an interrupted download is repaired by the next fetch rather than
/// trusted.
///
/// > **Note:** Nothing guards the directory against a second process
/// >           truncating an entry while this one reads it, and two URLs that
/// >           share an `ETag` share an entry.
pub struct CachingTransport {
    fetcher: FetcherHandle,
    cache_dir: PathBuf,
}

impl CachingTransport {
    /// The cache directory is created on first use, not here.
    pub fn new(fetcher: FetcherHandle, cache_dir: impl Into<PathBuf>) -> Self {
        Self { fetcher, cache_dir: cache_dir.into() }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Fetch `url`, returning a handle to the cached body positioned at offset 0.
    #[instrument(skip(self), fields(etag, size))]
    pub fn get(&self, url: &str) -> Result<File> {
        let Response { etag, content_length, body } = self.fetcher.get(url)?;
        let token = cache_key(etag.as_deref())?;
        let expected = content_length
            .as_deref()
            .ok_or_raise(|| ErrorKind::MissingHeader("Content-Length"))?
            .trim()
            .parse::<u64>()
            .or_raise(|| ErrorKind::InvalidHeader("Content-Length"))?;
        tracing::Span::current().record("etag", token.as_str()).record("size", expected);

        fs::create_dir_all(&self.cache_dir).or_raise(|| ErrorKind::Cache(self.cache_dir.clone()))?;
        let path = self.cache_dir.join(&token);
        let cached = match fs::metadata(&path) {
            Ok(metadata) => Some(metadata.len()),
            Err(e) if e.kind() == IoErrorKind::NotFound => None,
            Err(e) => return Err(e).or_raise(|| ErrorKind::Cache(path)),
        };

        if cached == Some(expected) {
            debug!(path = %path.display(), "cache hit, skipping download");
            // Dropping the body closes the connection without reading it.
            drop(body);
            return File::open(&path).or_raise(|| ErrorKind::Cache(path));
        }
        if let Some(size) = cached {
            warn!(path = %path.display(), size, expected, "cache entry has the wrong size, downloading again");
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .or_raise(|| ErrorKind::Cache(path.clone()))?;
        let written = download(url, body, &mut file, &path)?;
        if written != expected {
            exn::bail!(ErrorKind::Truncated { expected, actual: written });
        }
        file.seek(SeekFrom::Start(0)).or_raise(|| ErrorKind::Cache(path.clone()))?;
        info!(path = %path.display(), bytes = written, "downloaded");
        Ok(file)
    }
}

/// Turn an `ETag` header into a cache file name.
///
/// The value must be quoted (a weak `W/` prefix is tolerated) and whatever is
/// inside the quotes has to be usable as a single path component, since it
/// comes straight from a server we don't control.
fn cache_key(etag: Option<&str>) -> Result<String> {
    let etag = etag.ok_or_raise(|| ErrorKind::MissingHeader("ETag"))?.trim();
    let quoted = etag.strip_prefix("W/").unwrap_or(etag);
    let token = quoted
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_raise(|| ErrorKind::InvalidHeader("ETag"))?;
    if matches!(token, "" | "." | "..") || token.contains(['/', '\\', '\0']) {
        exn::bail!(ErrorKind::InvalidHeader("ETag"));
    }
    Ok(token.to_string())
}

/// Stream the body into the cache entry. Not `io::copy`, because a failed read
/// is the network's fault and a failed write is the disk's.
fn download(url: &str, mut body: impl Read, file: &mut File, path: &Path) -> Result<u64> {
    let mut buffer = vec![0u8; 64 * 1024];
    let mut written = 0u64;
    loop {
        let read = match body.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == IoErrorKind::Interrupted => continue,
            Err(e) => return Err(e).or_raise(|| ErrorKind::Network(url.to_string())),
        };
        file.write_all(&buffer[..read]).or_raise(|| ErrorKind::Cache(path.to_path_buf()))?;
        written += read as u64;
    }
    file.flush().or_raise(|| ErrorKind::Cache(path.to_path_buf()))?;
    Ok(written)
}
