use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use manget_compress::Compression;
use manget_index::{Contents, ContentsReader, Package, PackageReader};
use manget_transport::{CachingTransport, FetcherHandle, HttpFetcher};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

type IndexStream = Box<dyn Read>;

/// Repository client bound to one mirror, distribution and architecture.
///
/// # Examples
///
/// ```no_run
/// use manget_apt::Client;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::builder()
///     .mirror("https://ftp.debian.org/debian")
///     .distribution("bookworm")
///     .arch("amd64")
///     .cache_dir("/tmp/man-get")
///     .build()?;
/// let tar = client.query_package("tar")?;
/// let deb = client.download(&tar)?;
/// # Ok(())
/// # }
/// ```
pub struct Client {
    transport: CachingTransport,
    mirror: String,
    distribution: String,
    arch: String,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    fn packages_url(&self) -> String {
        format!("{}/dists/{}/main/binary-{}/Packages.gz", self.mirror, self.distribution, self.arch)
    }

    fn contents_url(&self) -> String {
        format!("{}/dists/{}/main/Contents-{}.gz", self.mirror, self.distribution, self.arch)
    }

    /// Fetch (or reuse) a gzipped index and return it decompressing lazily.
    fn open_index(&self, url: &str) -> Result<IndexStream> {
        let file = self.transport.get(url).or_raise(|| ErrorKind::Transport(url.to_string()))?;
        Ok(Compression::Gzip.wrap_reader(file))
    }

    /// Stream the `Packages` index for this distribution and architecture.
    pub fn packages(&self) -> Result<PackageReader<IndexStream>> {
        Ok(PackageReader::new(self.open_index(&self.packages_url())?))
    }

    /// Stream the `Contents` index for this distribution and architecture.
    pub fn contents(&self) -> Result<ContentsReader<IndexStream>> {
        Ok(ContentsReader::new(self.open_index(&self.contents_url())?))
    }

    /// Find the first paragraph of the `Packages` index named `name`.
    ///
    /// Linear in the size of the index, every time.
    #[instrument(skip(self))]
    pub fn query_package(&self, name: &str) -> Result<Package> {
        let url = self.packages_url();
        for package in self.packages()? {
            let package = package.or_raise(|| ErrorKind::Index(url.clone()))?;
            if package.name == name {
                debug!(filename = %package.filename, "package found");
                return Ok(package);
            }
        }
        exn::bail!(ErrorKind::PackageNotFound(name.to_string()))
    }

    /// Collect every `Contents` entry whose file is one of `files`, in a single
    /// pass over the index. Order is the index's order, which is to say
    /// meaningless to callers.
    #[instrument(skip(self, files), fields(files = files.len(), found))]
    pub fn query_contents(&self, files: &HashSet<String>) -> Result<Vec<Contents>> {
        let url = self.contents_url();
        let mut found = Vec::new();
        for entry in self.contents()? {
            let entry = entry.or_raise(|| ErrorKind::Index(url.clone()))?;
            if files.contains(&entry.file) {
                found.push(entry);
            }
        }
        tracing::Span::current().record("found", found.len());
        Ok(found)
    }

    /// Download (or reuse) a package blob. The handle is positioned at the
    /// start of the `.deb` and closes on drop.
    #[instrument(skip(self, package), fields(package = %package.name))]
    pub fn download(&self, package: &Package) -> Result<File> {
        if package.filename.is_empty() {
            exn::bail!(ErrorKind::MissingFilename(package.name.clone()));
        }
        let url = format!("{}/{}", self.mirror, package.filename);
        self.transport.get(&url).or_raise(|| ErrorKind::Transport(url.clone()))
    }
}

/// Builder for [`Client`]. Everything but the fetcher and timeout is required.
#[derive(Default)]
pub struct ClientBuilder {
    mirror: Option<String>,
    distribution: Option<String>,
    arch: Option<String>,
    cache_dir: Option<PathBuf>,
    timeout: Option<Duration>,
    fetcher: Option<FetcherHandle>,
}

impl ClientBuilder {
    /// Base URL of the mirror; a trailing `/` is dropped.
    pub fn mirror(mut self, mirror: impl Into<String>) -> Self {
        self.mirror = Some(mirror.into().trim_end_matches('/').to_string());
        self
    }

    /// Release codename or suite, e.g. `bookworm` or `stable`.
    pub fn distribution(mut self, distribution: impl Into<String>) -> Self {
        self.distribution = Some(distribution.into());
        self
    }

    pub fn arch(mut self, arch: impl Into<String>) -> Self {
        self.arch = Some(arch.into());
        self
    }

    pub fn cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(cache_dir.into());
        self
    }

    /// Request timeout for the default HTTP fetcher. Ignored when a custom
    /// fetcher is supplied.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the HTTP fetcher, e.g. with a mock in tests.
    pub fn fetcher(mut self, fetcher: FetcherHandle) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn build(self) -> Result<Client> {
        let mirror = self.mirror.ok_or_raise(|| ErrorKind::Incomplete("mirror"))?;
        let distribution = self.distribution.ok_or_raise(|| ErrorKind::Incomplete("distribution"))?;
        let arch = self.arch.ok_or_raise(|| ErrorKind::Incomplete("architecture"))?;
        let cache_dir = self.cache_dir.ok_or_raise(|| ErrorKind::Incomplete("cache directory"))?;
        let fetcher: FetcherHandle = match self.fetcher {
            Some(fetcher) => fetcher,
            None => Arc::new(HttpFetcher::new(self.timeout).or_raise(|| ErrorKind::Transport(mirror.clone()))?),
        };
        Ok(Client { transport: CachingTransport::new(fetcher, cache_dir), mirror, distribution, arch })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manget_transport::MockFetcher;
    use std::io::Read;
    use tempfile::TempDir;

    const MIRROR: &str = "http://mirror.test/debian";
    const PACKAGES_URL: &str = "http://mirror.test/debian/dists/bookworm/main/binary-amd64/Packages.gz";
    const CONTENTS_URL: &str = "http://mirror.test/debian/dists/bookworm/main/Contents-amd64.gz";

    const PACKAGES: &str = "\
Package: tar
Version: 1.34+dfsg-1.2
Filename: pool/main/t/tar/tar_1.34+dfsg-1.2_amd64.deb

Package: nofile
Version: 1.0

Package: tar
Filename: pool/main/t/tar/shadowed.deb
";

    const CONTENTS: &str = "\
FILE                                           LOCATION
usr/share/man/man1/tar.1.gz                    utils/tar
usr/share/man/man5/tar.5.gz                    libs/libarchive-dev
usr/share/man/man1/rmt-tar.8.gz                utils/tar
usr/share/doc/tar/with space                   utils/tar
";

    fn gz(text: &str) -> Vec<u8> {
        Compression::Gzip.compress(text.as_bytes()).unwrap()
    }

    fn setup() -> (TempDir, Arc<MockFetcher>, Client) {
        let dir = tempfile::tempdir().unwrap();
        let mock = Arc::new(MockFetcher::new());
        mock.serve(PACKAGES_URL, "packages-1", gz(PACKAGES));
        mock.serve(CONTENTS_URL, "contents-1", gz(CONTENTS));
        let client = Client::builder()
            .mirror(format!("{MIRROR}/"))
            .distribution("bookworm")
            .arch("amd64")
            .cache_dir(dir.path())
            .fetcher(mock.clone())
            .build()
            .unwrap();
        (dir, mock, client)
    }

    #[test]
    fn test_query_package_returns_first_match() {
        let (_dir, _mock, client) = setup();
        let package = client.query_package("tar").unwrap();
        assert_eq!(package.filename, "pool/main/t/tar/tar_1.34+dfsg-1.2_amd64.deb");
    }

    #[test]
    fn test_query_package_not_found() {
        let (_dir, _mock, client) = setup();
        let err = client.query_package("gzip").unwrap_err();
        assert_eq!(*err, ErrorKind::PackageNotFound("gzip".to_string()));
    }

    #[test]
    fn test_repeat_queries_reuse_cached_index() {
        let (_dir, mock, client) = setup();
        client.query_package("tar").unwrap();
        let after_first = mock.bytes_downloaded();
        client.query_package("nofile").unwrap();
        assert_eq!(mock.requests(), 2);
        assert_eq!(mock.bytes_downloaded(), after_first);
    }

    #[test]
    fn test_query_contents_single_pass() {
        let (_dir, mock, client) = setup();
        let files: HashSet<String> =
            ["usr/share/man/man1/tar.1.gz", "usr/share/man/man5/tar.5.gz", "usr/share/man/man7/tar.7.gz"]
                .into_iter()
                .map(str::to_string)
                .collect();

        let mut found = client.query_contents(&files).unwrap();
        found.sort_by(|a, b| a.file.cmp(&b.file));
        assert_eq!(found, [
            Contents { file: "usr/share/man/man1/tar.1.gz".to_string(), packages: vec!["utils/tar".to_string()] },
            Contents {
                file: "usr/share/man/man5/tar.5.gz".to_string(),
                packages: vec!["libs/libarchive-dev".to_string()]
            },
        ]);
        assert_eq!(mock.requests(), 1);
    }

    #[test]
    fn test_query_contents_nothing_matches() {
        let (_dir, _mock, client) = setup();
        let files = HashSet::from(["usr/share/man/man1/nope.1.gz".to_string()]);
        assert!(client.query_contents(&files).unwrap().is_empty());
    }

    #[test]
    fn test_download() {
        let (_dir, mock, client) = setup();
        mock.serve(format!("{MIRROR}/pool/main/t/tar/tar_1.34+dfsg-1.2_amd64.deb"), "deb-1", b"!<arch>\n");

        let package = client.query_package("tar").unwrap();
        let mut body = Vec::new();
        client.download(&package).unwrap().read_to_end(&mut body).unwrap();
        assert_eq!(body, b"!<arch>\n");
    }

    #[test]
    fn test_download_without_filename() {
        let (_dir, mock, client) = setup();
        let package = client.query_package("nofile").unwrap();
        let requests = mock.requests();

        let err = client.download(&package).unwrap_err();
        assert_eq!(*err, ErrorKind::MissingFilename("nofile".to_string()));
        assert_eq!(mock.requests(), requests);
    }

    #[test]
    fn test_corrupt_index() {
        let (_dir, mock, client) = setup();
        mock.serve(PACKAGES_URL, "packages-2", b"this is not gzip".to_vec());
        let err = client.query_package("tar").unwrap_err();
        assert_eq!(*err, ErrorKind::Index(PACKAGES_URL.to_string()));
    }

    #[test]
    fn test_missing_index() {
        let (_dir, _mock, client) = setup();
        let client = Client { distribution: "trixie".to_string(), ..client };
        let err = client.query_package("tar").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Transport(_)));
    }

    #[test]
    fn test_builder_requires_settings() {
        let err = Client::builder().mirror(MIRROR).arch("amd64").cache_dir("/tmp").build().err().unwrap();
        assert_eq!(*err, ErrorKind::Incomplete("distribution"));
    }
}
