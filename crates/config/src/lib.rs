//! Layered configuration for `man-get`.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults (Debian's main mirror, `bookworm`, `amd64`, `mandoc`,
//!    and the platform's cache and data directories for `man-get`),
//! 2. a TOML file, either given explicitly or `config.toml` in the platform
//!    config directory when it exists,
//! 3. `MANGET_*` environment variables (`MANGET_RELEASE=trixie`),
//! 4. [`Overrides`], which the CLI fills from its flags.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::{BaseDirs, ProjectDirs};
use exn::{OptionExt, ResultExt};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_MIRROR: &str = "https://ftp.debian.org/debian";
pub const DEFAULT_RELEASE: &str = "bookworm";
pub const DEFAULT_ARCH: &str = "amd64";
pub const DEFAULT_FORMATTER: &str = "mandoc";

const APPLICATION: &str = "man-get";
const ENV_PREFIX: &str = "MANGET_";
const CONFIG_FILE: &str = "config.toml";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the Debian mirror, without a trailing slash.
    pub mirror: String,
    /// Release codename or suite.
    pub release: String,
    pub arch: String,
    /// Where downloaded indexes and packages are kept, one file per `ETag`.
    pub cache_dir: PathBuf,
    /// Root of the `man{N}` directories pages are stored into.
    pub data_dir: PathBuf,
    /// Command that turns roff into something a pager can show.
    pub formatter: String,
    /// HTTP timeout in seconds. Unset means wait forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Values that beat every other source. Unset fields leave the lower layers
/// alone.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Config {
    /// Built-in defaults. Fails only when the platform directories can't be
    /// worked out, which in practice means there's no home directory.
    pub fn defaults() -> Result<Self> {
        let dirs = project_dirs()?;
        Ok(Self {
            mirror: DEFAULT_MIRROR.to_string(),
            release: DEFAULT_RELEASE.to_string(),
            arch: DEFAULT_ARCH.to_string(),
            cache_dir: dirs.cache_dir().to_path_buf(),
            data_dir: dirs.data_dir().to_path_buf(),
            formatter: DEFAULT_FORMATTER.to_string(),
            timeout: None,
        })
    }

    /// Load and validate the configuration from every layer.
    ///
    /// An explicit `file` must exist; the implicit one in the config
    /// directory is skipped when it doesn't.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::defaults()?));
        match file {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::FileNotFound(path.to_path_buf()));
                }
                figment = figment.merge(Toml::file(path));
            },
            None => {
                let path = project_dirs()?.config_dir().join(CONFIG_FILE);
                debug!(path = %path.display(), exists = path.is_file(), "implicit configuration file");
                figment = figment.merge(Toml::file(path));
            },
        }
        let config: Self = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(overrides))
            .extract()
            .or_raise(|| ErrorKind::Load)?;
        config.validate()
    }

    /// Normalize and check the values no layer is trusted to get right.
    pub fn validate(mut self) -> Result<Self> {
        let mirror = self.mirror.trim().trim_end_matches('/');
        if !(mirror.starts_with("http://") || mirror.starts_with("https://")) {
            exn::bail!(ErrorKind::Invalid("mirror"));
        }
        self.mirror = mirror.to_string();
        if self.release.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("release"));
        }
        if self.arch.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("arch"));
        }
        if self.formatter.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("formatter"));
        }
        if self.timeout == Some(0) {
            exn::bail!(ErrorKind::Invalid("timeout"));
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", APPLICATION).ok_or_raise(|| ErrorKind::NoHomeDirectory)
}

/// Abbreviate the home directory to `~` for display. Paths outside the home
/// directory, or with no home directory at all, come back unchanged.
pub fn display_path(path: &Path) -> String {
    BaseDirs::new()
        .and_then(|base| path.strip_prefix(base.home_dir()).ok().map(|rest| Path::new("~").join(rest)))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}
