//! `man-get`: fetch Debian manual pages without installing their packages.

mod cli;
mod error;

use crate::cli::Cli;
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use manget_apt::Client;
use manget_config::{Config, display_path};
use manget_man::{Delivery, PageFetcher, PageReport, PageSink, PageStore, Pager};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const MANPATH_HINT: &str = "Append {short} to your MANPATH to open the downloaded manpages:

\tBash/Zsh:
\t$ export MANPATH=\"$MANPATH:{full}\"

\tFish:
\t$ set -x MANPATH \"$MANPATH:{full}\"";

/// `RUST_LOG` wins unless `-v` or `-q` says otherwise.
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = match (quiet, verbose) {
        (true, _) => EnvFilter::new("off"),
        (false, 0) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        (false, 1) => EnvFilter::new("info"),
        (false, 2) => EnvFilter::new("debug"),
        (false, _) => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).compact().init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Failed: {err:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    let (sections, pages) = cli.request()?;
    let config = Config::load(cli.config.as_deref(), &cli.overrides()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(?config, "configuration loaded");

    let client = Client::builder()
        .mirror(&config.mirror)
        .distribution(&config.release)
        .arch(&config.arch)
        .cache_dir(&config.cache_dir)
        .timeout(config.timeout())
        .build()
        .or_raise(|| ErrorKind::Setup)?;
    let fetcher = PageFetcher::new(client);

    let mut stored = false;
    let mut sink: Box<dyn PageSink> = if cli.pager {
        Box::new(Pager::from_env(&config.formatter))
    } else {
        Box::new(PageStore::new(&config.data_dir))
    };
    fetcher
        .run(&pages, &sections, sink.as_mut(), |outcome| stored |= report(outcome))
        .or_raise(|| ErrorKind::Fetch)?;

    if stored {
        eprintln!("\n{}", manpath_hint(&config.data_dir));
    }
    Ok(())
}

/// Tell the user what happened to one page. `true` if anything was written
/// to disk.
fn report(outcome: &PageReport) -> bool {
    match outcome {
        PageReport::Missing { page } => {
            eprintln!("No sections found for page {page}");
            false
        },
        PageReport::Fetched { page, deliveries } => {
            let mut stored = false;
            for (section, delivery) in deliveries {
                if let Delivery::Stored(path) = delivery {
                    eprintln!("Downloaded {}({section}) to {}", page.to_uppercase(), display_path(path));
                    stored = true;
                }
            }
            stored
        },
    }
}

fn manpath_hint(data_dir: &Path) -> String {
    MANPATH_HINT.replace("{short}", &display_path(data_dir)).replace("{full}", &data_dir.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use manget_man::Section;
    use std::path::PathBuf;

    #[test]
    fn test_manpath_hint() {
        let hint = manpath_hint(Path::new("/srv/man-get"));
        assert!(hint.starts_with("Append ") && hint.contains(" to your MANPATH"));
        assert!(hint.contains("export MANPATH=\"$MANPATH:/srv/man-get\""));
        assert!(hint.contains("set -x MANPATH \"$MANPATH:/srv/man-get\""));
    }

    #[test]
    fn test_report() {
        assert!(!report(&PageReport::Missing { page: "tar".to_string() }));
        assert!(!report(&PageReport::Fetched {
            page: "tar".to_string(),
            deliveries: vec![(Section::Commands, Delivery::Displayed)],
        }));
        assert!(report(&PageReport::Fetched {
            page: "tar".to_string(),
            deliveries: vec![(Section::Commands, Delivery::Stored(PathBuf::from("/srv/man1/tar.1.gz")))],
        }));
    }
}
