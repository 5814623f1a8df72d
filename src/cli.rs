//! Command-line arguments.

use crate::error::{ErrorKind, Result};
use clap::{ArgAction, Parser};
use exn::ResultExt;
use manget_config::Overrides;
use manget_man::Section;
use std::path::PathBuf;

const EXAMPLES: &str = "\
Examples:
  man-get tar ed
  man-get 1 haproxy
  man-get -s 3posix printf
  man-get --pager --release trixie systemctl";

#[derive(Debug, Parser)]
#[command(name = "man-get", version)]
#[command(about = "Fetch Debian manual pages without installing the packages that ship them")]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Pages to fetch, optionally preceded by a single-digit section
    #[arg(value_name = "[SECTION] PAGE", required = true, num_args = 1..)]
    pub args: Vec<String>,

    /// Only fetch this section (any of 1 n l 8 3 0 2 3posix 3pm 3perl 3am 5 4 9 6 7)
    #[arg(short, long)]
    pub section: Option<String>,

    /// Show pages through the formatter and pager instead of storing them
    #[arg(short, long)]
    pub pager: bool,

    /// Debian mirror to use
    #[arg(short, long)]
    pub mirror: Option<String>,

    /// Debian release to use
    #[arg(short, long)]
    pub release: Option<String>,

    /// Package architecture to use
    #[arg(short, long)]
    pub arch: Option<String>,

    /// Configuration file (defaults to config.toml in the user config directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More logging; repeat for more
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// No logging at all
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Split the positionals into requested sections and page names.
    ///
    /// With two or more positionals, a leading single digit is a section
    /// (`man-get 1 haproxy`). Without any section, every known section is
    /// requested in priority order.
    pub fn request(&self) -> Result<(Vec<Section>, Vec<String>)> {
        let (positional, pages) = match self.args.as_slice() {
            [first, rest @ ..] if !rest.is_empty() && is_section_digit(first) => (Some(first), rest),
            all => (None, all),
        };
        let section = match (&self.section, positional) {
            (Some(flag), Some(digit)) => {
                exn::bail!(ErrorKind::Usage(format!("section given twice: --section {flag} and {digit}")))
            },
            (Some(name), None) | (None, Some(name)) => Some(name),
            (None, None) => None,
        };
        let sections = match section {
            Some(name) => {
                let section = name.parse::<Section>().or_raise(|| ErrorKind::Usage(format!("unknown section: {name}")))?;
                vec![section]
            },
            None => Section::PRIORITY.to_vec(),
        };
        Ok((sections, pages.to_vec()))
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            mirror: self.mirror.clone(),
            release: self.release.clone(),
            arch: self.arch.clone(),
            ..Overrides::default()
        }
    }
}

fn is_section_digit(arg: &str) -> bool {
    arg.len() == 1 && arg.bytes().all(|b| b.is_ascii_digit())
}
