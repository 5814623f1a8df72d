//! Where fetched pages end up.

use crate::Section;
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use manget_deb::Payload;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, instrument};

pub const DEFAULT_PAGER: &str = "less";

/// What a sink did with a page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Written to disk at this path.
    Stored(PathBuf),
    /// Shown to the user and gone.
    Displayed,
}

/// Receiver for extracted pages.
pub trait PageSink {
    /// Which form the sink wants page bytes in.
    fn payload(&self) -> Payload;

    fn accept(&mut self, page: &str, section: Section, bytes: &[u8]) -> Result<Delivery>;
}

/// Keeps pages, still gzipped, in a `man{N}` tree that `MANPATH` can point at.
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `{root}/man{N}/{page}.{section}.gz`
    pub fn page_path(&self, page: &str, section: Section) -> PathBuf {
        self.root.join(section.directory()).join(section.file_name(page))
    }
}

impl PageSink for PageStore {
    fn payload(&self) -> Payload {
        Payload::Raw
    }

    #[instrument(skip(self, bytes), fields(section = %section, size = bytes.len()))]
    fn accept(&mut self, page: &str, section: Section, bytes: &[u8]) -> Result<Delivery> {
        let path = self.page_path(page, section);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).or_raise(|| ErrorKind::Store(parent.to_path_buf()))?;
        }
        fs::write(&path, bytes).or_raise(|| ErrorKind::Store(path.clone()))?;
        debug!(path = %path.display(), "page stored");
        Ok(Delivery::Stored(path))
    }
}

/// Renders pages through a formatter (`mandoc` by default) into a pager.
///
/// Both commands are split on whitespace, so `less -R` works but quoting
/// doesn't.
pub struct Pager {
    formatter: String,
    pager: String,
}

impl Pager {
    pub fn new(formatter: impl Into<String>, pager: impl Into<String>) -> Self {
        Self { formatter: formatter.into(), pager: pager.into() }
    }

    /// Use `$MANPAGER`, then `$PAGER`, then [`DEFAULT_PAGER`].
    pub fn from_env(formatter: impl Into<String>) -> Self {
        let pager = resolve_pager(std::env::var("MANPAGER").ok(), std::env::var("PAGER").ok());
        Self::new(formatter, pager)
    }
}

/// Pick the pager command. Unset and empty variables are skipped.
pub fn resolve_pager(manpager: Option<String>, pager: Option<String>) -> String {
    [manpager, pager]
        .into_iter()
        .flatten()
        .find(|command| !command.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_PAGER.to_string())
}

fn command(line: &str) -> Result<Command> {
    let mut words = line.split_whitespace();
    let program = words.next().ok_or_raise(|| ErrorKind::Command(line.to_string()))?;
    let mut command = Command::new(program);
    command.args(words);
    Ok(command)
}

impl PageSink for Pager {
    fn payload(&self) -> Payload {
        Payload::Decompressed
    }

    #[instrument(skip(self, bytes), fields(section = %section, formatter = %self.formatter, pager = %self.pager))]
    fn accept(&mut self, page: &str, section: Section, bytes: &[u8]) -> Result<Delivery> {
        let mut formatter = command(&self.formatter)?
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .or_raise(|| ErrorKind::Command(self.formatter.clone()))?;
        let mut input = formatter.stdin.take().ok_or_raise(|| ErrorKind::Command(self.formatter.clone()))?;
        let output = formatter.stdout.take().ok_or_raise(|| ErrorKind::Command(self.formatter.clone()))?;

        let mut pager = match command(&self.pager)?.stdin(Stdio::from(output)).spawn() {
            Ok(pager) => pager,
            Err(e) => {
                // Don't leave the formatter blocked on a pipe nobody reads.
                let _ = formatter.kill();
                let _ = formatter.wait();
                return Err(e).or_raise(|| ErrorKind::Command(self.pager.clone()));
            },
        };

        // The formatter may start writing before it has read everything, so
        // feed it from another thread while the pager drains it.
        let (written, paged) = thread::scope(|scope| {
            let writer = scope.spawn(move || input.write_all(bytes));
            let paged = pager.wait();
            let written = writer.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (written, paged)
        });
        let formatted = formatter.wait().or_raise(|| ErrorKind::Command(self.formatter.clone()))?;

        match written {
            // Quitting the pager early closes the pipe under us.
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {},
            result => result.or_raise(|| ErrorKind::Command(self.formatter.clone()))?,
        }
        if !paged.or_raise(|| ErrorKind::Command(self.pager.clone()))?.success() {
            exn::bail!(ErrorKind::Command(self.pager.clone()));
        }
        if !formatted.success() {
            exn::bail!(ErrorKind::Command(self.formatter.clone()));
        }
        debug!(page, "page displayed");
        Ok(Delivery::Displayed)
    }
}
