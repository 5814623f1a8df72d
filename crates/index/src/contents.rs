use crate::error::Result;
use crate::lines::Lines;
use std::io::Read;
use tracing::trace;

/// A single line of the `Contents` index: a file path and every package that
/// ships it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Contents {
    /// Path relative to the filesystem root, without a leading `/`.
    pub file: String,
    /// Qualified `section/name` references, in index order. Never empty.
    pub packages: Vec<String>,
}

impl Contents {
    /// Bare name of the first package that ships this file, with the
    /// `section/` qualifier stripped (`admin/btrfs-progs` -> `btrfs-progs`).
    pub fn first_package_name(&self) -> Option<&str> {
        self.packages
            .first()
            .map(|qualified| qualified.rsplit_once('/').map_or(qualified.as_str(), |(_, name)| name))
    }
}

/// Pull-based reader over a decompressed `Contents` index.
///
/// Every line with exactly two whitespace-separated fields is a record;
/// anything else (paths containing spaces, stray headers) is skipped.
pub struct ContentsReader<R> {
    lines: Lines<R>,
}

impl<R: Read> ContentsReader<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: Lines::new(reader, "Contents") }
    }

    /// Read the next well-formed line, or `None` once the index is exhausted.
    pub fn next_contents(&mut self) -> Result<Option<Contents>> {
        while let Some(line) = self.lines.next_line()? {
            let mut fields = line.split_whitespace();
            if let (Some(file), Some(packages), None) = (fields.next(), fields.next(), fields.next()) {
                return Ok(Some(Contents {
                    file: file.to_string(),
                    packages: packages.split(',').map(str::to_string).collect(),
                }));
            }
            trace!(line, "skipping Contents line without exactly two fields");
        }
        Ok(None)
    }
}

impl<R: Read> Iterator for ContentsReader<R> {
    type Item = Result<Contents>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_contents().transpose()
    }
}
