use crate::error::Result;
use crate::lines::Lines;
use std::io::Read;

/// A single paragraph of the `Packages` index.
///
/// Only the two fields needed to go from a package name to a downloadable
/// blob are kept; everything else in the paragraph is skipped over.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Package {
    /// The `Package:` field.
    pub name: String,
    /// The `Filename:` field, relative to the mirror root. Empty when the
    /// paragraph doesn't have one, in which case there's nothing to download.
    pub filename: String,
}

/// Pull-based reader over a decompressed `Packages` index.
///
/// Yields one [`Package`] per blank-line-separated paragraph, in source order.
///
/// # Examples
///
/// ```
/// use manget_index::PackageReader;
///
/// let index = b"Package: zip\nFilename: pool/main/z/zip/zip_3.0_amd64.deb\n\nPackage: unzip\n";
/// let names: Vec<_> = PackageReader::new(&index[..]).map(|p| p.unwrap().name).collect();
/// assert_eq!(names, ["zip", "unzip"]);
/// ```
pub struct PackageReader<R> {
    lines: Lines<R>,
}

impl<R: Read> PackageReader<R> {
    pub fn new(reader: R) -> Self {
        Self { lines: Lines::new(reader, "Packages") }
    }

    /// Read the next paragraph, or `None` once the index is exhausted.
    pub fn next_package(&mut self) -> Result<Option<Package>> {
        let mut package: Option<Package> = None;
        loop {
            let Some(line) = self.lines.next_line()? else {
                // End of input also terminates the paragraph in progress.
                return Ok(package);
            };
            if line.is_empty() {
                match package {
                    Some(_) => return Ok(package),
                    // Runs of blank lines between (or before) paragraphs.
                    None => continue,
                }
            }
            // Only an empty line ends a paragraph. Whitespace is a continuation
            // inside one and noise between them.
            if package.is_none() && line.trim().is_empty() {
                continue;
            }
            let record = package.get_or_insert_with(Package::default);
            // Continuation of a multi-line field (`Description:` mostly). A
            // description line that happens to read " Package: foo" is not a key.
            if line.starts_with([' ', '\t']) {
                continue;
            }
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next()) {
                (Some("Package:"), Some(value)) => record.name = value.to_string(),
                (Some("Filename:"), Some(value)) => record.filename = value.to_string(),
                // Any other key, or a line with fewer than two fields.
                _ => {},
            }
        }
    }
}

impl<R: Read> Iterator for PackageReader<R> {
    type Item = Result<Package>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_package().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manget_compress::Compression;
    use rstest::rstest;

    const PACKAGES: &str = "
Package: zip
Priority: optional
Section: utils
Installed-Size: 100

Package: unzip
Priority: optional
Section: utils
Installed-Size: 100
";

    fn collect(input: &str) -> Vec<Package> {
        PackageReader::new(input.as_bytes()).collect::<Result<Vec<_>>>().unwrap()
    }

    #[test]
    fn test_one_record_per_paragraph() {
        let packages = collect(PACKAGES);
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0], Package { name: "zip".to_string(), filename: String::new() });
        assert_eq!(packages[1], Package { name: "unzip".to_string(), filename: String::new() });
    }

    #[test]
    fn test_filename_is_retained() {
        let packages = collect(
            "Package: tar\nVersion: 1.34+dfsg-1.2\nFilename: pool/main/t/tar/tar_1.34+dfsg-1.2_amd64.deb\nSize: 838964\n",
        );
        assert_eq!(packages, [Package {
            name: "tar".to_string(),
            filename: "pool/main/t/tar/tar_1.34+dfsg-1.2_amd64.deb".to_string(),
        }]);
    }

    #[rstest]
    #[case::empty("")]
    #[case::only_blank_lines("\n\n   \n\n")]
    fn test_no_records(#[case] input: &str) {
        assert!(collect(input).is_empty());
    }

    #[test]
    fn test_multiple_blank_lines_between_paragraphs() {
        let packages = collect("Package: a\n\n\n\n\nPackage: b\n\n\n");
        let names: Vec<_> = packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_short_lines_are_ignored() {
        let packages = collect("Package:\nPackage: sed\nFilename:\nnonsense\n");
        assert_eq!(packages, [Package { name: "sed".to_string(), filename: String::new() }]);
    }

    #[test]
    fn test_continuation_lines_are_not_keys() {
        let packages = collect("Package: real\nDescription: a tool\n Package: fake\n .\n Filename: nope\n");
        assert_eq!(packages, [Package { name: "real".to_string(), filename: String::new() }]);
    }

    #[rstest]
    #[case::spaces("Package: a\n   \nFilename: pool/a.deb\n")]
    #[case::tab("Package: a\n\t\nFilename: pool/a.deb\n")]
    #[case::crlf("Package: a\r\n \r\nFilename: pool/a.deb\r\n")]
    fn test_whitespace_only_line_does_not_split(#[case] input: &str) {
        assert_eq!(collect(input), [Package { name: "a".to_string(), filename: "pool/a.deb".to_string() }]);
    }

    #[test]
    fn test_very_long_description() {
        let description = "word ".repeat(100_000);
        let input = format!("Package: big\nDescription: {description}\nFilename: pool/b/big.deb\n\nPackage: after\n");
        let packages = collect(&input);
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].filename, "pool/b/big.deb");
        assert_eq!(packages[1].name, "after");
    }

    #[test]
    fn test_reads_through_gzip() {
        let compressed = Compression::Gzip.compress(PACKAGES.as_bytes()).unwrap();
        let reader = PackageReader::new(Compression::Gzip.wrap_reader(&compressed[..]));
        let names: Vec<_> = reader.map(|p| p.unwrap().name).collect();
        assert_eq!(names, ["zip", "unzip"]);
    }

    #[test]
    fn test_corrupt_stream_is_an_error() {
        let mut reader = PackageReader::new(Compression::Gzip.wrap_reader(&b"definitely not gzip"[..]));
        assert!(reader.next().unwrap().is_err());
    }
}
