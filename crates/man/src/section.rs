use crate::error::{Error, ErrorKind};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// A manual section, as found in Debian's `usr/share/man/man{N}` tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    /// `1`: user commands.
    Commands,
    /// `n`: Tcl/Tk.
    New,
    /// `l`: local.
    Local,
    /// `8`: system administration.
    Admin,
    /// `3`: library calls.
    Library,
    /// `0`: header files (POSIX `0p` lineage).
    Headers,
    /// `2`: system calls.
    SystemCalls,
    /// `3posix`
    Posix,
    /// `3pm`
    PerlModules,
    /// `3perl`
    Perl,
    /// `3am`: GNU awk extensions.
    Awk,
    /// `5`: file formats.
    FileFormats,
    /// `4`: devices.
    Devices,
    /// `9`: kernel routines.
    Kernel,
    /// `6`: games.
    Games,
    /// `7`: miscellaneous.
    Miscellaneous,
}

impl Section {
    /// Every known section, in the order pages are looked up and delivered.
    /// Mirrors man-db's default search order.
    pub const PRIORITY: [Section; 16] = [
        Section::Commands,
        Section::New,
        Section::Local,
        Section::Admin,
        Section::Library,
        Section::Headers,
        Section::SystemCalls,
        Section::Posix,
        Section::PerlModules,
        Section::Perl,
        Section::Awk,
        Section::FileFormats,
        Section::Devices,
        Section::Kernel,
        Section::Games,
        Section::Miscellaneous,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Commands => "1",
            Section::New => "n",
            Section::Local => "l",
            Section::Admin => "8",
            Section::Library => "3",
            Section::Headers => "0",
            Section::SystemCalls => "2",
            Section::Posix => "3posix",
            Section::PerlModules => "3pm",
            Section::Perl => "3perl",
            Section::Awk => "3am",
            Section::FileFormats => "5",
            Section::Devices => "4",
            Section::Kernel => "9",
            Section::Games => "6",
            Section::Miscellaneous => "7",
        }
    }

    /// The `man{N}` directory a page of this section lives in. Only the first
    /// character counts, so `3posix` pages sit in `man3`.
    #[must_use]
    pub fn directory(&self) -> String {
        let first = &self.as_str()[..1];
        format!("man{first}")
    }

    /// `{page}.{section}.gz`
    #[must_use]
    pub fn file_name(&self, page: &str) -> String {
        format!("{page}.{self}.gz")
    }

    /// Where `page` would be installed by a package, relative to the root.
    ///
    /// ```
    /// use manget_man::Section;
    ///
    /// assert_eq!(Section::Posix.candidate_path("printf"), "usr/share/man/man3/printf.3posix.gz");
    /// ```
    #[must_use]
    pub fn candidate_path(&self, page: &str) -> String {
        format!("usr/share/man/{}/{}", self.directory(), self.file_name(page))
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Section {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Section::PRIORITY.into_iter().find(|section| section.as_str() == s) {
            Some(section) => Ok(section),
            None => exn::bail!(ErrorKind::UnknownSection(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[test]
    fn test_priority_order() {
        let names: Vec<_> = Section::PRIORITY.iter().map(Section::as_str).collect();
        assert_eq!(names, [
            "1", "n", "l", "8", "3", "0", "2", "3posix", "3pm", "3perl", "3am", "5", "4", "9", "6", "7"
        ]);
    }

    #[test]
    fn test_priority_has_no_duplicates() {
        let unique: HashSet<_> = Section::PRIORITY.into_iter().collect();
        assert_eq!(unique.len(), Section::PRIORITY.len());
    }

    #[rstest]
    #[case(Section::Commands, "tar", "usr/share/man/man1/tar.1.gz")]
    #[case(Section::FileFormats, "tar", "usr/share/man/man5/tar.5.gz")]
    #[case(Section::PerlModules, "File::Temp", "usr/share/man/man3/File::Temp.3pm.gz")]
    #[case(Section::New, "wish", "usr/share/man/mann/wish.n.gz")]
    fn test_candidate_path(#[case] section: Section, #[case] page: &str, #[case] expected: &str) {
        assert_eq!(section.candidate_path(page), expected);
    }

    #[test]
    fn test_from_str() {
        for section in Section::PRIORITY {
            assert_eq!(section.as_str().parse::<Section>().unwrap(), section);
        }
        let err = "3x".parse::<Section>().unwrap_err();
        assert_eq!(*err, ErrorKind::UnknownSection("3x".to_string()));
    }
}
