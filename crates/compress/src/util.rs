use crate::Compression;
use std::fmt::{Display, Formatter, Result as FmtResult};

impl Display for Compression {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}

impl Compression {
    /// Returns the short name (for logging and displaying to user)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::Gzip => "gzip",
            #[cfg(feature = "xz")]
            Compression::Xz => "xz",
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::Compression;

    #[test]
    fn test_display() {
        assert_eq!(Compression::Gzip.to_string(), "gzip");
        #[cfg(feature = "xz")]
        assert_eq!(Compression::Xz.to_string(), "xz");
    }
}
