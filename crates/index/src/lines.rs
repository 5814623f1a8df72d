use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::{BufRead, BufReader, Read};

/// Long `Description:` fields in real indices blow straight past the usual
/// 64KiB line limits of other tooling. `read_until` grows as needed, but start
/// big enough that it almost never has to.
const BUFFER_SIZE: usize = 128 * 1024;

/// Line cursor shared by both index readers.
pub(crate) struct Lines<R> {
    reader: BufReader<R>,
    raw: Vec<u8>,
    line: String,
    index: &'static str,
}

impl<R: Read> Lines<R> {
    pub(crate) fn new(reader: R, index: &'static str) -> Self {
        Self {
            reader: BufReader::with_capacity(BUFFER_SIZE, reader),
            raw: Vec::new(),
            line: String::new(),
            index,
        }
    }

    /// Next line without its terminator, or `None` at end of input.
    pub(crate) fn next_line(&mut self) -> Result<Option<&str>> {
        self.raw.clear();
        let index = self.index;
        let read = self.reader.read_until(b'\n', &mut self.raw).or_raise(|| ErrorKind::Read(index))?;
        if read == 0 {
            return Ok(None);
        }
        while matches!(self.raw.last(), Some(b'\n' | b'\r')) {
            self.raw.pop();
        }
        // Indices are UTF-8 in practice; a stray Latin-1 maintainer name
        // shouldn't take the whole scan down with it.
        self.line.clear();
        self.line.push_str(&String::from_utf8_lossy(&self.raw));
        Ok(Some(&self.line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_line_endings() {
        let mut lines = Lines::new(&b"one\r\ntwo\n\nthree"[..], "test");
        assert_eq!(lines.next_line().unwrap(), Some("one"));
        assert_eq!(lines.next_line().unwrap(), Some("two"));
        assert_eq!(lines.next_line().unwrap(), Some(""));
        assert_eq!(lines.next_line().unwrap(), Some("three"));
        assert_eq!(lines.next_line().unwrap(), None);
    }

    #[test]
    fn test_line_longer_than_buffer() {
        let long = "x".repeat(BUFFER_SIZE * 3);
        let input = format!("{long}\nshort\n");
        let mut lines = Lines::new(input.as_bytes(), "test");
        assert_eq!(lines.next_line().unwrap().map(str::len), Some(BUFFER_SIZE * 3));
        assert_eq!(lines.next_line().unwrap(), Some("short"));
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut lines = Lines::new(&b"Maintainer: Andr\xe9\n"[..], "test");
        assert_eq!(lines.next_line().unwrap(), Some("Maintainer: Andr\u{FFFD}"));
    }
}
