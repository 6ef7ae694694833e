use std::io::BufRead;

use super::reader::Input;
use crate::error::YamlResult;

/// Input pulling lines from any [`BufRead`] source.
///
/// `read_line` enforces UTF-8, so decoding failures and I/O errors both
/// surface as [`crate::YamlError::Io`].
pub struct BufInput<R> {
    inner: R,
    line: String,
    pos: usize,
}

impl<R: BufRead> BufInput<R> {
    pub fn new(inner: R) -> BufInput<R> {
        BufInput {
            inner,
            line: String::new(),
            pos: 0,
        }
    }
}

impl<R: BufRead> Input for BufInput<R> {
    fn next_char(&mut self) -> YamlResult<Option<char>> {
        if self.pos >= self.line.len() {
            self.line.clear();
            self.pos = 0;
            if self.inner.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
        }
        let c = self.line[self.pos..].chars().next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::YamlError;
    use std::io::Cursor;

    #[test]
    fn yields_chars_across_lines() {
        let mut input = BufInput::new(Cursor::new("ab\ncd"));
        let mut out = String::new();
        while let Some(c) = input.next_char().unwrap() {
            out.push(c);
        }
        assert_eq!(out, "ab\ncd");
    }

    #[test]
    fn invalid_utf8_is_an_io_error() {
        let mut input = BufInput::new(Cursor::new(vec![0x61, 0xff, 0xfe]));
        let err = loop {
            match input.next_char() {
                Ok(Some(_)) => {}
                Ok(None) => panic!("expected a decoding error"),
                Err(err) => break err,
            }
        };
        assert!(matches!(err, YamlError::Io(_)));
    }
}
