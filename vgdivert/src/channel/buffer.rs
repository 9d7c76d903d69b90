//! Pattern buffer with efficient tail-search optimization.
//!
//! Prompts are only searched for in the last N bytes of the buffer rather
//! than the entire output, which keeps large `show running-config` reads
//! cheap.

use regex::bytes::Regex;
use vte::{Parser, Perform};

/// Buffer for accumulating output and efficiently searching for patterns.
///
/// Incoming bytes are cleaned before they are stored: ANSI escape sequences,
/// carriage returns, NULs and other control characters are dropped, leaving
/// printable text, newlines and tabs. The escape parser keeps its state
/// between chunks, so a sequence split across reads is still removed.
pub struct PatternBuffer {
    /// The accumulated output buffer.
    buffer: Vec<u8>,

    /// How many bytes from the end to search for patterns.
    search_depth: usize,

    /// Escape sequence parser.
    parser: Parser,
}

impl PatternBuffer {
    /// Create a new pattern buffer with the specified search depth.
    pub fn new(search_depth: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(4096),
            search_depth,
            parser: Parser::new(),
        }
    }

    /// Extend the buffer with new data, stripping terminal control.
    pub fn extend(&mut self, data: &[u8]) {
        let mut printable = Printable(&mut self.buffer);
        self.parser.advance(&mut printable, data);
    }

    /// Search only the last `search_depth` bytes for the pattern.
    ///
    /// Returns the match with byte offsets relative to the start of the
    /// search region (not the full buffer).
    pub fn search_tail(&self, pattern: &Regex) -> Option<regex::bytes::Match<'_>> {
        let start = self.buffer.len().saturating_sub(self.search_depth);
        pattern.find(&self.buffer[start..])
    }

    /// Check if the tail contains a pattern match.
    pub fn tail_contains(&self, pattern: &Regex) -> bool {
        self.search_tail(pattern).is_some()
    }

    /// Take ownership of the buffer contents and reset.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }

    /// Get a reference to the buffer contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for PatternBuffer {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// `vte` performer that keeps printable text, newlines and tabs.
struct Printable<'a>(&'a mut Vec<u8>);

impl Perform for Printable<'_> {
    fn print(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.0.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    fn execute(&mut self, byte: u8) {
        if matches!(byte, b'\n' | b'\t') {
            self.0.push(byte);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extend() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"Hello, world!");
        assert_eq!(buffer.as_slice(), b"Hello, world!");
    }

    #[test]
    fn test_ansi_stripping() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"\x1b[32mGreen text\x1b[0m");
        assert_eq!(buffer.as_slice(), b"Green text");
    }

    #[test]
    fn test_escape_split_across_chunks() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"gw1\x1b[");
        buffer.extend(b"0m#");
        assert_eq!(buffer.as_slice(), b"gw1#");
    }

    #[test]
    fn test_crlf_and_nul_dropped() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"line one\r\nline two\r\0\ngw1>");
        assert_eq!(buffer.as_slice(), b"line one\nline two\ngw1>");
    }

    #[test]
    fn test_tail_search() {
        let mut buffer = PatternBuffer::new(20);
        buffer.extend(&[b'x'; 100]);
        buffer.extend(b"\nrouter#");

        let pattern = Regex::new(r"router#").unwrap();
        assert!(buffer.search_tail(&pattern).is_some());
    }

    #[test]
    fn test_tail_search_not_in_tail() {
        let mut buffer = PatternBuffer::new(10);
        buffer.extend(b"router#");
        buffer.extend(&[b'x'; 100]);

        let pattern = Regex::new(r"router#").unwrap();
        assert!(!buffer.tail_contains(&pattern));
    }

    #[test]
    fn test_take_clears_buffer() {
        let mut buffer = PatternBuffer::new(100);
        buffer.extend(b"test data");
        assert_eq!(buffer.take(), b"test data");
        assert!(buffer.is_empty());
    }
}
