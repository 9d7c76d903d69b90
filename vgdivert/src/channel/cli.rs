//! Line-oriented channel over a byte transport.

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use tokio::time::Instant;

use super::buffer::PatternBuffer;
use crate::error::{ConnectionError, Result};
use crate::transport::Transport;

/// Output read up to a pattern match.
#[derive(Debug)]
pub struct ReadResult {
    /// Cleaned output, including the matched text at the end.
    pub data: Vec<u8>,

    /// Index of the pattern that matched.
    pub matched: usize,
}

impl ReadResult {
    /// Get the data as a string (lossy UTF-8).
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}

/// A CLI session channel: sends lines, reads until a prompt appears.
pub struct CliChannel {
    transport: Box<dyn Transport>,
    buffer: PatternBuffer,
}

impl CliChannel {
    /// Wrap a connected transport.
    pub fn new(transport: Box<dyn Transport>, search_depth: usize) -> Self {
        Self {
            transport,
            buffer: PatternBuffer::new(search_depth),
        }
    }

    /// Send one line, terminated the way the transport expects.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        let mut data = String::with_capacity(line.len() + 2);
        data.push_str(line);
        data.push_str(self.transport.newline());
        self.transport.send(data.as_bytes()).await
    }

    /// Read until one of `patterns` matches the tail of the output.
    ///
    /// Patterns are checked in order, so list more specific ones first.
    /// Everything buffered so far is returned and the buffer is reset.
    pub async fn read_until(&mut self, patterns: &[&Regex], timeout: Duration) -> Result<ReadResult> {
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(matched) = patterns.iter().position(|p| self.buffer.tail_contains(p)) {
                return Ok(ReadResult {
                    data: self.buffer.take(),
                    matched,
                });
            }

            let chunk = tokio::time::timeout_at(deadline, self.transport.recv())
                .await
                .map_err(|_| ConnectionError::Timeout(timeout))??;

            trace!("channel: {} bytes: {:?}", chunk.len(), String::from_utf8_lossy(&chunk));
            self.buffer.extend(&chunk);
        }
    }

    /// Close the underlying transport.
    pub async fn close(mut self) -> Result<()> {
        self.transport.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;

    #[tokio::test]
    async fn test_read_until_reports_matching_pattern() {
        let transport = ScriptedTransport::new(vec![b"banner\r\n".to_vec(), b"Username: ".to_vec()]);
        let mut channel = CliChannel::new(Box::new(transport), 1000);

        let prompt = Regex::new(r"(?m)^\S+#\z").unwrap();
        let username = Regex::new(r"(?mi)^username: ?\z").unwrap();

        let result = channel
            .read_until(&[&prompt, &username], Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(result.matched, 1);
        assert_eq!(result.as_str(), "banner\nUsername: ");
    }

    #[tokio::test]
    async fn test_read_until_times_out() {
        let transport = ScriptedTransport::new(vec![b"no prompt here".to_vec()]).hang_when_empty();
        let mut channel = CliChannel::new(Box::new(transport), 1000);

        let prompt = Regex::new(r"#\z").unwrap();
        let err = channel
            .read_until(&[&prompt], Duration::from_millis(50))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            crate::Error::Connection(ConnectionError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn test_read_until_surfaces_closed_channel() {
        let transport = ScriptedTransport::new(vec![b"partial".to_vec()]);
        let mut channel = CliChannel::new(Box::new(transport), 1000);

        let prompt = Regex::new(r"#\z").unwrap();
        let err = channel
            .read_until(&[&prompt], Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            crate::Error::Connection(ConnectionError::Closed)
        ));
    }
}
