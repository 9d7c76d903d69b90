//! Telnet transport over a plain TCP stream.
//!
//! Only as much of RFC 854 as a Cisco vty line needs: every option the
//! server offers is refused except remote echo and suppress-go-ahead, and
//! every option the server asks us to enable is refused. Negotiation bytes
//! never reach the prompt matcher.

use async_trait::async_trait;
use log::{debug, trace};
use memchr::memchr;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use super::Transport;
use super::config::TransportConfig;
use crate::error::{ConnectionError, Result};

const IAC: u8 = 255;
const DONT: u8 = 254;
const DO: u8 = 253;
const WONT: u8 = 252;
const WILL: u8 = 251;
const SB: u8 = 250;
const SE: u8 = 240;

const OPT_ECHO: u8 = 1;
const OPT_SGA: u8 = 3;

/// Decoder position within the telnet byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Data,
    Iac,
    Negotiate(u8),
    Sub,
    SubIac,
}

/// Output of one [`TelnetCodec::decode`] call.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Decoded {
    /// Application data with all telnet commands removed.
    pub data: Vec<u8>,

    /// Negotiation replies that must be written back to the server.
    pub reply: Vec<u8>,
}

/// Incremental telnet command stripper and option negotiator.
///
/// State is kept between calls so sequences split across TCP reads are
/// handled.
#[derive(Debug)]
pub struct TelnetCodec {
    state: State,
}

impl TelnetCodec {
    pub fn new() -> Self {
        Self { state: State::Data }
    }

    /// Strip commands from `input`, collecting data and replies.
    pub fn decode(&mut self, input: &[u8]) -> Decoded {
        let mut out = Decoded::default();
        let mut rest = input;

        while !rest.is_empty() {
            if self.state == State::Data {
                match memchr(IAC, rest) {
                    Some(pos) => {
                        out.data.extend_from_slice(&rest[..pos]);
                        self.state = State::Iac;
                        rest = &rest[pos + 1..];
                    }
                    None => {
                        out.data.extend_from_slice(rest);
                        break;
                    }
                }
                continue;
            }

            let byte = rest[0];
            rest = &rest[1..];

            self.state = match self.state {
                State::Iac => match byte {
                    IAC => {
                        out.data.push(IAC);
                        State::Data
                    }
                    WILL | WONT | DO | DONT => State::Negotiate(byte),
                    SB => State::Sub,
                    // GA, NOP, AYT and friends carry no payload
                    _ => State::Data,
                },
                State::Negotiate(command) => {
                    Self::negotiate(command, byte, &mut out.reply);
                    State::Data
                }
                State::Sub => {
                    if byte == IAC {
                        State::SubIac
                    } else {
                        State::Sub
                    }
                }
                State::SubIac => {
                    if byte == SE {
                        State::Data
                    } else {
                        State::Sub
                    }
                }
                State::Data => {
                    out.data.push(byte);
                    State::Data
                }
            };
        }

        out
    }

    fn negotiate(command: u8, option: u8, reply: &mut Vec<u8>) {
        let answer = match command {
            WILL if matches!(option, OPT_ECHO | OPT_SGA) => DO,
            WILL => DONT,
            DO => WONT,
            // Acknowledgements of our own refusals
            _ => return,
        };
        trace!("telnet: option {} {} -> {}", option, command, answer);
        reply.extend_from_slice(&[IAC, answer, option]);
    }

    /// Escape literal 0xFF bytes in outgoing data.
    pub fn encode(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len());
        for &byte in data {
            if byte == IAC {
                out.push(IAC);
            }
            out.push(byte);
        }
        out
    }
}

impl Default for TelnetCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Telnet transport, generic over the byte stream for testing.
pub struct TelnetTransport<S = TcpStream> {
    stream: S,
    codec: TelnetCodec,
    read_buf: Vec<u8>,
}

impl TelnetTransport<TcpStream> {
    /// Open a TCP connection to `host:port`.
    pub async fn connect(host: &str, port: u16, config: &TransportConfig) -> Result<Self> {
        let stream = tokio::time::timeout(config.timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| ConnectionError::Timeout(config.timeout))?
            .map_err(|source| ConnectionError::ConnectionFailed {
                host: host.to_string(),
                port,
                source,
            })?;

        stream.set_nodelay(true).map_err(ConnectionError::Io)?;
        debug!("telnet: connected to {}:{}", host, port);

        Ok(Self::from_stream(stream))
    }
}

impl<S> TelnetTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already connected stream.
    pub fn from_stream(stream: S) -> Self {
        Self {
            stream,
            codec: TelnetCodec::new(),
            read_buf: vec![0; 8192],
        }
    }
}

#[async_trait]
impl<S> Transport for TelnetTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.stream
            .write_all(&TelnetCodec::encode(data))
            .await
            .map_err(ConnectionError::Io)?;
        self.stream.flush().await.map_err(ConnectionError::Io)?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Vec<u8>> {
        loop {
            let n = self
                .stream
                .read(&mut self.read_buf)
                .await
                .map_err(ConnectionError::Io)?;
            if n == 0 {
                return Err(ConnectionError::Closed.into());
            }

            let decoded = self.codec.decode(&self.read_buf[..n]);
            if !decoded.reply.is_empty() {
                self.stream
                    .write_all(&decoded.reply)
                    .await
                    .map_err(ConnectionError::Io)?;
            }
            if !decoded.data.is_empty() {
                return Ok(decoded.data);
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.stream.shutdown().await.map_err(ConnectionError::Io)?;
        Ok(())
    }

    fn newline(&self) -> &'static str {
        "\r\n"
    }
}
