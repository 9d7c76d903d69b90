//! Byte-level transports to the device CLI.
//!
//! A [`Transport`] moves raw bytes; prompt handling lives in the channel and
//! driver layers so the same logic runs over telnet and SSH. A [`Connector`]
//! picks and opens the transport for a device descriptor.

pub mod config;
mod ssh;
mod telnet;

pub use config::{HostKeyVerification, TransportConfig};
pub use ssh::SshTransport;
pub use telnet::{TelnetCodec, TelnetTransport};

use async_trait::async_trait;
use secrecy::ExposeSecret;

use crate::device::{DeviceDescriptor, TransportKind};
use crate::error::Result;

/// A connected, bidirectional byte stream to a device CLI.
#[async_trait]
pub trait Transport: Send {
    /// Write raw bytes.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Wait for the next non-empty chunk of output.
    ///
    /// Returns `ConnectionError::Closed` once the remote side hangs up.
    async fn recv(&mut self) -> Result<Vec<u8>>;

    /// Close the connection.
    async fn close(&mut self) -> Result<()>;

    /// Line terminator the remote CLI expects.
    fn newline(&self) -> &'static str {
        "\n"
    }
}

/// Opens transports for device descriptors.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect to `device`. Authentication that happens in-band (telnet)
    /// is left to the driver.
    async fn connect(
        &self,
        device: &DeviceDescriptor,
        config: &TransportConfig,
    ) -> Result<Box<dyn Transport>>;
}

/// Connector that opens real network connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkConnector;

#[async_trait]
impl Connector for NetworkConnector {
    async fn connect(
        &self,
        device: &DeviceDescriptor,
        config: &TransportConfig,
    ) -> Result<Box<dyn Transport>> {
        let port = device.resolved_port();
        match device.transport {
            TransportKind::Telnet => {
                let transport = TelnetTransport::connect(&device.host, port, config).await?;
                Ok(Box::new(transport))
            }
            TransportKind::Ssh => {
                let transport = SshTransport::connect(
                    &device.host,
                    port,
                    &device.username,
                    device.password.expose_secret(),
                    config,
                )
                .await?;
                Ok(Box::new(transport))
            }
        }
    }
}
