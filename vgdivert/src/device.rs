//! Device descriptor supplied by the caller for each operation.

use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer};

/// How the CLI session reaches the device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Unencrypted telnet, the usual way into older voice gateways.
    #[default]
    Telnet,

    /// SSH with password authentication.
    Ssh,
}

impl TransportKind {
    /// Well-known port for this transport.
    pub fn default_port(self) -> u16 {
        match self {
            TransportKind::Telnet => 23,
            TransportKind::Ssh => 22,
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Telnet => f.write_str("telnet"),
            TransportKind::Ssh => f.write_str("ssh"),
        }
    }
}

/// Connection details and credentials for one gateway.
///
/// Owned by the caller; the driver only borrows it for the duration of a
/// single operation. Credentials are redacted from `Debug` output.
///
/// ```
/// use vgdivert::{DeviceDescriptor, TransportKind};
///
/// let device = DeviceDescriptor::new("10.0.0.1", "cisco", "cisco")
///     .with_secret("enable-me")
///     .with_transport(TransportKind::Telnet);
/// assert_eq!(device.resolved_port(), 23);
/// ```
#[derive(Debug, Deserialize)]
pub struct DeviceDescriptor {
    /// Hostname or IP address.
    pub host: String,

    /// Port; defaults to the transport's well-known port.
    #[serde(default)]
    pub port: Option<u16>,

    /// Login username.
    pub username: String,

    /// Login password.
    #[serde(deserialize_with = "deserialize_secret")]
    pub password: SecretString,

    /// Privileged-mode (`enable`) secret.
    #[serde(default, deserialize_with = "deserialize_optional_secret")]
    pub secret: Option<SecretString>,

    /// Transport used to reach the CLI.
    #[serde(default)]
    pub transport: TransportKind,
}

impl DeviceDescriptor {
    /// Create a telnet descriptor with no separate enable secret.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: None,
            username: username.into(),
            password: SecretString::from(password.into()),
            secret: None,
            transport: TransportKind::default(),
        }
    }

    /// Set an explicit port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the privileged-mode secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(SecretString::from(secret.into()));
        self
    }

    /// Set the transport kind.
    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        self.transport = transport;
        self
    }

    /// The port to connect to.
    pub fn resolved_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.transport.default_port())
    }

    /// The secret sent at the `enable` password prompt.
    ///
    /// Falls back to the login password when no secret is configured.
    pub fn enable_secret(&self) -> &SecretString {
        self.secret.as_ref().unwrap_or(&self.password)
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

fn deserialize_optional_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}
