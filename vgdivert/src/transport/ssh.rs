//! SSH transport implementation using russh.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, warn};
use russh::client::{self, Handle, Msg};
use russh::keys::PublicKey;
use russh::{Channel, ChannelMsg};

use super::Transport;
use super::config::{HostKeyVerification, TransportConfig};
use crate::error::{AuthenticationError, ConnectionError, Result};

/// SSH transport: one authenticated session with a single PTY shell channel.
pub struct SshTransport {
    /// The russh session handle.
    session: Handle<SshHandler>,

    /// Interactive shell channel.
    channel: Channel<Msg>,
}

impl SshTransport {
    /// Connect, authenticate with a password and open a shell.
    pub async fn connect(
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        config: &TransportConfig,
    ) -> Result<Self> {
        let ssh_config = Arc::new(client::Config {
            inactivity_timeout: Some(config.timeout),
            ..Default::default()
        });

        let host_key_error: Arc<Mutex<Option<ConnectionError>>> = Arc::new(Mutex::new(None));

        let handler = SshHandler {
            host: host.to_string(),
            port,
            host_key_verification: config.host_key_verification.clone(),
            known_hosts_path: config.known_hosts_path.clone(),
            host_key_error: host_key_error.clone(),
        };

        let mut session = tokio::time::timeout(
            config.timeout,
            client::connect(ssh_config, (host, port), handler),
        )
        .await
        .map_err(|_| ConnectionError::Timeout(config.timeout))?
        .map_err(|e| {
            // Prefer the detailed host key error over russh's generic one
            host_key_error
                .lock()
                .ok()
                .and_then(|mut slot| slot.take())
                .unwrap_or(ConnectionError::Ssh(e))
        })?;

        let authenticated = session
            .authenticate_password(username, password)
            .await
            .map_err(ConnectionError::Ssh)?
            .success();

        if !authenticated {
            return Err(AuthenticationError::LoginRejected {
                user: username.to_string(),
            }
            .into());
        }
        debug!("ssh: authenticated to {}:{} as {}", host, port, username);

        let channel = Self::open_shell(&session, config).await?;

        Ok(Self { session, channel })
    }

    async fn open_shell(
        session: &Handle<SshHandler>,
        config: &TransportConfig,
    ) -> Result<Channel<Msg>> {
        let channel = session
            .channel_open_session()
            .await
            .map_err(ConnectionError::Ssh)?;

        channel
            .request_pty(
                true,
                "vt100",
                config.terminal_width,
                config.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(ConnectionError::Ssh)?;

        channel
            .request_shell(true)
            .await
            .map_err(ConnectionError::Ssh)?;

        Ok(channel)
    }
}

#[async_trait]
impl Transport for SshTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        self.channel
            .data(data)
            .await
            .map_err(ConnectionError::Ssh)?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Vec<u8>> {
        loop {
            match self.channel.wait().await {
                Some(ChannelMsg::Data { data }) => return Ok(data.to_vec()),
                Some(ChannelMsg::ExtendedData { data, .. }) => return Ok(data.to_vec()),
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    return Err(ConnectionError::Closed.into());
                }
                Some(_) => continue,
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Err(e) = self.channel.eof().await {
            debug!("ssh: eof on close failed: {}", e);
        }
        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await
            .map_err(ConnectionError::Ssh)?;
        Ok(())
    }
}

/// SSH client handler for russh.
struct SshHandler {
    host: String,
    port: u16,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    /// Detailed host-key error surfaced by `connect()` in place of
    /// russh's generic `UnknownKey`.
    host_key_error: Arc<Mutex<Option<ConnectionError>>>,
}

impl SshHandler {
    /// Check the host key against known_hosts.
    ///
    /// Returns `Ok(true)` if matched, `Ok(false)` if host not found,
    /// `Err(ConnectionError::HostKeyChanged)` if key changed.
    fn check_known_hosts(&self, pubkey: &PublicKey) -> std::result::Result<bool, ConnectionError> {
        let result = if let Some(ref path) = self.known_hosts_path {
            russh::keys::check_known_hosts_path(&self.host, self.port, pubkey, path)
        } else {
            russh::keys::check_known_hosts(&self.host, self.port, pubkey)
        };

        match result {
            Ok(matched) => Ok(matched),
            Err(russh::keys::Error::KeyChanged { line }) => Err(ConnectionError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            }),
            Err(e) => Err(ConnectionError::KnownHosts(e.to_string())),
        }
    }

    /// Save a new host key to known_hosts.
    fn learn_host_key(&self, pubkey: &PublicKey) -> std::result::Result<(), ConnectionError> {
        let result = if let Some(ref path) = self.known_hosts_path {
            russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, pubkey, path)
        } else {
            russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, pubkey)
        };

        result.map_err(|e| ConnectionError::KnownHosts(e.to_string()))
    }

    fn reject(&self, error: ConnectionError) -> bool {
        if let Ok(mut slot) = self.host_key_error.lock() {
            *slot = Some(error);
        }
        false
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        let accepted = match self.host_key_verification {
            HostKeyVerification::Disabled => true,

            HostKeyVerification::AcceptNew => match self.check_known_hosts(server_public_key) {
                Ok(true) => true,
                Ok(false) => {
                    if let Err(e) = self.learn_host_key(server_public_key) {
                        warn!("Failed to save host key: {}", e);
                    }
                    true
                }
                Err(e) => self.reject(e),
            },

            HostKeyVerification::Strict => match self.check_known_hosts(server_public_key) {
                Ok(true) => true,
                Ok(false) => self.reject(ConnectionError::HostKeyUnknown {
                    host: self.host.clone(),
                    port: self.port,
                }),
                Err(e) => self.reject(e),
            },
        };

        Ok(accepted)
    }
}
