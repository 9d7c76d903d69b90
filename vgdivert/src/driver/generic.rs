//! Generic driver implementation that works with any platform.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};
use regex::bytes::Regex;
use secrecy::ExposeSecret;

use super::Driver;
use super::privilege::PrivilegeManager;
use super::response::Response;
use crate::channel::CliChannel;
use crate::device::DeviceDescriptor;
use crate::error::{AuthenticationError, ConnectionError, Error, Result};
use crate::platform::{DefaultBehavior, PlatformDefinition, VendorBehavior};
use crate::transport::{Connector, TransportConfig};

/// Generic driver that works with any platform definition.
///
/// This is the session implementation that handles:
/// - Transport setup through a [`Connector`]
/// - In-band username/password login
/// - Privilege level navigation, including secret-protected levels
/// - Command execution with prompt detection and failure markers
///
/// A driver borrows its device descriptor and connector, and is meant to
/// live for exactly one operation.
pub struct GenericDriver<'a> {
    /// Device being driven.
    device: &'a DeviceDescriptor,

    /// Opens the byte transport.
    connector: &'a dyn Connector,

    /// Transport configuration.
    config: TransportConfig,

    /// Platform definition.
    platform: PlatformDefinition,

    /// Vendor behavior implementation.
    behavior: Arc<dyn VendorBehavior>,

    /// CLI channel (None when disconnected).
    channel: Option<CliChannel>,

    /// Privilege level manager.
    privilege_manager: PrivilegeManager,

    /// Default timeout for each prompt wait.
    timeout: Duration,

    /// Combined prompt pattern for all privilege levels.
    prompt_pattern: Regex,
}

impl<'a> GenericDriver<'a> {
    /// Create a new generic driver. No I/O happens until [`Driver::open`].
    pub fn new(
        device: &'a DeviceDescriptor,
        connector: &'a dyn Connector,
        config: TransportConfig,
        platform: PlatformDefinition,
    ) -> Result<Self> {
        let privilege_manager = PrivilegeManager::new(platform.privilege_levels.clone());

        let behavior = platform
            .behavior
            .clone()
            .unwrap_or_else(|| Arc::new(DefaultBehavior));

        let prompt_pattern = Self::build_combined_pattern(&platform)?;

        Ok(Self {
            device,
            connector,
            timeout: config.timeout,
            config,
            platform,
            behavior,
            channel: None,
            privilege_manager,
            prompt_pattern,
        })
    }

    /// Build a combined regex pattern that matches any privilege level's prompt.
    fn build_combined_pattern(platform: &PlatformDefinition) -> Result<Regex> {
        let combined = platform
            .privilege_levels
            .values()
            .map(|level| format!("(?:{})", level.pattern.as_str()))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Regex::new(&combined).map_err(ConnectionError::InvalidPattern)?)
    }

    /// Answer username/password prompts until a device prompt appears.
    ///
    /// Returns the prompt line.
    async fn login(&mut self) -> Result<String> {
        let rejected = || -> Error {
            AuthenticationError::LoginRejected {
                user: self.device.username.clone(),
            }
            .into()
        };

        let channel = self.channel.as_mut().ok_or(ConnectionError::NotConnected)?;
        let patterns = [
            &self.prompt_pattern,
            &self.platform.username_prompt,
            &self.platform.password_prompt,
        ];

        let mut sent_username = false;
        let mut sent_password = false;

        loop {
            let read = channel.read_until(&patterns, self.timeout).await?;
            let output = read.as_str();

            if let Some(marker) = self.platform.find_login_failure(&output) {
                debug!("Login refused by {}: {}", self.device.host, marker);
                return Err(rejected());
            }

            match read.matched {
                0 => return Ok(last_line(&output).to_string()),
                1 if !sent_username => {
                    debug!("Sending username '{}'", self.device.username);
                    channel.send_line(&self.device.username).await?;
                    sent_username = true;
                }
                2 if !sent_password => {
                    debug!("Sending password: <hidden>");
                    channel
                        .send_line(self.device.password.expose_secret())
                        .await?;
                    sent_password = true;
                }
                _ => {
                    debug!("Login prompt repeated by {}", self.device.host);
                    return Err(rejected());
                }
            }
        }
    }

    /// Run a secret-protected escalation such as `enable`.
    async fn escalate_with_secret(&mut self, command: &str, auth: &Regex, target: &str) -> Result<()> {
        let rejected = || -> Error {
            AuthenticationError::EscalationRejected {
                target: target.to_string(),
            }
            .into()
        };

        let channel = self.channel.as_mut().ok_or(ConnectionError::NotConnected)?;
        let patterns = [&self.prompt_pattern, auth];

        channel.send_line(command).await?;
        let mut read = channel.read_until(&patterns, self.timeout).await?;

        if read.matched == 1 {
            debug!("Sending secret for '{}': <hidden>", target);
            channel
                .send_line(self.device.enable_secret().expose_secret())
                .await?;
            read = channel.read_until(&patterns, self.timeout).await?;

            // Asked again: the secret was wrong
            if read.matched == 1 {
                return Err(rejected());
            }
        }

        let output = read.as_str();
        if let Some(marker) = self.platform.find_escalate_failure(&output) {
            debug!("Escalation to '{}' refused: {}", target, marker);
            return Err(rejected());
        }

        let reached = self.privilege_manager.update_from_prompt(last_line(&output))?;
        if reached.name != target {
            debug!("Escalation to '{}' landed at '{}'", target, reached.name);
            return Err(rejected());
        }

        Ok(())
    }
}

impl Driver for GenericDriver<'_> {
    async fn open(&mut self) -> Result<()> {
        if self.channel.is_some() {
            return Err(ConnectionError::AlreadyConnected.into());
        }

        debug!(
            "Connecting to {}:{} over {}",
            self.device.host,
            self.device.resolved_port(),
            self.device.transport
        );
        let transport = self.connector.connect(self.device, &self.config).await?;
        self.channel = Some(CliChannel::new(transport, self.config.search_depth));

        let prompt = self.login().await?;
        let level = self.privilege_manager.update_from_prompt(&prompt)?;
        debug!("Logged in to {} at '{}'", self.device.host, level.name);

        let default = self.platform.default_privilege.clone();
        self.acquire_privilege(&default).await?;

        for command in self.platform.on_open_commands.clone() {
            self.send_command(&command).await?.into_result()?;
        }

        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(channel) = self.channel.take() {
            debug!("Closing session to {}", self.device.host);
            channel.close().await?;
        }
        Ok(())
    }

    async fn send_command(&mut self, command: &str) -> Result<Response> {
        let channel = self.channel.as_mut().ok_or(ConnectionError::NotConnected)?;

        let start = Instant::now();
        debug!("Sending command: {}", command);
        channel.send_line(command).await?;

        let read = channel
            .read_until(&[&self.prompt_pattern], self.timeout)
            .await?;
        let elapsed = start.elapsed();

        let raw_result = read.as_str().into_owned();
        let prompt = last_line(&raw_result).trim().to_string();
        self.privilege_manager.update_from_prompt(&prompt)?;

        let result = self.behavior.normalize_output(&raw_result, command);
        let response = Response::new(command, result, raw_result, prompt, elapsed);

        let failure = self
            .behavior
            .detect_failure(&response.result)
            .or_else(|| self.platform.find_failure(&response.result).map(str::to_string));

        Ok(match failure {
            Some(message) => {
                debug!("Command '{}' failed: {}", command, message);
                response.with_failure(message)
            }
            None => response,
        })
    }

    async fn send_config(&mut self, commands: &[&str]) -> Result<Vec<Response>> {
        let original = self.privilege_manager.current_name().map(str::to_string);
        let config = self.platform.config_privilege.clone();

        self.acquire_privilege(&config).await?;

        let mut responses = Vec::with_capacity(commands.len());
        for command in commands {
            responses.push(self.send_command(command).await?.into_result()?);
        }

        let still_configuring = self
            .privilege_manager
            .current_name()
            .is_some_and(|current| self.privilege_manager.is_within(current, &config));

        if still_configuring {
            if let Some(original) = original {
                self.acquire_privilege(&original).await?;
            }
        }

        Ok(responses)
    }

    async fn persist(&mut self) -> Result<Response> {
        let default = self.platform.default_privilege.clone();
        self.acquire_privilege(&default).await?;

        let command = self.platform.save_command.clone();
        let response = self.send_command(&command).await?.into_result()?;

        if let Some(confirmation) = &self.platform.save_confirmation {
            if !response.contains(confirmation) {
                return Err(Error::DeviceRejected {
                    command,
                    message: format!("no '{}' confirmation in output", confirmation),
                });
            }
        }

        Ok(response)
    }

    async fn acquire_privilege(&mut self, target: &str) -> Result<()> {
        let current = self
            .privilege_manager
            .current_name()
            .map(str::to_string)
            .ok_or(ConnectionError::NotConnected)?;

        if current == target {
            return Ok(());
        }

        let path = self.privilege_manager.find_path(&current, target)?;

        for hop in path.windows(2) {
            let (from, to) = (&hop[0], &hop[1]);

            let transition = self.privilege_manager.get_transition(from, to).ok_or_else(|| {
                ConnectionError::NoPrivilegePath {
                    from: from.clone(),
                    to: to.clone(),
                }
            })?;

            debug!("Privilege '{}' -> '{}' via '{}'", from, to, transition.command);

            match &transition.auth_prompt {
                Some(auth) => self.escalate_with_secret(&transition.command, auth, to).await?,
                None => {
                    let response = self.send_command(&transition.command).await?.into_result()?;
                    if self.privilege_manager.current_name() != Some(to.as_str()) {
                        return Err(Error::DeviceRejected {
                            command: transition.command.clone(),
                            message: format!(
                                "expected privilege '{}', device shows '{}'",
                                to, response.prompt
                            ),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    fn current_privilege(&self) -> Option<&str> {
        self.privilege_manager.current_name()
    }
}

impl Drop for GenericDriver<'_> {
    fn drop(&mut self) {
        if self.channel.is_some() {
            warn!(
                "Session to {} dropped without close(); transport closed without logout",
                self.device.host
            );
        }
    }
}

/// The last line of `output`, where the prompt sits.
fn last_line(output: &str) -> &str {
    output.rsplit('\n').next().unwrap_or(output)
}
