//! Scripted transports and a simulated IOS gateway for tests.

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::device::DeviceDescriptor;
use crate::error::{ConnectionError, Result};
use crate::transport::{Connector, Transport, TransportConfig};

/// Replays fixed output chunks, ignoring what is sent.
pub(crate) struct ScriptedTransport {
    chunks: VecDeque<Vec<u8>>,
    hang: bool,
}

impl ScriptedTransport {
    pub fn new(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks: chunks.into(),
            hang: false,
        }
    }

    /// Block forever once the script runs out, instead of reporting EOF.
    pub fn hang_when_empty(mut self) -> Self {
        self.hang = true;
        self
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&mut self, _data: &[u8]) -> Result<()> {
        Ok(())
    }

    async fn recv(&mut self) -> Result<Vec<u8>> {
        match self.chunks.pop_front() {
            Some(chunk) => Ok(chunk),
            None if self.hang => std::future::pending().await,
            None => Err(ConnectionError::Closed.into()),
        }
    }

    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// What a [`FakeGateway`] saw across all of its sessions.
#[derive(Debug, Default)]
pub(crate) struct Journal {
    pub connects: usize,
    pub closes: usize,
    pub lines: Vec<String>,
}

/// A simulated IOS voice gateway, usable as a [`Connector`].
///
/// Each `connect` starts a fresh telnet-style session: banner, username and
/// password prompts, `enable` with a secret, configuration sub-modes and
/// `write memory`. Unknown commands get the IOS caret error. Every line the
/// driver sends, secrets included, is recorded in a shared journal.
#[derive(Clone)]
pub(crate) struct FakeGateway {
    hostname: String,
    username: Option<String>,
    password: String,
    secret: Option<String>,
    in_band_login: bool,
    running_config: String,
    save_output: String,
    reject: Option<String>,
    drop_on: Option<String>,
    refuse: bool,
    journal: Arc<Mutex<Journal>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            hostname: "gw1".into(),
            username: Some("cisco".into()),
            password: "cisco".into(),
            secret: Some("class".into()),
            in_band_login: true,
            running_config: String::new(),
            save_output: "Building configuration...\n[OK]".into(),
            reject: None,
            drop_on: None,
            refuse: false,
            journal: Arc::default(),
        }
    }

    /// Ask only for a password at login.
    pub fn without_username(mut self) -> Self {
        self.username = None;
        self
    }

    /// Set the enable secret; `None` lets `enable` through unchallenged.
    pub fn with_secret(mut self, secret: Option<&str>) -> Self {
        self.secret = secret.map(str::to_string);
        self
    }

    /// Start at the exec prompt, as after SSH authentication.
    pub fn preauthenticated(mut self) -> Self {
        self.in_band_login = false;
        self
    }

    /// Output of `show running-config | section ...`.
    pub fn with_running_config(mut self, config: &str) -> Self {
        self.running_config = config.to_string();
        self
    }

    /// Output of `write memory`.
    pub fn with_save_output(mut self, output: &str) -> Self {
        self.save_output = output.to_string();
        self
    }

    /// Answer this exact line with `% Invalid input`.
    pub fn rejecting(mut self, line: &str) -> Self {
        self.reject = Some(line.to_string());
        self
    }

    /// Hang up when this exact line arrives.
    pub fn dropping_on(mut self, line: &str) -> Self {
        self.drop_on = Some(line.to_string());
        self
    }

    /// Refuse TCP connections.
    pub fn refusing(mut self) -> Self {
        self.refuse = true;
        self
    }

    fn journal(&self) -> MutexGuard<'_, Journal> {
        self.journal.lock().unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.journal().lines.clone()
    }

    pub fn connects(&self) -> usize {
        self.journal().connects
    }

    pub fn closes(&self) -> usize {
        self.journal().closes
    }
}

#[async_trait]
impl Connector for FakeGateway {
    async fn connect(
        &self,
        device: &DeviceDescriptor,
        _config: &TransportConfig,
    ) -> Result<Box<dyn Transport>> {
        if self.refuse {
            return Err(ConnectionError::ConnectionFailed {
                host: device.host.clone(),
                port: device.resolved_port(),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            }
            .into());
        }

        self.journal().connects += 1;
        Ok(Box::new(FakeSession::new(self.clone())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Username,
    Password,
    Exec,
    EnableSecret(u8),
    Privileged,
    Config,
    TranslationRule,
    Hungup,
}

/// One session on a [`FakeGateway`].
struct FakeSession {
    gateway: FakeGateway,
    mode: Mode,
    pending: VecDeque<Vec<u8>>,
    partial: String,
}

impl FakeSession {
    fn new(gateway: FakeGateway) -> Self {
        let mut session = Self {
            mode: Mode::Exec,
            gateway,
            pending: VecDeque::new(),
            partial: String::new(),
        };

        if !session.gateway.in_band_login {
            session.emit_prompt();
        } else if session.gateway.username.is_some() {
            session.mode = Mode::Username;
            session.emit("\nUser Access Verification\n\nUsername: ");
        } else {
            session.mode = Mode::Password;
            session.emit("\nUser Access Verification\n\nPassword: ");
        }
        session
    }

    fn emit(&mut self, text: &str) {
        self.pending.push_back(text.replace('\n', "\r\n").into_bytes());
    }

    fn prompt(&self) -> String {
        let host = &self.gateway.hostname;
        match self.mode {
            Mode::Exec => format!("{host}>"),
            Mode::Config => format!("{host}(config)#"),
            Mode::TranslationRule => format!("{host}(cfg-translation-rule)#"),
            _ => format!("{host}#"),
        }
    }

    fn emit_prompt(&mut self) {
        let prompt = self.prompt();
        self.emit(&prompt);
    }

    fn emit_with_prompt(&mut self, output: &str) {
        let prompt = self.prompt();
        self.emit(&format!("{output}\n{prompt}"));
    }

    fn emit_invalid(&mut self) {
        self.emit_with_prompt("      ^\n% Invalid input detected at '^' marker.\n");
    }

    fn handle_line(&mut self, line: &str) {
        self.gateway.journal().lines.push(line.to_string());

        if self.mode == Mode::Hungup {
            return;
        }
        if self.gateway.drop_on.as_deref() == Some(line) {
            self.mode = Mode::Hungup;
            self.pending.clear();
            return;
        }

        match self.mode {
            Mode::Username => {
                self.emit(&format!("{line}\nPassword: "));
                self.mode = Mode::Password;
            }
            Mode::Password => self.check_login(line),
            Mode::EnableSecret(attempts) => self.check_secret(line, attempts),
            _ => {
                self.emit(&format!("{line}\n"));
                if self.gateway.reject.as_deref() == Some(line) {
                    self.emit_invalid();
                } else {
                    self.run_command(line);
                }
            }
        }
    }

    fn check_login(&mut self, password: &str) {
        // The username was already checked by the time the password arrives
        if password == self.gateway.password {
            self.mode = Mode::Exec;
            self.emit("\n");
            self.emit_prompt();
        } else if self.gateway.username.is_some() {
            self.mode = Mode::Username;
            self.emit("\n% Login invalid\n\nUsername: ");
        } else {
            self.emit("\n% Bad passwords\n\nPassword: ");
        }
    }

    fn check_secret(&mut self, secret: &str, attempts: u8) {
        if self.gateway.secret.as_deref() == Some(secret) {
            self.mode = Mode::Privileged;
            self.emit("\n");
            self.emit_prompt();
        } else if attempts < 2 {
            self.mode = Mode::EnableSecret(attempts + 1);
            self.emit("\nPassword: ");
        } else {
            self.mode = Mode::Exec;
            self.emit("\n% Bad secrets\n\n");
            self.emit_prompt();
        }
    }

    fn run_command(&mut self, line: &str) {
        let words: Vec<&str> = line.split_whitespace().collect();

        match (self.mode, words.as_slice()) {
            (Mode::Exec, ["enable"]) => match self.gateway.secret {
                Some(_) => {
                    self.mode = Mode::EnableSecret(0);
                    self.emit("Password: ");
                }
                None => {
                    self.mode = Mode::Privileged;
                    self.emit_prompt();
                }
            },
            (Mode::Exec | Mode::Privileged, ["terminal", "length" | "width", _]) => self.emit_prompt(),
            (Mode::Privileged, ["disable"]) => {
                self.mode = Mode::Exec;
                self.emit_prompt();
            }
            (Mode::Privileged, ["show", "running-config", "|", "section", ..]) => {
                let config = self.gateway.running_config.clone();
                if config.is_empty() {
                    self.emit_prompt();
                } else {
                    self.emit_with_prompt(&config);
                }
            }
            (Mode::Privileged, ["configure", "terminal"]) => {
                self.mode = Mode::Config;
                self.emit_with_prompt("Enter configuration commands, one per line.  End with CNTL/Z.");
            }
            (Mode::Privileged, ["write", "memory"]) => {
                let output = self.gateway.save_output.clone();
                self.emit_with_prompt(&output);
            }
            (Mode::Config, ["voice", "translation-rule", _]) => {
                self.mode = Mode::TranslationRule;
                self.emit_prompt();
            }
            (Mode::TranslationRule, ["rule", ..]) => self.emit_prompt(),
            (Mode::TranslationRule, ["exit"]) => {
                self.mode = Mode::Config;
                self.emit_prompt();
            }
            (Mode::Config | Mode::TranslationRule, ["exit" | "end"]) => {
                self.mode = Mode::Privileged;
                self.emit_prompt();
            }
            _ => self.emit_invalid(),
        }
    }
}

#[async_trait]
impl Transport for FakeSession {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if self.mode == Mode::Hungup {
            return Err(ConnectionError::Closed.into());
        }

        self.partial.push_str(&String::from_utf8_lossy(data));
        while let Some(pos) = self.partial.find('\n') {
            let line = self.partial[..pos].trim_end_matches('\r').to_string();
            self.partial.drain(..=pos);
            self.handle_line(&line);
        }
        Ok(())
    }

    async fn recv(&mut self) -> Result<Vec<u8>> {
        self.pending
            .pop_front()
            .ok_or_else(|| ConnectionError::Closed.into())
    }

    async fn close(&mut self) -> Result<()> {
        self.gateway.journal().closes += 1;
        Ok(())
    }

    fn newline(&self) -> &'static str {
        "\r\n"
    }
}
