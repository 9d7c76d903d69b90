//! Transport configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
///
/// Only consulted by the SSH transport.
#[derive(Debug, Clone, Default)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys. Connection fails if the host
    /// is not already in known_hosts.
    Strict,

    /// Accept and auto-learn unknown keys, but reject changed keys.
    #[default]
    AcceptNew,

    /// Accept all keys without checking. For testing and lab use only.
    Disabled,
}

/// Per-session settings that are not part of the device descriptor.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Connect timeout, and the default wait for each prompt.
    pub timeout: Duration,

    /// How many trailing bytes of output are searched for prompts.
    pub search_depth: usize,

    /// Terminal width for the SSH PTY.
    pub terminal_width: u32,

    /// Terminal height for the SSH PTY.
    pub terminal_height: u32,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file.
    pub known_hosts_path: Option<PathBuf>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            search_depth: 1000,
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }
}
