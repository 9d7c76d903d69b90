//! Error types for vgdivert.
//!
//! [`Error::DeviceRejected`] is raised by the session layer and never leaves
//! the facade as is. [`DiversionDriver`](crate::DiversionDriver) callers see
//! four categories: a refused read becomes
//! [`ConnectionError::CommandRefused`], and any refusal once a write session
//! is connected arrives wrapped in [`Error::ConfigurationApply`].

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for vgdivert operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Unreachable host, dropped channel, timeout or protocol confusion
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Login or privileged-mode secret rejected
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    /// Caller input that is unsafe to interpolate into a command line
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The device answered a command with an error marker
    #[error("Device rejected '{command}': {message}")]
    DeviceRejected { command: String, message: String },

    /// A write sequence failed after the session was established
    #[error("Configuration apply failed: {source}")]
    ConfigurationApply {
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap a post-connection write failure.
    pub(crate) fn apply(source: Error) -> Self {
        Error::ConfigurationApply {
            source: Box::new(source),
        }
    }

    /// Recast a device rejection on a read path as a connection failure.
    pub(crate) fn refused_read(self) -> Self {
        match self {
            Error::DeviceRejected { command, message } => {
                ConnectionError::CommandRefused { command, message }.into()
            }
            other => other,
        }
    }

    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Connection(_) => ErrorKind::Connection,
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::Validation(_) => ErrorKind::Validation,
            Error::DeviceRejected { .. } => ErrorKind::DeviceRejected,
            Error::ConfigurationApply { .. } => ErrorKind::ConfigurationApply,
        }
    }

    /// Whether retrying the same call unchanged can reasonably succeed.
    ///
    /// Only connection failures qualify, and not a refused command. A failed
    /// write should be followed by a fresh `list_rules` before anything is
    /// retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Connection(ConnectionError::CommandRefused { .. }) => false,
            Error::Connection(_) => true,
            _ => false,
        }
    }
}

/// Coarse error category, for collaborators that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    Authentication,
    Validation,
    DeviceRejected,
    ConfigurationApply,
}

/// Transport and channel level errors.
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Host key not present in known_hosts (strict mode)
    #[error("Host key for {host}:{port} is not in known_hosts")]
    HostKeyUnknown { host: String, port: u16 },

    /// Host key differs from the known_hosts entry
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Remote side closed the channel
    #[error("Channel closed by remote")]
    Closed,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The device refused a command needed to read its state
    #[error("Device refused '{command}': {message}")]
    CommandRefused { command: String, message: String },

    /// Session used before `open()`
    #[error("Session not connected - call open() first")]
    NotConnected,

    /// `open()` called twice
    #[error("Session already connected")]
    AlreadyConnected,

    /// The device printed a prompt no privilege level recognizes
    #[error("Unrecognized prompt: '{prompt}'")]
    UnknownPrompt { prompt: String },

    /// No path found between privilege levels
    #[error("No path from privilege '{from}' to '{to}'")]
    NoPrivilegePath { from: String, to: String },

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Credential rejections, kept apart so the two can be reported differently.
#[derive(Error, Debug)]
pub enum AuthenticationError {
    /// Username/password refused at login
    #[error("Login rejected for user '{user}'")]
    LoginRejected { user: String },

    /// Privileged-mode secret refused
    #[error("Privileged mode '{target}' rejected the secret")]
    EscalationRejected { target: String },
}

/// Caller input rejected before any network I/O.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// A value would break out of its command line
    #[error("{field} must not contain line breaks")]
    LineBreak { field: &'static str },

    /// A pattern would end early at a `/` and never parse back
    #[error("{field} must not contain '/'")]
    Slash { field: &'static str },
}

/// Result type alias using vgdivert's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_kind_mapping() {
        let err: Error = ConnectionError::Closed.into();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(err.is_retryable());

        let err: Error = AuthenticationError::LoginRejected {
            user: "admin".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Authentication);
        assert!(!err.is_retryable());

        let err: Error = ValidationError::LineBreak { field: "raw_source" }.into();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_apply_preserves_source() {
        let inner = Error::DeviceRejected {
            command: "write memory".into(),
            message: "% Error".into(),
        };
        let err = Error::apply(inner);

        assert_eq!(err.kind(), ErrorKind::ConfigurationApply);
        assert!(err.to_string().contains("write memory"));

        let source = err.source().unwrap();
        assert!(source.to_string().contains("% Error"));
    }

    #[test]
    fn test_refused_read_is_connection_but_not_retryable() {
        let err = Error::DeviceRejected {
            command: "show running-config".into(),
            message: "% Invalid input detected at '^' marker.".into(),
        }
        .refused_read();

        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("show running-config"));

        let err = Error::from(ConnectionError::Closed).refused_read();
        assert!(matches!(err, Error::Connection(ConnectionError::Closed)));
    }
}
