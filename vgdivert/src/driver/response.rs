//! Response type for command execution results.

use std::time::Duration;

use crate::error::Error;

/// Response from a command execution.
#[derive(Debug, Clone)]
pub struct Response {
    /// The command that was executed.
    pub command: String,

    /// The command output (normalized - command echo and trailing prompt removed).
    pub result: String,

    /// The raw output before normalization.
    pub raw_result: String,

    /// The prompt that was matched at the end.
    pub prompt: String,

    /// Time taken to execute the command.
    pub elapsed: Duration,

    /// Failure message if the device flagged the command.
    pub failure_message: Option<String>,
}

impl Response {
    /// Create a new successful response.
    pub fn new(
        command: impl Into<String>,
        result: impl Into<String>,
        raw_result: impl Into<String>,
        prompt: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            command: command.into(),
            result: result.into(),
            raw_result: raw_result.into(),
            prompt: prompt.into(),
            elapsed,
            failure_message: None,
        }
    }

    /// Mark the response as failed.
    pub fn with_failure(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    /// Check if the response indicates success.
    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }

    /// Turn a failed response into `Error::DeviceRejected`.
    pub fn into_result(self) -> Result<Self, Error> {
        match self.failure_message {
            Some(message) => Err(Error::DeviceRejected {
                command: self.command,
                message,
            }),
            None => Ok(self),
        }
    }

    /// Get the result lines as an iterator.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.result.lines()
    }

    /// Check if the result contains a substring.
    pub fn contains(&self, pattern: &str) -> bool {
        self.result.contains(pattern)
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(result: &str) -> Response {
        Response::new("show clock", result, "", "gw1#", Duration::ZERO)
    }

    #[test]
    fn test_success_passes_through() {
        let resp = response("10:00:00 UTC").into_result().unwrap();
        assert!(resp.contains("UTC"));
        assert_eq!(resp.to_string(), "10:00:00 UTC");
    }

    #[test]
    fn test_failure_becomes_device_rejected() {
        let resp = response("% Invalid input").with_failure("% Invalid input");
        assert!(!resp.is_success());

        match resp.into_result() {
            Err(Error::DeviceRejected { command, message }) => {
                assert_eq!(command, "show clock");
                assert_eq!(message, "% Invalid input");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
