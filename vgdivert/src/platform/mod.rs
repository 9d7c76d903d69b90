//! Platform definitions for the device dialect.
//!
//! This module defines dialect-specific configuration including prompt
//! patterns, privilege levels, failure markers and output handling.

mod definition;
mod privilege_level;
pub mod vendors;

pub use definition::PlatformDefinition;
pub use privilege_level::PrivilegeLevel;

/// Trait for vendor-specific output handling.
pub trait VendorBehavior: Send + Sync {
    /// Normalize command output (strip command echo, trailing prompt).
    fn normalize_output(&self, raw: &str, command: &str) -> String {
        let output = raw
            .strip_prefix(command)
            .unwrap_or(raw)
            .trim_start_matches(['\r', '\n']);

        // The last line is the prompt
        match output.rfind('\n') {
            Some(pos) => output[..pos].to_string(),
            None => String::new(),
        }
    }

    /// Detect command failure from output, returning a message.
    ///
    /// Consulted before the platform's `failed_when_contains` patterns.
    fn detect_failure(&self, _output: &str) -> Option<String> {
        None
    }
}

/// Default vendor behavior implementation.
pub struct DefaultBehavior;

impl VendorBehavior for DefaultBehavior {}
