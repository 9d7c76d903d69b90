//! # vgdivert
//!
//! Async driver for the call-diversion rules of Cisco IOS voice gateways.
//!
//! Diversion rules live in a `voice translation-rule` block of the running
//! configuration. vgdivert logs in over telnet or SSH, reads that block into
//! [`DiversionRule`] records, and rewrites one rule's destination followed by
//! `write memory`.
//!
//! ## Features
//!
//! - Telnet (with option negotiation) and SSH transports via tokio and russh
//! - In-band login and `enable` escalation, with login and secret failures
//!   reported apart
//! - Prompt matching on the tail of ANSI-stripped output
//! - Section parsing that ignores sibling rule-sets such as `20` or `255`
//! - Command building that refuses input able to break out of a command line
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vgdivert::{DeviceDescriptor, DiversionDriver, DriverOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), vgdivert::Error> {
//!     let driver = DiversionDriver::new(DriverOptions::default());
//!     let device = DeviceDescriptor::new("192.0.2.10", "cisco", "cisco").with_secret("class");
//!
//!     let rules = driver.list_rules(&device).await?;
//!     if let Some(rule) = rules.first() {
//!         let output = driver
//!             .apply_rule_change(&device, rule.id(), rule.raw_source_pattern(), "970203")
//!             .await?;
//!         println!("{}", output);
//!     }
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod device;
pub mod driver;
pub mod error;
pub mod facade;
pub mod platform;
pub mod rules;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use device::{DeviceDescriptor, TransportKind};
pub use driver::{Driver, GenericDriver, Response};
pub use error::{Error, ErrorKind, Result};
pub use facade::{DiversionDriver, DriverOptions};
pub use platform::{PlatformDefinition, PrivilegeLevel};
pub use rules::DiversionRule;
pub use transport::{Connector, HostKeyVerification, NetworkConnector, TransportConfig};
