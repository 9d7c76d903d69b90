//! Cisco IOS / IOS-XE platform support.

mod behavior;
mod platform;

pub use behavior::CiscoIosBehavior;
pub use platform::{PLATFORM_NAME, platform};
