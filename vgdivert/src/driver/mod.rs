//! Session driver: login, privilege levels, command execution.
//!
//! The driver layer sits on top of a [`CliChannel`](crate::channel::CliChannel)
//! and knows the device dialect through a
//! [`PlatformDefinition`](crate::platform::PlatformDefinition).

mod generic;
mod privilege;
mod response;

pub use generic::GenericDriver;
pub use privilege::{PrivilegeManager, TransitionInfo};
pub use response::Response;

use std::future::Future;

use crate::error::Result;

/// Trait for device session drivers.
pub trait Driver: Send {
    /// Connect, log in and acquire the platform's default privilege.
    fn open(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Close the connection. Safe to call when not open.
    fn close(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Send a command and wait for the prompt.
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<Response>> + Send;

    /// Send multiple commands sequentially.
    fn send_commands(
        &mut self,
        commands: &[&str],
    ) -> impl Future<Output = Result<Vec<Response>>> + Send {
        async move {
            let mut responses = Vec::with_capacity(commands.len());
            for cmd in commands {
                responses.push(self.send_command(cmd).await?);
            }
            Ok(responses)
        }
    }

    /// Send commands in configuration mode.
    ///
    /// This method:
    /// 1. Acquires the configuration privilege level
    /// 2. Sends the commands, stopping at the first one the device rejects
    /// 3. Returns to the previous privilege level, unless the commands
    ///    already left configuration mode
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use vgdivert::driver::Driver;
    ///
    /// # async fn example(driver: &mut impl Driver) -> Result<(), vgdivert::Error> {
    /// let responses = driver.send_config(&[
    ///     "voice translation-rule 2",
    ///     "rule 1 /^5551234/ /5559876/ plan any unknown",
    ///     "exit",
    ///     "exit",
    /// ]).await?;
    /// # Ok(())
    /// # }
    /// ```
    fn send_config(
        &mut self,
        commands: &[&str],
    ) -> impl Future<Output = Result<Vec<Response>>> + Send;

    /// Copy the running configuration to startup configuration.
    fn persist(&mut self) -> impl Future<Output = Result<Response>> + Send;

    /// Acquire a specific privilege level.
    fn acquire_privilege(&mut self, privilege: &str) -> impl Future<Output = Result<()>> + Send;

    /// Check if the driver is connected.
    fn is_open(&self) -> bool;

    /// Get the current privilege level name.
    fn current_privilege(&self) -> Option<&str>;
}
