//! The entry point used by the web layer.

use std::path::PathBuf;
use std::time::Duration;

use log::{debug, warn};

use crate::device::DeviceDescriptor;
use crate::driver::{Driver, GenericDriver};
use crate::error::{Error, Result};
use crate::platform::vendors::cisco_ios;
use crate::rules::{self, DiversionRule};
use crate::transport::{Connector, HostKeyVerification, NetworkConnector, TransportConfig};

/// Settings shared by every operation of a [`DiversionDriver`].
#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Connect timeout and per-prompt wait.
    pub timeout: Duration,

    /// Trailing bytes searched for prompts.
    pub search_depth: usize,

    /// Translation-rule block holding the diversion rules.
    pub rule_set: String,

    /// SSH host key policy.
    pub host_key_verification: HostKeyVerification,

    /// SSH known_hosts file; `~/.ssh/known_hosts` when unset.
    pub known_hosts_path: Option<PathBuf>,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            search_depth: 1000,
            rule_set: "2".to_string(),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }
}

impl DriverOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_search_depth(mut self, depth: usize) -> Self {
        self.search_depth = depth;
        self
    }

    pub fn with_rule_set(mut self, rule_set: impl Into<String>) -> Self {
        self.rule_set = rule_set.into();
        self
    }

    pub fn with_host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    pub fn with_known_hosts(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Transport settings for one session.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            timeout: self.timeout,
            search_depth: self.search_depth,
            host_key_verification: self.host_key_verification.clone(),
            known_hosts_path: self.known_hosts_path.clone(),
            ..TransportConfig::default()
        }
    }
}

/// Reads and rewrites call diversion rules on IOS voice gateways.
///
/// Every call opens its own session and closes it before returning, on
/// success and failure alike. Nothing is cached between calls.
///
/// ```rust,no_run
/// use vgdivert::{DeviceDescriptor, DiversionDriver, DriverOptions};
///
/// # async fn example() -> Result<(), vgdivert::Error> {
/// let driver = DiversionDriver::new(DriverOptions::default());
/// let device = DeviceDescriptor::new("192.0.2.10", "cisco", "cisco").with_secret("class");
///
/// for rule in driver.list_rules(&device).await? {
///     println!("{} {} -> {}", rule.id(), rule.source_pattern(), rule.destination_pattern());
/// }
///
/// driver.apply_rule_change(&device, "1", "^677250412", "970203").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DiversionDriver<C = NetworkConnector> {
    options: DriverOptions,
    connector: C,
}

impl DiversionDriver {
    /// Create a driver that connects over the network.
    pub fn new(options: DriverOptions) -> Self {
        Self::with_connector(options, NetworkConnector)
    }
}

impl<C: Connector> DiversionDriver<C> {
    /// Create a driver with a custom connector.
    pub fn with_connector(options: DriverOptions, connector: C) -> Self {
        Self { options, connector }
    }

    pub fn options(&self) -> &DriverOptions {
        &self.options
    }

    fn session<'a>(&'a self, device: &'a DeviceDescriptor) -> Result<GenericDriver<'a>> {
        GenericDriver::new(
            device,
            &self.connector,
            self.options.transport_config(),
            cisco_ios::platform(),
        )
    }

    /// Read the rules of the configured rule-set, in device order.
    ///
    /// Connection and authentication failures are returned unchanged. A
    /// command the device refuses along the way is reported as
    /// [`ConnectionError::CommandRefused`](crate::error::ConnectionError::CommandRefused).
    /// A rule-set that does not exist yields an empty list.
    pub async fn list_rules(&self, device: &DeviceDescriptor) -> Result<Vec<DiversionRule>> {
        let mut session = self.session(device)?;

        let outcome = read_rules(&mut session, &self.options.rule_set)
            .await
            .map_err(Error::refused_read);
        finish(&mut session, outcome).await
    }

    /// Replace one rule's destination and save the configuration.
    ///
    /// `raw_source` must be the rule's source exactly as the device holds it
    /// ([`DiversionRule::raw_source_pattern`]). Returns the device output of
    /// the write sequence and the save.
    ///
    /// Input containing line breaks fails with [`Error::Validation`] before
    /// any connection is made. Connection and authentication failures while
    /// opening are returned unchanged. After that, including the terminal
    /// setup commands, any failure is returned as
    /// [`Error::ConfigurationApply`] wrapping the cause. The
    /// change may have been partially applied at that point; list the rules
    /// again before retrying.
    ///
    /// The driver does not lock the device. Callers must not run two writes
    /// against the same gateway at once.
    pub async fn apply_rule_change(
        &self,
        device: &DeviceDescriptor,
        rule_id: &str,
        raw_source: &str,
        new_destination: &str,
    ) -> Result<String> {
        let commands =
            rules::build_rule_change(&self.options.rule_set, rule_id, raw_source, new_destination)?;
        let mut session = self.session(device)?;

        let outcome = match session.open().await {
            Ok(()) => write(&mut session, &commands).await.map_err(Error::apply),
            Err(e @ Error::DeviceRejected { .. }) => Err(Error::apply(e)),
            Err(e) => Err(e),
        };

        finish(&mut session, outcome).await
    }
}

/// Open the session and parse the translation-rule section.
async fn read_rules(session: &mut GenericDriver<'_>, rule_set: &str) -> Result<Vec<DiversionRule>> {
    session.open().await?;
    let response = session
        .send_command(&rules::section_query())
        .await?
        .into_result()?;

    let rules = rules::parse_section(&response.result, rule_set);
    debug!("Found {} rules in rule-set {}", rules.len(), rule_set);
    Ok(rules)
}

/// Send the rule change in configuration mode, then save.
async fn write(session: &mut GenericDriver<'_>, commands: &[String]) -> Result<String> {
    let commands: Vec<&str> = commands.iter().map(String::as_str).collect();
    let responses = session.send_config(&commands).await?;
    let saved = session.persist().await?;

    debug!("Applied {} configuration lines and saved", responses.len());

    Ok(responses
        .iter()
        .chain(std::iter::once(&saved))
        .map(|r| r.raw_result.as_str())
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Close the session and hand back the operation's own outcome.
async fn finish<T>(session: &mut GenericDriver<'_>, outcome: Result<T>) -> Result<T> {
    if let Err(e) = session.close().await {
        warn!("Failed to close session cleanly: {}", e);
    }
    outcome
}
