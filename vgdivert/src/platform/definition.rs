//! Platform definition for device dialect configuration.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use regex::bytes::Regex;

use super::VendorBehavior;
use super::privilege_level::PrivilegeLevel;

/// Everything dialect-specific the generic driver needs: prompts, login
/// handshake markers, failure markers and the persist command.
#[derive(Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "cisco_ios").
    pub name: String,

    /// Privilege levels for this platform.
    pub privilege_levels: IndexMap<String, PrivilegeLevel>,

    /// Privilege level to acquire right after login.
    pub default_privilege: String,

    /// Privilege level used for configuration commands.
    pub config_privilege: String,

    /// In-band login username prompt.
    pub username_prompt: Regex,

    /// In-band login password prompt.
    pub password_prompt: Regex,

    /// Output that means the login credentials were refused.
    pub login_failed_when_contains: Vec<String>,

    /// Output that means an escalation secret was refused.
    pub escalate_failed_when_contains: Vec<String>,

    /// Patterns that indicate command failure.
    pub failed_when_contains: Vec<String>,

    /// Commands to run once the default privilege is acquired.
    pub on_open_commands: Vec<String>,

    /// Command that copies the running configuration to startup.
    pub save_command: String,

    /// Text the save command prints on success.
    pub save_confirmation: Option<String>,

    /// Optional vendor-specific behavior.
    pub behavior: Option<Arc<dyn VendorBehavior>>,
}

impl PlatformDefinition {
    /// Create a new platform definition with generic login prompts.
    pub fn new(name: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            privilege_levels: IndexMap::new(),
            default_privilege: String::new(),
            config_privilege: String::new(),
            username_prompt: Regex::new(r"(?mi)^(?:user ?name|login): ?\z")?,
            password_prompt: Regex::new(r"(?mi)^password: ?\z")?,
            login_failed_when_contains: vec![],
            escalate_failed_when_contains: vec![],
            failed_when_contains: vec![],
            on_open_commands: vec![],
            save_command: String::new(),
            save_confirmation: None,
            behavior: None,
        })
    }

    /// Add a privilege level.
    pub fn with_privilege(mut self, level: PrivilegeLevel) -> Self {
        self.privilege_levels.insert(level.name.clone(), level);
        self
    }

    /// Set the default privilege level.
    pub fn with_default_privilege(mut self, name: impl Into<String>) -> Self {
        self.default_privilege = name.into();
        self
    }

    /// Set the configuration privilege level.
    pub fn with_config_privilege(mut self, name: impl Into<String>) -> Self {
        self.config_privilege = name.into();
        self
    }

    /// Add a login failure marker.
    pub fn with_login_failure(mut self, pattern: impl Into<String>) -> Self {
        self.login_failed_when_contains.push(pattern.into());
        self
    }

    /// Add an escalation failure marker.
    pub fn with_escalate_failure(mut self, pattern: impl Into<String>) -> Self {
        self.escalate_failed_when_contains.push(pattern.into());
        self
    }

    /// Add a failure pattern.
    pub fn with_failure_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.failed_when_contains.push(pattern.into());
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Set the save command and the text it prints on success.
    pub fn with_save(mut self, command: impl Into<String>, confirmation: Option<&str>) -> Self {
        self.save_command = command.into();
        self.save_confirmation = confirmation.map(str::to_string);
        self
    }

    /// Set vendor behavior.
    pub fn with_behavior(mut self, behavior: Arc<dyn VendorBehavior>) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Get a privilege level by name.
    pub fn get_privilege(&self, name: &str) -> Option<&PrivilegeLevel> {
        self.privilege_levels.get(name)
    }

    /// First failure pattern contained in `output`.
    pub fn find_failure(&self, output: &str) -> Option<&str> {
        find_marker(&self.failed_when_contains, output)
    }

    /// First login failure marker contained in `output`.
    pub fn find_login_failure(&self, output: &str) -> Option<&str> {
        find_marker(&self.login_failed_when_contains, output)
    }

    /// First escalation failure marker contained in `output`.
    pub fn find_escalate_failure(&self, output: &str) -> Option<&str> {
        find_marker(&self.escalate_failed_when_contains, output)
    }
}

fn find_marker<'a>(markers: &'a [String], output: &str) -> Option<&'a str> {
    markers
        .iter()
        .find(|marker| output.contains(marker.as_str()))
        .map(String::as_str)
}

impl fmt::Debug for PlatformDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformDefinition")
            .field("name", &self.name)
            .field("privilege_levels", &self.privilege_levels)
            .field("default_privilege", &self.default_privilege)
            .field("config_privilege", &self.config_privilege)
            .field("failed_when_contains", &self.failed_when_contains)
            .field("on_open_commands", &self.on_open_commands)
            .field("save_command", &self.save_command)
            .field(
                "behavior",
                &self.behavior.as_ref().map(|_| "<VendorBehavior>"),
            )
            .finish()
    }
}
