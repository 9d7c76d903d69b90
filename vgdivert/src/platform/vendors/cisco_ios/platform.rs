//! Cisco IOS platform definition.
//!
//! Supports IOS voice gateways with the following privilege levels:
//! - `exec` - User EXEC mode with `>` prompt
//! - `privilege_exec` - Privileged EXEC mode with `#` prompt
//! - `configuration` - Global and sub-mode configuration, `(config*)#` or `(cfg*)#`
//!
//! # Prompt Examples
//!
//! ```text
//! gw1>                               # exec mode
//! gw1#                               # privilege_exec mode
//! gw1(config)#                       # configuration mode
//! gw1(cfg-translation-rule)#         # voice translation-rule sub-mode
//! ```
//!
//! # Privilege Graph
//!
//! ```text
//! ┌──────┐  enable     ┌────────────────┐  configure terminal  ┌───────────────┐
//! │ exec ├──────────────► privilege_exec ├──────────────────────► configuration │
//! │  >   │   disable   │       #        │        end           │ (config*)#    │
//! └──────┘◄────────────┴────────────────┘◄─────────────────────┴───────────────┘
//! ```

use std::sync::Arc;

use crate::platform::{PlatformDefinition, PrivilegeLevel};

use super::behavior::CiscoIosBehavior;

/// Platform name for Cisco IOS.
pub const PLATFORM_NAME: &str = "cisco_ios";

/// Create the Cisco IOS platform definition.
///
/// Prompts are anchored to the very end of the output (`\z`) so that lines
/// inside a configuration dump never look like a prompt.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?m)^[\w.\-@/:]{1,63}>\s?\z").unwrap();

    let privilege_exec = PrivilegeLevel::new("privilege_exec", r"(?m)^[\w.\-@/:]{1,63}#\s?\z")
        .unwrap()
        .with_parent("exec")
        .with_escalate("enable")
        .with_deescalate("disable")
        .with_auth(r"(?mi)^password: ?\z")
        .unwrap()
        .with_not_contains("(config")
        .with_not_contains("(cfg");

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?m)^[\w.\-@/:]{1,63}\((?:config|cfg)[\w.\-@/:+]{0,63}\)#\s?\z",
    )
    .unwrap()
    .with_parent("privilege_exec")
    .with_escalate("configure terminal")
    .with_deescalate("end");

    PlatformDefinition::new(PLATFORM_NAME)
        .unwrap()
        .with_privilege(exec)
        .with_privilege(privilege_exec)
        .with_privilege(configuration)
        .with_default_privilege("privilege_exec")
        .with_config_privilege("configuration")
        .with_login_failure("% Login invalid")
        .with_login_failure("% Authentication failed")
        .with_login_failure("% Bad passwords")
        .with_login_failure("% Access denied")
        .with_escalate_failure("% Bad secrets")
        .with_escalate_failure("% Access denied")
        .with_escalate_failure("% No password set")
        .with_failure_pattern("% Invalid input")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Unknown command")
        .with_failure_pattern("% Error")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 0")
        .with_save("write memory", Some("[OK]"))
        .with_behavior(Arc::new(CiscoIosBehavior))
}
