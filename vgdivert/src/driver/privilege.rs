//! Privilege level tracking and navigation.

use indexmap::IndexMap;
use regex::bytes::Regex;

use crate::error::{ConnectionError, Result};
use crate::platform::PrivilegeLevel;

/// Tracks the session's privilege level and plans moves between levels.
///
/// Levels form a tree through `previous_priv`, so the route between two
/// levels always climbs to their closest common ancestor and descends from
/// there.
#[derive(Debug)]
pub struct PrivilegeManager {
    /// All defined privilege levels.
    levels: IndexMap<String, PrivilegeLevel>,

    /// Current privilege level name.
    current: Option<String>,
}

impl PrivilegeManager {
    /// Create a manager positioned at the root level.
    pub fn new(levels: IndexMap<String, PrivilegeLevel>) -> Self {
        let current = levels
            .values()
            .find(|l| l.previous_priv.is_none())
            .map(|l| l.name.clone());

        Self { levels, current }
    }

    /// Determine the privilege level a prompt belongs to.
    pub fn determine_from_prompt(&self, prompt: &str) -> Result<&PrivilegeLevel> {
        self.levels
            .values()
            .find(|level| level.matches(prompt))
            .ok_or_else(|| {
                ConnectionError::UnknownPrompt {
                    prompt: prompt.to_string(),
                }
                .into()
            })
    }

    /// Update the current level from a prompt.
    pub fn update_from_prompt(&mut self, prompt: &str) -> Result<&PrivilegeLevel> {
        let name = self.determine_from_prompt(prompt)?.name.clone();
        self.current = Some(name);
        self.current()
            .ok_or_else(|| ConnectionError::UnknownPrompt { prompt: prompt.to_string() }.into())
    }

    /// Get the current privilege level.
    pub fn current(&self) -> Option<&PrivilegeLevel> {
        self.current.as_ref().and_then(|name| self.levels.get(name))
    }

    /// Name of the current privilege level.
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Get a privilege level by name.
    pub fn get(&self, name: &str) -> Option<&PrivilegeLevel> {
        self.levels.get(name)
    }

    /// `name` followed by each of its ancestors up to the root.
    fn lineage(&self, name: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut node = self.levels.get(name);
        while let Some(level) = node {
            chain.push(level.name.clone());
            node = level
                .previous_priv
                .as_ref()
                .and_then(|parent| self.levels.get(parent));
        }
        chain
    }

    /// Whether `name` is `ancestor` or sits below it.
    pub fn is_within(&self, name: &str, ancestor: &str) -> bool {
        self.lineage(name).iter().any(|n| n == ancestor)
    }

    /// Levels to traverse from `from` to `to`, both ends included.
    pub fn find_path(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let no_path = || -> crate::error::Error {
            ConnectionError::NoPrivilegePath {
                from: from.to_string(),
                to: to.to_string(),
            }
            .into()
        };

        let up = self.lineage(from);
        let down = self.lineage(to);
        if up.is_empty() || down.is_empty() {
            return Err(no_path());
        }

        // Closest level both chains share
        let (up_idx, down_idx) = up
            .iter()
            .enumerate()
            .find_map(|(i, name)| down.iter().position(|n| n == name).map(|j| (i, j)))
            .ok_or_else(no_path)?;

        let mut path: Vec<String> = up[..=up_idx].to_vec();
        path.extend(down[..down_idx].iter().rev().cloned());
        Ok(path)
    }

    /// Get the transition from one level to an adjacent level.
    pub fn get_transition(&self, from: &str, to: &str) -> Option<TransitionInfo> {
        let from_level = self.levels.get(from)?;
        let to_level = self.levels.get(to)?;

        if to_level.previous_priv.as_deref() == Some(from) {
            return Some(TransitionInfo {
                command: to_level.escalate_command.clone()?,
                auth_prompt: to_level.escalate_prompt.clone(),
            });
        }

        if from_level.previous_priv.as_deref() == Some(to) {
            return Some(TransitionInfo {
                command: from_level.deescalate_command.clone()?,
                auth_prompt: None,
            });
        }

        None
    }
}

/// A single hop between adjacent privilege levels.
#[derive(Debug, Clone)]
pub struct TransitionInfo {
    /// Command to execute for the transition.
    pub command: String,

    /// Secret prompt pattern. If `Some`, the hop may ask for a secret.
    pub auth_prompt: Option<Regex>,
}
