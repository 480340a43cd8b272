// Allow/deny rule store
//
// Local mirror of the service's IP rule lists. The server is the source of
// truth: every successful mutation replaces the whole local view with the
// canonical set it returns, and nothing is updated optimistically.

use crate::api::{ApiError, RuleAction, TelemetryApi};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Invalid IP: {0:?}")]
    InvalidIp(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Which list a rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListType {
    #[serde(rename = "whitelist")]
    Allow,
    #[serde(rename = "blacklist")]
    Deny,
}

impl ListType {
    pub fn toggle(self) -> Self {
        match self {
            ListType::Allow => ListType::Deny,
            ListType::Deny => ListType::Allow,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ListType::Allow => "ALLOW",
            ListType::Deny => "BLOCK",
        }
    }
}

/// The two rule lists as reported by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RuleSet {
    #[serde(rename = "whitelist", default)]
    pub allow: BTreeSet<String>,
    #[serde(rename = "blacklist", default)]
    pub deny: BTreeSet<String>,
}

impl RuleSet {
    #[cfg(test)]
    pub fn contains(&self, ip: &str, list: ListType) -> bool {
        match list {
            ListType::Allow => self.allow.contains(ip),
            ListType::Deny => self.deny.contains(ip),
        }
    }

    /// Rules in display order: allow list first, then deny list
    pub fn entries(&self) -> Vec<(ListType, &str)> {
        self.allow
            .iter()
            .map(|ip| (ListType::Allow, ip.as_str()))
            .chain(self.deny.iter().map(|ip| (ListType::Deny, ip.as_str())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.allow.len() + self.deny.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Dotted-quad syntax check: four dot-separated groups of ASCII digits
///
/// Octet ranges are deliberately not checked; the service decides.
pub fn is_dotted_quad(ip: &str) -> bool {
    let groups: Vec<&str> = ip.split('.').collect();
    groups.len() == 4
        && groups
            .iter()
            .all(|g| !g.is_empty() && g.chars().all(|c| c.is_ascii_digit()))
}

/// A validated rule mutation, ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRequest {
    pub action: RuleAction,
    pub ip: String,
    pub list: ListType,
}

impl RuleRequest {
    /// Send the mutation and return the server's canonical rule set
    pub async fn send(&self, api: &dyn TelemetryApi) -> Result<RuleSet, RuleError> {
        debug!(ip = %self.ip, action = ?self.action, list = ?self.list, "Sending rule update");
        let rules = api.update_rule(self.action, &self.ip, self.list).await?;
        info!(ip = %self.ip, action = ?self.action, list = ?self.list, "Rule updated");
        Ok(rules)
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: RuleSet,
    loaded: bool,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Whether the initial server fetch has arrived
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Validate an add request locally; malformed input never reaches the network
    pub fn request_add(&self, ip: &str, list: ListType) -> Result<RuleRequest, RuleError> {
        let ip = ip.trim();
        if !is_dotted_quad(ip) {
            return Err(RuleError::InvalidIp(ip.to_string()));
        }
        Ok(RuleRequest {
            action: RuleAction::Add,
            ip: ip.to_string(),
            list,
        })
    }

    pub fn request_remove(&self, ip: &str, list: ListType) -> RuleRequest {
        RuleRequest {
            action: RuleAction::Remove,
            ip: ip.to_string(),
            list,
        }
    }

    /// Replace the local view with a server-confirmed rule set
    ///
    /// Returns `true` if anything changed; re-applying the same set is a no-op.
    pub fn apply_server_rules(&mut self, rules: RuleSet) -> bool {
        self.loaded = true;
        if self.rules == rules {
            return false;
        }
        self.rules = rules;
        true
    }
}
