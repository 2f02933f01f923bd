//! # Protocol Configuration
//!
//! Loaded from YAML at startup. Every field except `owner` has a default.
//!
//! ```yaml
//! owner: "0xowner"
//! initial_fee: "1000000000000000000"
//! tree_depth: 20
//! join_policy:
//!   while_not_started: true
//!   while_paused: false
//! lifecycle_authority: open
//! ```

use serde::{Deserialize, Serialize};

use zkt_core::{AccountId, Amount, ThreadsError};
use zkt_crypto::merkle::MAX_DEPTH;
use zkt_state::JoinPolicy;

/// Fee charged for a new thread unless configured otherwise: one whole
/// unit at 18 decimals.
pub const DEFAULT_FEE: Amount = 1_000_000_000_000_000_000;

/// Membership tree depth unless configured otherwise (2^20 members).
pub const DEFAULT_TREE_DEPTH: u32 = 20;

fn default_fee() -> Amount {
    DEFAULT_FEE
}

fn default_tree_depth() -> u32 {
    DEFAULT_TREE_DEPTH
}

/// Who may start, pause, resume and end a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAuthority {
    /// Any caller.
    #[default]
    Open,
    /// Only the thread's creator or the protocol owner.
    CreatorOrOwner,
}

impl LifecycleAuthority {
    /// Whether `caller` may drive the lifecycle of a thread made by `creator`.
    pub fn permits(&self, caller: &AccountId, creator: &AccountId, owner: &AccountId) -> bool {
        match self {
            Self::Open => true,
            Self::CreatorOrOwner => caller == creator || caller == owner,
        }
    }
}

/// Static configuration of one protocol instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Account allowed to change the fee and withdraw funds.
    pub owner: AccountId,

    /// Creation fee in effect at startup.
    #[serde(default = "default_fee", with = "crate::amount")]
    pub initial_fee: Amount,

    /// Depth of every thread's membership tree.
    #[serde(default = "default_tree_depth")]
    pub tree_depth: u32,

    /// States besides `Active` that accept joins.
    #[serde(default)]
    pub join_policy: JoinPolicy,

    /// Who may drive thread lifecycles.
    #[serde(default)]
    pub lifecycle_authority: LifecycleAuthority,
}

impl ProtocolConfig {
    /// Default configuration owned by `owner`.
    pub fn new(owner: impl Into<AccountId>) -> Self {
        Self {
            owner: owner.into(),
            initial_fee: DEFAULT_FEE,
            tree_depth: DEFAULT_TREE_DEPTH,
            join_policy: JoinPolicy::default(),
            lifecycle_authority: LifecycleAuthority::default(),
        }
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ThreadsError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ThreadsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ThreadsError> {
        let mut problems = Vec::new();
        if self.owner.as_str().trim().is_empty() {
            problems.push("owner must not be empty".to_string());
        }
        if self.tree_depth == 0 || self.tree_depth > MAX_DEPTH {
            problems.push(format!(
                "tree_depth {} outside 1..={MAX_DEPTH}",
                self.tree_depth
            ));
        }
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ThreadsError::InvalidConfig(problems.join("; ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_yaml() {
        let config = ProtocolConfig::from_yaml_str("owner: alice\n").unwrap();
        assert_eq!(config, ProtocolConfig::new("alice"));
        assert_eq!(config.initial_fee, DEFAULT_FEE);
        assert_eq!(config.tree_depth, 20);
        assert!(config.join_policy.while_not_started);
        assert!(!config.join_policy.while_paused);
        assert_eq!(config.lifecycle_authority, LifecycleAuthority::Open);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
owner: "0xowner"
initial_fee: 5
tree_depth: 4
join_policy:
  while_paused: true
lifecycle_authority: creator_or_owner
"#;
        let config = ProtocolConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.initial_fee, 5);
        assert_eq!(config.tree_depth, 4);
        assert!(config.join_policy.while_not_started);
        assert!(config.join_policy.while_paused);
        assert_eq!(config.lifecycle_authority, LifecycleAuthority::CreatorOrOwner);
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let mut config = ProtocolConfig::new(" ");
        config.tree_depth = 33;
        let err = config.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("owner must not be empty"));
        assert!(msg.contains("tree_depth 33"));
        assert_eq!(err.code(), "invalid_config");
    }

    #[test]
    fn test_missing_owner_is_invalid_config() {
        let err = ProtocolConfig::from_yaml_str("tree_depth: 10\n").unwrap_err();
        assert_eq!(err.code(), "invalid_config");
    }

    #[test]
    fn test_lifecycle_authority() {
        let owner = AccountId::new("owner");
        let creator = AccountId::new("creator");
        let other = AccountId::new("other");
        let strict = LifecycleAuthority::CreatorOrOwner;
        assert!(strict.permits(&creator, &creator, &owner));
        assert!(strict.permits(&owner, &creator, &owner));
        assert!(!strict.permits(&other, &creator, &owner));
        assert!(LifecycleAuthority::Open.permits(&other, &creator, &owner));
    }
}
