//! # Identifier Newtypes
//!
//! Threads, comments and replies are keyed by caller-chosen integers.
//! Each namespace gets its own type so the three cannot be swapped at a
//! call site that takes several of them.

use serde::{Deserialize, Serialize};

/// Value moved by the host ledger, in its smallest unit.
pub type Amount = u128;

/// Identifier of a discussion thread (one anonymity group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub u64);

/// Identifier of a comment, unique within its thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentId(pub u64);

/// Identifier of a reply, unique within its parent comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReplyId(pub u64);

impl ThreadId {
    /// Access the raw numeric identifier.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl CommentId {
    /// Access the raw numeric identifier.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl ReplyId {
    /// Access the raw numeric identifier.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "thread:{}", self.0)
    }
}

impl std::fmt::Display for CommentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "comment:{}", self.0)
    }
}

impl std::fmt::Display for ReplyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "reply:{}", self.0)
    }
}

/// Authenticated sender of a transaction, as reported by the host ledger.
///
/// The core never authenticates callers itself. It only compares the
/// account the host hands it against the stored owner (and, when
/// configured, against a thread's creator).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    /// Build an account id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the account id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_display_with_namespace() {
        assert_eq!(ThreadId(1).to_string(), "thread:1");
        assert_eq!(CommentId(2).to_string(), "comment:2");
        assert_eq!(ReplyId(3).to_string(), "reply:3");
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&ThreadId(42)).unwrap();
        assert_eq!(json, "42");
        let parsed: CommentId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, CommentId(7));
    }

    #[test]
    fn test_account_id_from_str() {
        let owner: AccountId = "0xowner".into();
        assert_eq!(owner.as_str(), "0xowner");
        assert_eq!(serde_json::to_string(&owner).unwrap(), "\"0xowner\"");
    }
}
