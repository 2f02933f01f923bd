//! # Error Types
//!
//! Every failure the protocol surfaces to a caller is a `ThreadsError`.
//! All variants are terminal for the attempted operation: the operation is
//! aborted with no state change and nothing is retried internally.
//!
//! ## Design
//!
//! - Each variant carries the identifiers and values needed to tell the
//!   caller exactly what was rejected.
//! - [`ThreadsError::code`] is a stable machine-readable class. Client
//!   software matches on the code, never on the message text.
//! - Lower layers (`zkt-state`, `zkt-crypto`, `zkt-zkp`) keep their own
//!   error types and convert into this one at the protocol boundary.

use thiserror::Error;

use crate::field::{ExternalNullifier, IdentityCommitment, MerkleRoot, NullifierHash};
use crate::identity::{AccountId, Amount, CommentId, ReplyId, ThreadId};
use crate::scope::Scope;

/// Top-level error type for zkthreads operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ThreadsError {
    /// A thread with this identifier already exists.
    #[error("{thread_id} already exists")]
    DuplicateThread {
        /// The identifier that was reused.
        thread_id: ThreadId,
    },

    /// No thread with this identifier exists.
    #[error("{thread_id} not found")]
    ThreadNotFound {
        /// The missing thread.
        thread_id: ThreadId,
    },

    /// Payment is below the fee in effect.
    #[error("insufficient funds for creating a thread: fee is {required}, paid {paid}")]
    InsufficientFunds {
        /// Fee in effect at call time.
        required: Amount,
        /// Amount attached to the call.
        paid: Amount,
    },

    /// The thread's lifecycle state does not permit the requested action.
    #[error("invalid transition for {thread_id} from {from} to {attempted}: state should be {requirement}")]
    InvalidTransition {
        /// Thread whose state rejected the action.
        thread_id: ThreadId,
        /// Current state name.
        from: String,
        /// Requested target state or action.
        attempted: String,
        /// Human-readable precondition, e.g. `"Not Started"`.
        requirement: String,
    },

    /// The identity commitment is already enrolled in this thread.
    #[error("identity commitment {commitment} already joined {thread_id}")]
    DuplicateCommitment {
        /// Thread being joined.
        thread_id: ThreadId,
        /// The duplicate commitment.
        commitment: IdentityCommitment,
    },

    /// The all-zero commitment is the tree's empty-leaf value and cannot
    /// be enrolled.
    #[error("zero identity commitment cannot join {thread_id}")]
    ZeroCommitment {
        /// Thread being joined.
        thread_id: ThreadId,
    },

    /// The thread's membership tree has no free leaves.
    #[error("{thread_id} is full ({capacity} members)")]
    GroupFull {
        /// The full thread.
        thread_id: ThreadId,
        /// Maximum number of members.
        capacity: usize,
    },

    /// The claimed root was never produced by this thread's membership set.
    #[error("root {root} is not a known root of {thread_id}")]
    UnknownRoot {
        /// Thread the proof claims membership of.
        thread_id: ThreadId,
        /// The claimed root.
        root: MerkleRoot,
    },

    /// The external nullifier does not encode the targeted scope.
    #[error("external nullifier {supplied} does not match scope {scope} (expected {expected})")]
    ScopeMismatch {
        /// The entity targeted by the call.
        scope: Scope,
        /// Value derived from the scope.
        expected: ExternalNullifier,
        /// Value supplied with the proof.
        supplied: ExternalNullifier,
    },

    /// The proof verifier rejected the proof.
    #[error("membership proof rejected: {reason}")]
    ProofInvalid {
        /// Verifier-supplied detail.
        reason: String,
    },

    /// The nullifier hash has already been consumed.
    #[error("nullifier {nullifier_hash} has already been used")]
    NullifierReuse {
        /// The consumed nullifier hash.
        nullifier_hash: NullifierHash,
    },

    /// The targeted comment does not exist.
    #[error("{comment_id} not found in {thread_id}")]
    CommentNotFound {
        /// Owning thread.
        thread_id: ThreadId,
        /// Missing comment.
        comment_id: CommentId,
    },

    /// The targeted reply does not exist.
    #[error("{reply_id} not found under {comment_id} in {thread_id}")]
    ReplyNotFound {
        /// Owning thread.
        thread_id: ThreadId,
        /// Parent comment.
        comment_id: CommentId,
        /// Missing reply.
        reply_id: ReplyId,
    },

    /// A comment or reply with this key was already created.
    #[error("{scope} already exists")]
    DuplicateEntity {
        /// Key of the existing entity.
        scope: Scope,
    },

    /// The caller lacks the role required for this operation.
    #[error("{caller} is not authorized to {action}")]
    Unauthorized {
        /// The rejected caller.
        caller: AccountId,
        /// Operation that was attempted.
        action: &'static str,
    },

    /// Escrowed balance would exceed the representable maximum.
    #[error("treasury balance overflow")]
    BalanceOverflow,

    /// A like counter would exceed the representable maximum.
    #[error("like counter overflow on {scope}")]
    CounterOverflow {
        /// Entity whose counter overflowed.
        scope: Scope,
    },

    /// A persisted snapshot is internally inconsistent.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// Protocol configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ThreadsError {
    /// Stable machine-readable error class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateThread { .. } => "duplicate_thread",
            Self::ThreadNotFound { .. } => "thread_not_found",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::DuplicateCommitment { .. } => "duplicate_commitment",
            Self::ZeroCommitment { .. } => "zero_commitment",
            Self::GroupFull { .. } => "group_full",
            Self::UnknownRoot { .. } => "unknown_root",
            Self::ScopeMismatch { .. } => "scope_mismatch",
            Self::ProofInvalid { .. } => "proof_invalid",
            Self::NullifierReuse { .. } => "nullifier_reuse",
            Self::CommentNotFound { .. } => "comment_not_found",
            Self::ReplyNotFound { .. } => "reply_not_found",
            Self::DuplicateEntity { .. } => "duplicate_entity",
            Self::Unauthorized { .. } => "unauthorized",
            Self::BalanceOverflow => "balance_overflow",
            Self::CounterOverflow { .. } => "counter_overflow",
            Self::CorruptSnapshot(_) => "corrupt_snapshot",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }

    /// Whether a fresh proof could make the same action succeed.
    ///
    /// A consumed nullifier is final, so `NullifierReuse` is never
    /// retryable. A stale root or a rejected proof may succeed with a proof
    /// rebuilt against the current membership list.
    pub fn is_retryable_with_fresh_proof(&self) -> bool {
        matches!(self, Self::UnknownRoot { .. } | Self::ProofInvalid { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct_for_user_facing_kinds() {
        let errors = [
            ThreadsError::InsufficientFunds {
                required: 2,
                paid: 1,
            },
            ThreadsError::NullifierReuse {
                nullifier_hash: NullifierHash::from_u64(1),
            },
            ThreadsError::ProofInvalid {
                reason: "bad".into(),
            },
        ];
        let codes: Vec<_> = errors.iter().map(ThreadsError::code).collect();
        assert_eq!(codes, ["insufficient_funds", "nullifier_reuse", "proof_invalid"]);
    }

    #[test]
    fn test_invalid_transition_message_carries_requirement() {
        let err = ThreadsError::InvalidTransition {
            thread_id: ThreadId(1),
            from: "ENDED".into(),
            attempted: "ACTIVE".into(),
            requirement: "Not Started".into(),
        };
        assert!(err.to_string().contains("state should be Not Started"));
    }

    #[test]
    fn test_insufficient_funds_message() {
        let err = ThreadsError::InsufficientFunds {
            required: 10,
            paid: 5,
        };
        assert!(err
            .to_string()
            .starts_with("insufficient funds for creating a thread"));
    }

    #[test]
    fn test_thread_messages_name_the_thread_once() {
        let err = ThreadsError::DuplicateThread {
            thread_id: ThreadId(1),
        };
        assert_eq!(err.to_string(), "thread:1 already exists");
        let err = ThreadsError::ThreadNotFound {
            thread_id: ThreadId(7),
        };
        assert_eq!(err.to_string(), "thread:7 not found");
    }

    #[test]
    fn test_retryability() {
        assert!(ThreadsError::UnknownRoot {
            thread_id: ThreadId(1),
            root: MerkleRoot::default(),
        }
        .is_retryable_with_fresh_proof());
        assert!(!ThreadsError::NullifierReuse {
            nullifier_hash: NullifierHash::default(),
        }
        .is_retryable_with_fresh_proof());
    }
}
