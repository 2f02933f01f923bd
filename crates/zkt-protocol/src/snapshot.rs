//! # State Snapshots
//!
//! `StateSnapshot` is the persisted image of a `ZkThreads` instance: fee,
//! balance, owner, sequence counter, and per thread the lifecycle, the
//! ordered commitments, the root history and the discussion. The event
//! journal is not part of it; hosts drain events as they go.
//!
//! Restoring never trusts stored roots. Each group is rebuilt by
//! re-inserting its commitments, and the recomputed root history must
//! equal the stored one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use zkt_core::{
    AccountId, Amount, CommentId, IdentityCommitment, MerkleRoot, NullifierHash, ReplyId, Signal,
    ThreadId, ThreadsError,
};
use zkt_crypto::FieldHasher;
use zkt_state::ThreadLifecycle;
use zkt_zkp::MembershipVerifier;

use crate::config::ProtocolConfig;
use crate::discussion::{CommentRecord, ReplyRecord};
use crate::nullifier::NullifierLedger;
use crate::protocol::{ThreadRecord, ZkThreads};
use crate::treasury::Treasury;

/// Current snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub version: u32,
    pub owner: AccountId,
    #[serde(with = "crate::amount")]
    pub fee: Amount,
    #[serde(with = "crate::amount")]
    pub balance: Amount,
    pub sequence: u64,
    pub tree_depth: u32,
    pub threads: Vec<ThreadSnapshot>,
    pub nullifiers: Vec<NullifierHash>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadSnapshot {
    pub thread_id: ThreadId,
    pub creator: AccountId,
    #[serde(with = "crate::amount")]
    pub fee_paid: Amount,
    pub lifecycle: ThreadLifecycle,
    pub commitments: Vec<IdentityCommitment>,
    pub valid_roots: Vec<MerkleRoot>,
    pub comments: Vec<CommentSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSnapshot {
    pub comment_id: CommentId,
    pub signal: Signal,
    pub likes: u64,
    pub replies: Vec<ReplySnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplySnapshot {
    pub reply_id: ReplyId,
    pub signal: Signal,
    pub likes: u64,
}

impl StateSnapshot {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ThreadsError> {
        serde_json::to_string_pretty(self).map_err(|e| ThreadsError::CorruptSnapshot(e.to_string()))
    }

    /// Parse JSON. Structural validation happens in `ZkThreads::restore`.
    pub fn from_json(json: &str) -> Result<Self, ThreadsError> {
        serde_json::from_str(json).map_err(|e| corrupt(format!("unreadable snapshot: {e}")))
    }
}

fn corrupt(reason: String) -> ThreadsError {
    warn!(%reason, "snapshot rejected");
    ThreadsError::CorruptSnapshot(reason)
}

impl CommentSnapshot {
    fn from_record(comment_id: CommentId, record: &CommentRecord) -> Self {
        Self {
            comment_id,
            signal: record.signal,
            likes: record.likes,
            replies: record
                .replies
                .iter()
                .map(|(reply_id, r)| ReplySnapshot {
                    reply_id: *reply_id,
                    signal: r.signal,
                    likes: r.likes,
                })
                .collect(),
        }
    }

    fn into_record(self, thread_id: ThreadId) -> Result<CommentRecord, ThreadsError> {
        let mut replies = BTreeMap::new();
        for r in self.replies {
            let record = ReplyRecord {
                signal: r.signal,
                likes: r.likes,
            };
            if replies.insert(r.reply_id, record).is_some() {
                return Err(corrupt(format!(
                    "{thread_id}/{} has duplicate {}",
                    self.comment_id, r.reply_id
                )));
            }
        }
        Ok(CommentRecord {
            signal: self.signal,
            likes: self.likes,
            replies,
        })
    }
}

impl<V: MembershipVerifier, H: FieldHasher + Clone> ZkThreads<V, H> {
    /// Capture the persisted state.
    pub fn snapshot(&self) -> StateSnapshot {
        let threads = self
            .threads
            .iter()
            .map(|(thread_id, thread)| {
                let (commitments, valid_roots) = self
                    .groups
                    .group(*thread_id)
                    .map(|g| (g.commitments().to_vec(), g.root_history().to_vec()))
                    .unwrap_or_default();
                ThreadSnapshot {
                    thread_id: *thread_id,
                    creator: thread.creator.clone(),
                    fee_paid: thread.fee_paid,
                    lifecycle: thread.lifecycle.clone(),
                    commitments,
                    valid_roots,
                    comments: self
                        .discussion
                        .comments(*thread_id)
                        .map(|(id, c)| CommentSnapshot::from_record(id, c))
                        .collect(),
                }
            })
            .collect();

        StateSnapshot {
            version: SNAPSHOT_VERSION,
            owner: self.config.owner.clone(),
            fee: self.fee,
            balance: self.treasury.available(),
            sequence: self.sequence,
            tree_depth: self.groups.depth(),
            threads,
            nullifiers: self.nullifiers.iter().copied().collect(),
        }
    }

    /// Rebuild a core from a snapshot.
    ///
    /// Policy (join policy, lifecycle authority) comes from `config`. The
    /// owner, fee and balance come from the snapshot. The tree depth must
    /// agree.
    pub fn restore(
        mut config: ProtocolConfig,
        verifier: V,
        hasher: H,
        snapshot: StateSnapshot,
    ) -> Result<Self, ThreadsError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(corrupt(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        if snapshot.tree_depth != config.tree_depth {
            return Err(corrupt(format!(
                "snapshot tree depth {} differs from configured {}",
                snapshot.tree_depth, config.tree_depth
            )));
        }
        if config.owner != snapshot.owner {
            warn!(
                configured = %config.owner,
                persisted = %snapshot.owner,
                "using persisted owner"
            );
            config.owner = snapshot.owner.clone();
        }

        let mut core = Self::with_hasher(config, verifier, hasher)?;
        core.fee = snapshot.fee;
        core.treasury = Treasury::with_balance(snapshot.balance);
        core.sequence = snapshot.sequence;

        let thread_count = snapshot.threads.len();
        for t in snapshot.threads {
            let thread_id = t.thread_id;
            if core.threads.contains_key(&thread_id) {
                return Err(corrupt(format!("duplicate {thread_id}")));
            }

            core.groups.create_group(thread_id);
            for commitment in t.commitments {
                core.groups
                    .join(thread_id, commitment)
                    .map_err(|e| corrupt(format!("{thread_id}: {e}")))?;
            }
            let recomputed = core
                .groups
                .group(thread_id)
                .map(|g| g.root_history().to_vec())
                .unwrap_or_default();
            if recomputed != t.valid_roots {
                return Err(corrupt(format!(
                    "{thread_id}: stored roots do not match its commitments"
                )));
            }

            for comment in t.comments {
                let comment_id = comment.comment_id;
                let record = comment.into_record(thread_id)?;
                if !core.discussion.insert_persisted(thread_id, comment_id, record) {
                    return Err(corrupt(format!("{thread_id} has duplicate {comment_id}")));
                }
            }

            t.lifecycle
                .validate_history(snapshot.sequence)
                .map_err(|reason| corrupt(format!("{thread_id}: {reason}")))?;

            core.threads.insert(
                thread_id,
                ThreadRecord {
                    creator: t.creator,
                    fee_paid: t.fee_paid,
                    lifecycle: t.lifecycle,
                },
            );
        }

        core.nullifiers = NullifierLedger::from_persisted(&snapshot.nullifiers)
            .ok_or_else(|| corrupt("duplicate nullifier hash".to_string()))?;

        info!(
            threads = thread_count,
            nullifiers = core.nullifiers.len(),
            sequence = core.sequence,
            "state restored"
        );
        Ok(core)
    }
}
