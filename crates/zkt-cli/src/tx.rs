//! # Transaction Log
//!
//! A log is a JSON array of transactions in host order:
//!
//! ```json
//! [
//!   { "caller": "0xalice", "action": { "op": "create_thread", "thread_id": 1, "paid": "1000000000000000000" } },
//!   { "caller": "0xalice", "action": { "op": "start_thread", "thread_id": 1 } },
//!   { "caller": "relayer", "action": { "op": "join", "thread_id": 1, "identity_commitment": "0x..." } }
//! ]
//! ```
//!
//! Anonymous actions carry the signal and the proof bundle; their caller
//! is whoever relayed them and plays no part in authorization.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use zkt_core::{
    AccountId, Amount, CommentId, IdentityCommitment, ReplyId, Signal, ThreadId, ThreadsError,
};
use zkt_protocol::ZkThreads;
use zkt_zkp::{MembershipVerifier, ProofBundle};

/// One operation as submitted to the host ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    CreateThread {
        thread_id: ThreadId,
        #[serde(with = "zkt_protocol::amount")]
        paid: Amount,
    },
    ChangeFee {
        #[serde(with = "zkt_protocol::amount")]
        new_fee: Amount,
    },
    StartThread {
        thread_id: ThreadId,
    },
    PauseThread {
        thread_id: ThreadId,
    },
    ResumeThread {
        thread_id: ThreadId,
    },
    EndThread {
        thread_id: ThreadId,
    },
    Join {
        thread_id: ThreadId,
        identity_commitment: IdentityCommitment,
    },
    PostComment {
        thread_id: ThreadId,
        comment_id: CommentId,
        signal: Signal,
        proof: ProofBundle,
    },
    PostReply {
        thread_id: ThreadId,
        comment_id: CommentId,
        reply_id: ReplyId,
        signal: Signal,
        proof: ProofBundle,
    },
    LikeComment {
        thread_id: ThreadId,
        comment_id: CommentId,
        signal: Signal,
        proof: ProofBundle,
    },
    LikeReply {
        thread_id: ThreadId,
        comment_id: CommentId,
        reply_id: ReplyId,
        signal: Signal,
        proof: ProofBundle,
    },
    WithdrawFunds,
}

/// A caller and the action it submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub caller: AccountId,
    pub action: Action,
}

impl Transaction {
    pub fn new(caller: impl Into<AccountId>, action: Action) -> Self {
        Self {
            caller: caller.into(),
            action,
        }
    }

    /// Apply to `core`. Either the whole transaction commits or nothing does.
    pub fn apply<V: MembershipVerifier>(&self, core: &mut ZkThreads<V>) -> Result<(), ThreadsError> {
        let caller = &self.caller;
        match &self.action {
            Action::CreateThread { thread_id, paid } => core.create_thread(caller, *thread_id, *paid),
            Action::ChangeFee { new_fee } => core.change_fee(caller, *new_fee),
            Action::StartThread { thread_id } => core.start_thread(caller, *thread_id).map(drop),
            Action::PauseThread { thread_id } => core.pause_thread(caller, *thread_id).map(drop),
            Action::ResumeThread { thread_id } => core.resume_thread(caller, *thread_id).map(drop),
            Action::EndThread { thread_id } => core.end_thread(caller, *thread_id).map(drop),
            Action::Join {
                thread_id,
                identity_commitment,
            } => core.join(*thread_id, *identity_commitment).map(drop),
            Action::PostComment {
                thread_id,
                comment_id,
                signal,
                proof,
            } => core.post_comment(*thread_id, *comment_id, *signal, proof),
            Action::PostReply {
                thread_id,
                comment_id,
                reply_id,
                signal,
                proof,
            } => core.post_reply(*thread_id, *comment_id, *reply_id, *signal, proof),
            Action::LikeComment {
                thread_id,
                comment_id,
                signal,
                proof,
            } => core
                .like_comment(*thread_id, *comment_id, *signal, proof)
                .map(drop),
            Action::LikeReply {
                thread_id,
                comment_id,
                reply_id,
                signal,
                proof,
            } => core
                .like_reply(*thread_id, *comment_id, *reply_id, *signal, proof)
                .map(drop),
            Action::WithdrawFunds => core.withdraw_funds(caller).map(drop),
        }
    }
}

/// Read a transaction log.
pub fn read_log(path: &Path) -> Result<Vec<Transaction>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read transaction log {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("malformed transaction log {}", path.display()))
}

/// Write a transaction log as pretty JSON.
pub fn write_log(path: &Path, log: &[Transaction]) -> Result<()> {
    let json = serde_json::to_string_pretty(log)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write transaction log {}", path.display()))
}
