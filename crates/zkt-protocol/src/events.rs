//! Events emitted by accepted operations.
//!
//! Each accepted operation emits exactly one event, stamped with the
//! operation's sequence number. Serialized form is internally tagged:
//! `{"sequence": 3, "event": "NewComment", "thread_id": 1, ...}`.

use serde::{Deserialize, Serialize};

use zkt_core::{AccountId, Amount, CommentId, IdentityCommitment, ReplyId, Signal, ThreadId};
use zkt_state::ThreadStatus;

/// Something the protocol did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum ThreadEvent {
    NewThread {
        thread_id: ThreadId,
    },
    FeeChanged {
        #[serde(with = "crate::amount")]
        new_fee: Amount,
    },
    /// `code` is the numeric status (0, 2, 3 or 4) that on-chain consumers
    /// decode; build with [`ThreadEvent::status_changed`].
    ThreadStatusChanged {
        thread_id: ThreadId,
        status: ThreadStatus,
        code: u8,
    },
    UserJoinedThread {
        thread_id: ThreadId,
        identity_commitment: IdentityCommitment,
    },
    NewComment {
        thread_id: ThreadId,
        comment_id: CommentId,
        signal: Signal,
    },
    NewReply {
        thread_id: ThreadId,
        comment_id: CommentId,
        reply_id: ReplyId,
        signal: Signal,
    },
    CommentLiked {
        thread_id: ThreadId,
        comment_id: CommentId,
        total_likes: u64,
    },
    ReplyLiked {
        thread_id: ThreadId,
        comment_id: CommentId,
        reply_id: ReplyId,
        total_likes: u64,
    },
    FundsWithdrawn {
        to: AccountId,
        #[serde(with = "crate::amount")]
        amount: Amount,
    },
}

impl ThreadEvent {
    /// Status change carrying both the status name and its numeric code.
    pub fn status_changed(thread_id: ThreadId, status: ThreadStatus) -> Self {
        Self::ThreadStatusChanged {
            thread_id,
            status,
            code: status.code(),
        }
    }

    /// Event name as it appears in the `event` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewThread { .. } => "NewThread",
            Self::FeeChanged { .. } => "FeeChanged",
            Self::ThreadStatusChanged { .. } => "ThreadStatusChanged",
            Self::UserJoinedThread { .. } => "UserJoinedThread",
            Self::NewComment { .. } => "NewComment",
            Self::NewReply { .. } => "NewReply",
            Self::CommentLiked { .. } => "CommentLiked",
            Self::ReplyLiked { .. } => "ReplyLiked",
            Self::FundsWithdrawn { .. } => "FundsWithdrawn",
        }
    }
}

/// A journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Sequence number of the operation that emitted the event.
    pub sequence: u64,
    #[serde(flatten)]
    pub event: ThreadEvent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_shape() {
        let record = EventRecord {
            sequence: 7,
            event: ThreadEvent::NewThread {
                thread_id: ThreadId(1),
            },
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"sequence": 7, "event": "NewThread", "thread_id": 1})
        );
    }

    #[test]
    fn test_status_and_amount_encoding() {
        let status = ThreadEvent::status_changed(ThreadId(1), ThreadStatus::Paused);
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "PAUSED");
        assert_eq!(json["code"], 2);
        let ended = ThreadEvent::status_changed(ThreadId(1), ThreadStatus::Ended);
        assert_eq!(serde_json::to_value(&ended).unwrap()["code"], 4);

        let fee = ThreadEvent::FeeChanged {
            new_fee: 2_000_000_000_000_000_000,
        };
        let json = serde_json::to_value(&fee).unwrap();
        assert_eq!(json["new_fee"], "2000000000000000000");
    }

    #[test]
    fn test_journal_round_trip() {
        let records = vec![
            EventRecord {
                sequence: 1,
                event: ThreadEvent::FundsWithdrawn {
                    to: AccountId::new("owner"),
                    amount: 3,
                },
            },
            EventRecord {
                sequence: 2,
                event: ThreadEvent::ReplyLiked {
                    thread_id: ThreadId(1),
                    comment_id: CommentId(1),
                    reply_id: ReplyId(2),
                    total_likes: 5,
                },
            },
        ];
        let json = serde_json::to_string(&records).unwrap();
        let back: Vec<EventRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, records);
        assert_eq!(back[1].event.name(), "ReplyLiked");
    }
}
