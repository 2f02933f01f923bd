//! # Action Scopes
//!
//! A scope names the entity an anonymous action targets: a comment, or a
//! reply under a comment. The scope is what an external nullifier encodes,
//! so one identity gets exactly one action per scope.
//!
//! The scope label (`"{thread}_{comment}"` or
//! `"{thread}_{comment}_{reply}"`) is the byte string the configured hasher
//! turns into the external nullifier. Post and like on the same entity share
//! a label, and therefore share a nullifier slot.

use serde::{Deserialize, Serialize};

use crate::identity::{CommentId, ReplyId, ThreadId};

/// Target entity of an anonymous action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    /// A top-level comment in a thread.
    Comment {
        /// Owning thread.
        thread_id: ThreadId,
        /// Comment within the thread.
        comment_id: CommentId,
    },
    /// A reply to a comment.
    Reply {
        /// Owning thread.
        thread_id: ThreadId,
        /// Parent comment.
        comment_id: CommentId,
        /// Reply within the comment.
        reply_id: ReplyId,
    },
}

impl Scope {
    /// Scope of a comment.
    pub fn comment(thread_id: ThreadId, comment_id: CommentId) -> Self {
        Self::Comment {
            thread_id,
            comment_id,
        }
    }

    /// Scope of a reply.
    pub fn reply(thread_id: ThreadId, comment_id: CommentId, reply_id: ReplyId) -> Self {
        Self::Reply {
            thread_id,
            comment_id,
            reply_id,
        }
    }

    /// The thread this scope belongs to.
    pub fn thread_id(&self) -> ThreadId {
        match self {
            Self::Comment { thread_id, .. } | Self::Reply { thread_id, .. } => *thread_id,
        }
    }

    /// The comment this scope belongs to (the parent, for replies).
    pub fn comment_id(&self) -> CommentId {
        match self {
            Self::Comment { comment_id, .. } | Self::Reply { comment_id, .. } => *comment_id,
        }
    }

    /// The reply id, if this is a reply scope.
    pub fn reply_id(&self) -> Option<ReplyId> {
        match self {
            Self::Comment { .. } => None,
            Self::Reply { reply_id, .. } => Some(*reply_id),
        }
    }

    /// Underscore-joined numeric path used as external-nullifier preimage.
    pub fn label(&self) -> String {
        match self {
            Self::Comment {
                thread_id,
                comment_id,
            } => format!("{}_{}", thread_id.get(), comment_id.get()),
            Self::Reply {
                thread_id,
                comment_id,
                reply_id,
            } => format!("{}_{}_{}", thread_id.get(), comment_id.get(), reply_id.get()),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Comment {
                thread_id,
                comment_id,
            } => write!(f, "{thread_id}/{comment_id}"),
            Self::Reply {
                thread_id,
                comment_id,
                reply_id,
            } => write!(f, "{thread_id}/{comment_id}/{reply_id}"),
        }
    }
}
