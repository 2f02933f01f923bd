//! Comments, replies and like counters.
//!
//! Keys are immutable once created; only like counters change. Every
//! mutator checks before it writes, so an `Err` leaves the ledger as it was.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use zkt_core::{CommentId, ReplyId, Scope, Signal, ThreadId, ThreadsError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRecord {
    pub signal: Signal,
    pub likes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub signal: Signal,
    pub likes: u64,
    pub replies: BTreeMap<ReplyId, ReplyRecord>,
}

impl CommentRecord {
    fn new(signal: Signal) -> Self {
        Self {
            signal,
            likes: 0,
            replies: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscussionLedger {
    comments: BTreeMap<(ThreadId, CommentId), CommentRecord>,
}

impl DiscussionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comment(&self, thread_id: ThreadId, comment_id: CommentId) -> Option<&CommentRecord> {
        self.comments.get(&(thread_id, comment_id))
    }

    pub fn reply(
        &self,
        thread_id: ThreadId,
        comment_id: CommentId,
        reply_id: ReplyId,
    ) -> Option<&ReplyRecord> {
        self.comment(thread_id, comment_id)?.replies.get(&reply_id)
    }

    /// Comments of one thread in id order.
    pub fn comments(&self, thread_id: ThreadId) -> impl Iterator<Item = (CommentId, &CommentRecord)> {
        self.comments
            .range((thread_id, CommentId(0))..=(thread_id, CommentId(u64::MAX)))
            .map(|((_, id), c)| (*id, c))
    }

    pub fn comment_count(&self, thread_id: ThreadId) -> usize {
        self.comments(thread_id).count()
    }

    /// Check that the comment exists.
    pub fn require_comment(&self, thread_id: ThreadId, comment_id: CommentId) -> Result<&CommentRecord, ThreadsError> {
        self.comment(thread_id, comment_id)
            .ok_or(ThreadsError::CommentNotFound {
                thread_id,
                comment_id,
            })
    }

    /// Check that the reply and its parent exist.
    pub fn require_reply(
        &self,
        thread_id: ThreadId,
        comment_id: CommentId,
        reply_id: ReplyId,
    ) -> Result<&ReplyRecord, ThreadsError> {
        self.require_comment(thread_id, comment_id)?
            .replies
            .get(&reply_id)
            .ok_or(ThreadsError::ReplyNotFound {
                thread_id,
                comment_id,
                reply_id,
            })
    }

    /// Check that the entity at `scope` exists.
    pub fn require_target(&self, scope: &Scope) -> Result<(), ThreadsError> {
        match *scope {
            Scope::Comment {
                thread_id,
                comment_id,
            } => self.require_comment(thread_id, comment_id).map(|_| ()),
            Scope::Reply {
                thread_id,
                comment_id,
                reply_id,
            } => self.require_reply(thread_id, comment_id, reply_id).map(|_| ()),
        }
    }

    /// Check that nothing exists at `scope` yet. A reply's parent comment
    /// must exist.
    pub fn require_vacant(&self, scope: &Scope) -> Result<(), ThreadsError> {
        let taken = match *scope {
            Scope::Comment {
                thread_id,
                comment_id,
            } => self.comment(thread_id, comment_id).is_some(),
            Scope::Reply {
                thread_id,
                comment_id,
                reply_id,
            } => self
                .require_comment(thread_id, comment_id)?
                .replies
                .contains_key(&reply_id),
        };
        if taken {
            return Err(ThreadsError::DuplicateEntity { scope: *scope });
        }
        Ok(())
    }

    /// Like count after one more like on `scope`.
    pub fn next_like_count(&self, scope: &Scope) -> Result<u64, ThreadsError> {
        let current = match *scope {
            Scope::Comment {
                thread_id,
                comment_id,
            } => self.require_comment(thread_id, comment_id)?.likes,
            Scope::Reply {
                thread_id,
                comment_id,
                reply_id,
            } => self.require_reply(thread_id, comment_id, reply_id)?.likes,
        };
        current
            .checked_add(1)
            .ok_or(ThreadsError::CounterOverflow { scope: *scope })
    }

    /// Create the comment or reply at `scope`.
    pub fn create(&mut self, scope: &Scope, signal: Signal) -> Result<(), ThreadsError> {
        self.require_vacant(scope)?;
        match *scope {
            Scope::Comment {
                thread_id,
                comment_id,
            } => {
                self.comments
                    .insert((thread_id, comment_id), CommentRecord::new(signal));
            }
            Scope::Reply {
                thread_id,
                comment_id,
                reply_id,
            } => {
                if let Some(comment) = self.comments.get_mut(&(thread_id, comment_id)) {
                    comment
                        .replies
                        .insert(reply_id, ReplyRecord { signal, likes: 0 });
                }
            }
        }
        Ok(())
    }

    /// Add one like to `scope`; returns the new total.
    pub fn like(&mut self, scope: &Scope) -> Result<u64, ThreadsError> {
        let total = self.next_like_count(scope)?;
        let counter = match *scope {
            Scope::Comment {
                thread_id,
                comment_id,
            } => self
                .comments
                .get_mut(&(thread_id, comment_id))
                .map(|c| &mut c.likes),
            Scope::Reply {
                thread_id,
                comment_id,
                reply_id,
            } => self
                .comments
                .get_mut(&(thread_id, comment_id))
                .and_then(|c| c.replies.get_mut(&reply_id))
                .map(|r| &mut r.likes),
        };
        if let Some(likes) = counter {
            *likes = total;
        }
        Ok(total)
    }

    pub(crate) fn insert_persisted(
        &mut self,
        thread_id: ThreadId,
        comment_id: CommentId,
        record: CommentRecord,
    ) -> bool {
        self.comments.insert((thread_id, comment_id), record).is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: ThreadId = ThreadId(1);

    fn signal() -> Signal {
        Signal::from_label("post").unwrap()
    }

    fn c(id: u64) -> Scope {
        Scope::comment(T, CommentId(id))
    }

    fn r(comment: u64, reply: u64) -> Scope {
        Scope::reply(T, CommentId(comment), ReplyId(reply))
    }

    // ── Creation ─────────────────────────────────────────────────────

    #[test]
    fn test_create_comment_and_reply() {
        let mut d = DiscussionLedger::new();
        d.create(&c(1), signal()).unwrap();
        d.create(&r(1, 1), signal()).unwrap();
        assert_eq!(d.comment(T, CommentId(1)).unwrap().likes, 0);
        assert_eq!(d.reply(T, CommentId(1), ReplyId(1)).unwrap().signal, signal());
    }

    #[test]
    fn test_duplicate_entity() {
        let mut d = DiscussionLedger::new();
        d.create(&c(1), signal()).unwrap();
        d.create(&r(1, 1), signal()).unwrap();
        assert_eq!(d.create(&c(1), signal()).unwrap_err().code(), "duplicate_entity");
        assert_eq!(d.create(&r(1, 1), signal()).unwrap_err().code(), "duplicate_entity");
    }

    #[test]
    fn test_reply_needs_parent() {
        let mut d = DiscussionLedger::new();
        let err = d.create(&r(1, 1), signal()).unwrap_err();
        assert_eq!(err.code(), "comment_not_found");
        assert_eq!(d.comment_count(T), 0);
    }

    // ── Likes ────────────────────────────────────────────────────────

    #[test]
    fn test_like_counters_are_independent() {
        let mut d = DiscussionLedger::new();
        d.create(&c(1), signal()).unwrap();
        d.create(&c(2), signal()).unwrap();
        d.create(&r(1, 1), signal()).unwrap();
        assert_eq!(d.like(&c(1)).unwrap(), 1);
        assert_eq!(d.like(&c(1)).unwrap(), 2);
        assert_eq!(d.like(&r(1, 1)).unwrap(), 1);
        assert_eq!(d.comment(T, CommentId(2)).unwrap().likes, 0);
    }

    #[test]
    fn test_like_missing_targets() {
        let mut d = DiscussionLedger::new();
        assert_eq!(d.like(&c(1)).unwrap_err().code(), "comment_not_found");
        d.create(&c(1), signal()).unwrap();
        assert_eq!(d.like(&r(1, 9)).unwrap_err().code(), "reply_not_found");
    }

    #[test]
    fn test_counter_overflow_leaves_count() {
        let mut d = DiscussionLedger::new();
        d.create(&c(1), signal()).unwrap();
        if let Some(comment) = d.comments.get_mut(&(T, CommentId(1))) {
            comment.likes = u64::MAX;
        }
        assert_eq!(d.like(&c(1)).unwrap_err().code(), "counter_overflow");
        assert_eq!(d.comment(T, CommentId(1)).unwrap().likes, u64::MAX);
    }

    // ── Reads ────────────────────────────────────────────────────────

    #[test]
    fn test_comments_scoped_to_thread_in_order() {
        let mut d = DiscussionLedger::new();
        d.create(&c(3), signal()).unwrap();
        d.create(&c(1), signal()).unwrap();
        d.create(&Scope::comment(ThreadId(2), CommentId(2)), signal())
            .unwrap();
        let ids: Vec<_> = d.comments(T).map(|(id, _)| id).collect();
        assert_eq!(ids, [CommentId(1), CommentId(3)]);
    }
}
