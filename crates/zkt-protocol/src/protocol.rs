//! # ZkThreads Facade
//!
//! The single global state of the protocol and its public operations.
//!
//! | Operation | Who | Gate | Event |
//! |---|---|---|---|
//! | `create_thread` | anyone | fee paid | `NewThread` |
//! | `change_fee` | owner | | `FeeChanged` |
//! | `start_thread` | lifecycle authority | NOT_STARTED | `ThreadStatusChanged` |
//! | `pause_thread` | lifecycle authority | ACTIVE | `ThreadStatusChanged` |
//! | `resume_thread` | lifecycle authority | PAUSED | `ThreadStatusChanged` |
//! | `end_thread` | lifecycle authority | ACTIVE or PAUSED | `ThreadStatusChanged` |
//! | `join` | anyone | join policy | `UserJoinedThread` |
//! | `post_comment` | anonymous member | ACTIVE, proof | `NewComment` |
//! | `post_reply` | anonymous member | ACTIVE, proof | `NewReply` |
//! | `like_comment` | anonymous member | ACTIVE, proof | `CommentLiked` |
//! | `like_reply` | anonymous member | ACTIVE, proof | `ReplyLiked` |
//! | `withdraw_funds` | owner | | `FundsWithdrawn` |
//!
//! `list_commitments` and `available_funds` are reads.
//!
//! ## Execution model
//!
//! Operations take `&mut self` and run to completion. Each one checks
//! everything first and mutates only once every check has passed. An
//! accepted operation takes the next sequence number, which stamps its
//! event and, for lifecycle operations, its transition record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use zkt_core::{
    AccountId, Amount, CommentId, IdentityCommitment, MerkleRoot, NullifierHash, ReplyId, Scope,
    Signal, ThreadId, ThreadsError,
};
use zkt_crypto::{FieldHasher, Sha256FieldHasher};
use zkt_state::{LifecycleError, ThreadLifecycle, ThreadStatus};
use zkt_zkp::{MembershipVerifier, ProofBundle};

use crate::config::ProtocolConfig;
use crate::discussion::{CommentRecord, DiscussionLedger, ReplyRecord};
use crate::events::{EventRecord, ThreadEvent};
use crate::gateway::{Authorization, ProofGateway};
use crate::membership::{Group, GroupMembershipStore};
use crate::nullifier::NullifierLedger;
use crate::treasury::{Treasury, Withdrawal};

/// Per-thread bookkeeping outside the membership group and discussion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRecord {
    /// Account that created the thread.
    pub creator: AccountId,
    /// Amount escrowed at creation.
    #[serde(with = "crate::amount")]
    pub fee_paid: Amount,
    /// Lifecycle state and transition log.
    pub lifecycle: ThreadLifecycle,
}

impl ThreadRecord {
    pub fn status(&self) -> ThreadStatus {
        self.lifecycle.status
    }
}

type Transition = fn(&mut ThreadLifecycle, u64) -> Result<ThreadStatus, LifecycleError>;

/// Record a rejected operation and pass the result through.
fn observe<T>(op: &'static str, result: Result<T, ThreadsError>) -> Result<T, ThreadsError> {
    if let Err(err) = &result {
        metrics::counter!("zkthreads_operations_total", "op" => op, "outcome" => err.code())
            .increment(1);
        tracing::debug!(op, code = err.code(), error = %err, "operation rejected");
    }
    result
}

/// The protocol state machine.
#[derive(Debug)]
pub struct ZkThreads<V, H = Sha256FieldHasher> {
    pub(crate) config: ProtocolConfig,
    pub(crate) fee: Amount,
    pub(crate) threads: BTreeMap<ThreadId, ThreadRecord>,
    pub(crate) groups: GroupMembershipStore<H>,
    pub(crate) nullifiers: NullifierLedger,
    pub(crate) discussion: DiscussionLedger,
    pub(crate) treasury: Treasury,
    pub(crate) gateway: ProofGateway<V, H>,
    pub(crate) sequence: u64,
    journal: Vec<EventRecord>,
}

impl<V: MembershipVerifier> ZkThreads<V, Sha256FieldHasher> {
    /// Fresh protocol state using the SHA-256 reference hasher.
    pub fn new(config: ProtocolConfig, verifier: V) -> Result<Self, ThreadsError> {
        Self::with_hasher(config, verifier, Sha256FieldHasher)
    }
}

impl<V: MembershipVerifier, H: FieldHasher + Clone> ZkThreads<V, H> {
    /// Fresh protocol state with an explicit hasher.
    pub fn with_hasher(config: ProtocolConfig, verifier: V, hasher: H) -> Result<Self, ThreadsError> {
        config.validate()?;
        let groups = GroupMembershipStore::new(hasher.clone(), config.tree_depth)?;
        Ok(Self {
            fee: config.initial_fee,
            config,
            threads: BTreeMap::new(),
            groups,
            nullifiers: NullifierLedger::new(),
            discussion: DiscussionLedger::new(),
            treasury: Treasury::new(),
            gateway: ProofGateway::new(verifier, hasher),
            sequence: 0,
            journal: Vec::new(),
        })
    }

    // ── Fees and treasury ────────────────────────────────────────────

    /// Create a thread, escrowing `paid`. Fails below the fee in effect.
    pub fn create_thread(
        &mut self,
        caller: &AccountId,
        thread_id: ThreadId,
        paid: Amount,
    ) -> Result<(), ThreadsError> {
        const OP: &str = "create_thread";
        observe(OP, self.check_create_thread(thread_id, paid))?;

        self.treasury.deposit(paid)?;
        self.groups.create_group(thread_id);
        self.threads.insert(
            thread_id,
            ThreadRecord {
                creator: caller.clone(),
                fee_paid: paid,
                lifecycle: ThreadLifecycle::new(),
            },
        );
        info!(thread_id = thread_id.get(), creator = %caller, paid = %paid, "thread created");
        self.commit(OP, ThreadEvent::NewThread { thread_id });
        Ok(())
    }

    fn check_create_thread(&self, thread_id: ThreadId, paid: Amount) -> Result<(), ThreadsError> {
        if self.threads.contains_key(&thread_id) {
            return Err(ThreadsError::DuplicateThread { thread_id });
        }
        if paid < self.fee {
            return Err(ThreadsError::InsufficientFunds {
                required: self.fee,
                paid,
            });
        }
        self.treasury.checked_deposit(paid)?;
        Ok(())
    }

    /// Set the fee for future thread creations. Owner only.
    pub fn change_fee(&mut self, caller: &AccountId, new_fee: Amount) -> Result<(), ThreadsError> {
        const OP: &str = "change_fee";
        observe(OP, self.require_owner(caller, "change the fee"))?;

        let old_fee = std::mem::replace(&mut self.fee, new_fee);
        info!(old_fee = %old_fee, new_fee = %new_fee, "fee changed");
        self.commit(OP, ThreadEvent::FeeChanged { new_fee });
        Ok(())
    }

    /// Escrowed balance.
    pub fn available_funds(&self) -> Amount {
        self.treasury.available()
    }

    /// Move the whole balance to the owner. Owner only.
    pub fn withdraw_funds(&mut self, caller: &AccountId) -> Result<Withdrawal, ThreadsError> {
        const OP: &str = "withdraw_funds";
        observe(OP, self.require_owner(caller, "withdraw funds"))?;

        let withdrawal = self.treasury.withdraw(self.config.owner.clone());
        info!(to = %withdrawal.to, amount = %withdrawal.amount, "funds withdrawn");
        self.commit(
            OP,
            ThreadEvent::FundsWithdrawn {
                to: withdrawal.to.clone(),
                amount: withdrawal.amount,
            },
        );
        Ok(withdrawal)
    }

    fn require_owner(&self, caller: &AccountId, action: &'static str) -> Result<(), ThreadsError> {
        if caller != &self.config.owner {
            return Err(ThreadsError::Unauthorized {
                caller: caller.clone(),
                action,
            });
        }
        Ok(())
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// NOT_STARTED → ACTIVE.
    pub fn start_thread(&mut self, caller: &AccountId, thread_id: ThreadId) -> Result<ThreadStatus, ThreadsError> {
        self.transition("start_thread", caller, thread_id, ThreadLifecycle::start)
    }

    /// ACTIVE → PAUSED.
    pub fn pause_thread(&mut self, caller: &AccountId, thread_id: ThreadId) -> Result<ThreadStatus, ThreadsError> {
        self.transition("pause_thread", caller, thread_id, ThreadLifecycle::pause)
    }

    /// PAUSED → ACTIVE.
    pub fn resume_thread(&mut self, caller: &AccountId, thread_id: ThreadId) -> Result<ThreadStatus, ThreadsError> {
        self.transition("resume_thread", caller, thread_id, ThreadLifecycle::resume)
    }

    /// ACTIVE or PAUSED → ENDED.
    pub fn end_thread(&mut self, caller: &AccountId, thread_id: ThreadId) -> Result<ThreadStatus, ThreadsError> {
        self.transition("end_thread", caller, thread_id, ThreadLifecycle::end)
    }

    fn transition(
        &mut self,
        op: &'static str,
        caller: &AccountId,
        thread_id: ThreadId,
        apply: Transition,
    ) -> Result<ThreadStatus, ThreadsError> {
        let sequence = self.sequence + 1;
        let authority = self.config.lifecycle_authority;
        let result = match self.threads.get_mut(&thread_id) {
            None => Err(ThreadsError::ThreadNotFound { thread_id }),
            Some(thread) if !authority.permits(caller, &thread.creator, &self.config.owner) => {
                Err(ThreadsError::Unauthorized {
                    caller: caller.clone(),
                    action: op,
                })
            }
            Some(thread) => apply(&mut thread.lifecycle, sequence)
                .map_err(|e| e.into_threads_error(thread_id)),
        };
        let status = observe(op, result)?;

        info!(thread_id = thread_id.get(), %status, "thread status changed");
        self.commit(op, ThreadEvent::status_changed(thread_id, status));
        Ok(status)
    }

    // ── Membership ───────────────────────────────────────────────────

    /// Enroll `commitment` in the thread's anonymity set. Returns its leaf
    /// index.
    pub fn join(&mut self, thread_id: ThreadId, commitment: IdentityCommitment) -> Result<usize, ThreadsError> {
        const OP: &str = "join";
        observe(OP, self.check_join(thread_id))?;
        let (leaf_index, root) = observe(OP, self.groups.join(thread_id, commitment))?;

        info!(
            thread_id = thread_id.get(),
            leaf_index,
            root = %root,
            "identity joined thread"
        );
        self.commit(
            OP,
            ThreadEvent::UserJoinedThread {
                thread_id,
                identity_commitment: commitment,
            },
        );
        Ok(leaf_index)
    }

    fn check_join(&self, thread_id: ThreadId) -> Result<(), ThreadsError> {
        self.thread(thread_id)?
            .lifecycle
            .ensure_joinable(&self.config.join_policy)
            .map_err(|e| e.into_threads_error(thread_id))
    }

    /// Ordered commitments of a thread; what provers build paths from.
    pub fn list_commitments(&self, thread_id: ThreadId) -> Result<&[IdentityCommitment], ThreadsError> {
        self.groups.list_commitments(thread_id)
    }

    // ── Discussion ───────────────────────────────────────────────────

    /// Post a comment anonymously.
    pub fn post_comment(
        &mut self,
        thread_id: ThreadId,
        comment_id: CommentId,
        signal: Signal,
        bundle: &ProofBundle,
    ) -> Result<(), ThreadsError> {
        const OP: &str = "post_comment";
        let scope = Scope::comment(thread_id, comment_id);
        let auth = observe(OP, self.check_post(&scope, &signal, bundle))?;

        self.discussion.create(&scope, signal)?;
        self.nullifiers.consume(auth);
        info!(thread_id = thread_id.get(), comment_id = comment_id.get(), "comment posted");
        self.commit(
            OP,
            ThreadEvent::NewComment {
                thread_id,
                comment_id,
                signal,
            },
        );
        Ok(())
    }

    /// Post a reply to an existing comment anonymously.
    pub fn post_reply(
        &mut self,
        thread_id: ThreadId,
        comment_id: CommentId,
        reply_id: ReplyId,
        signal: Signal,
        bundle: &ProofBundle,
    ) -> Result<(), ThreadsError> {
        const OP: &str = "post_reply";
        let scope = Scope::reply(thread_id, comment_id, reply_id);
        let auth = observe(OP, self.check_post(&scope, &signal, bundle))?;

        self.discussion.create(&scope, signal)?;
        self.nullifiers.consume(auth);
        info!(
            thread_id = thread_id.get(),
            comment_id = comment_id.get(),
            reply_id = reply_id.get(),
            "reply posted"
        );
        self.commit(
            OP,
            ThreadEvent::NewReply {
                thread_id,
                comment_id,
                reply_id,
                signal,
            },
        );
        Ok(())
    }

    /// Like a comment anonymously. Returns the new total.
    pub fn like_comment(
        &mut self,
        thread_id: ThreadId,
        comment_id: CommentId,
        signal: Signal,
        bundle: &ProofBundle,
    ) -> Result<u64, ThreadsError> {
        const OP: &str = "like_comment";
        let scope = Scope::comment(thread_id, comment_id);
        let auth = observe(OP, self.check_like(&scope, &signal, bundle))?;

        let total_likes = self.discussion.like(&scope)?;
        self.nullifiers.consume(auth);
        info!(thread_id = thread_id.get(), comment_id = comment_id.get(), total_likes, "comment liked");
        self.commit(
            OP,
            ThreadEvent::CommentLiked {
                thread_id,
                comment_id,
                total_likes,
            },
        );
        Ok(total_likes)
    }

    /// Like a reply anonymously. Returns the new total.
    pub fn like_reply(
        &mut self,
        thread_id: ThreadId,
        comment_id: CommentId,
        reply_id: ReplyId,
        signal: Signal,
        bundle: &ProofBundle,
    ) -> Result<u64, ThreadsError> {
        const OP: &str = "like_reply";
        let scope = Scope::reply(thread_id, comment_id, reply_id);
        let auth = observe(OP, self.check_like(&scope, &signal, bundle))?;

        let total_likes = self.discussion.like(&scope)?;
        self.nullifiers.consume(auth);
        info!(
            thread_id = thread_id.get(),
            comment_id = comment_id.get(),
            reply_id = reply_id.get(),
            total_likes,
            "reply liked"
        );
        self.commit(
            OP,
            ThreadEvent::ReplyLiked {
                thread_id,
                comment_id,
                reply_id,
                total_likes,
            },
        );
        Ok(total_likes)
    }

    /// Thread state, parent existence, gateway, then vacancy.
    fn check_post(&self, scope: &Scope, signal: &Signal, bundle: &ProofBundle) -> Result<Authorization, ThreadsError> {
        self.require_active(scope.thread_id(), "post")?;
        if scope.reply_id().is_some() {
            self.discussion
                .require_comment(scope.thread_id(), scope.comment_id())?;
        }
        let auth = self.authorize(scope, signal, bundle)?;
        self.discussion.require_vacant(scope)?;
        Ok(auth)
    }

    /// Thread state, target existence, gateway, then counter headroom.
    fn check_like(&self, scope: &Scope, signal: &Signal, bundle: &ProofBundle) -> Result<Authorization, ThreadsError> {
        self.require_active(scope.thread_id(), "like")?;
        self.discussion.require_target(scope)?;
        let auth = self.authorize(scope, signal, bundle)?;
        self.discussion.next_like_count(scope)?;
        Ok(auth)
    }

    fn require_active(&self, thread_id: ThreadId, action: &'static str) -> Result<(), ThreadsError> {
        self.thread(thread_id)?
            .lifecycle
            .ensure_active(action)
            .map_err(|e| e.into_threads_error(thread_id))
    }

    fn authorize(&self, scope: &Scope, signal: &Signal, bundle: &ProofBundle) -> Result<Authorization, ThreadsError> {
        self.gateway
            .authorize(&self.groups, &self.nullifiers, scope, signal, bundle)
    }

    // ── Journal ──────────────────────────────────────────────────────

    fn commit(&mut self, op: &'static str, event: ThreadEvent) -> u64 {
        self.sequence += 1;
        self.journal.push(EventRecord {
            sequence: self.sequence,
            event,
        });
        metrics::counter!("zkthreads_operations_total", "op" => op, "outcome" => "accepted")
            .increment(1);
        self.sequence
    }

    /// Events not yet drained, oldest first.
    pub fn events(&self) -> &[EventRecord] {
        &self.journal
    }

    /// Hand the journal to the host and clear it.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.journal)
    }

    /// Sequence number of the last accepted operation.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn owner(&self) -> &AccountId {
        &self.config.owner
    }

    /// Fee in effect for the next thread creation.
    pub fn fee(&self) -> Amount {
        self.fee
    }

    pub fn hasher(&self) -> &H {
        self.gateway.hasher()
    }

    pub fn tree_depth(&self) -> u32 {
        self.groups.depth()
    }

    pub fn thread(&self, thread_id: ThreadId) -> Result<&ThreadRecord, ThreadsError> {
        self.threads
            .get(&thread_id)
            .ok_or(ThreadsError::ThreadNotFound { thread_id })
    }

    pub fn status(&self, thread_id: ThreadId) -> Result<ThreadStatus, ThreadsError> {
        self.thread(thread_id).map(ThreadRecord::status)
    }

    /// All threads in id order.
    pub fn threads(&self) -> impl Iterator<Item = (ThreadId, &ThreadRecord)> {
        self.threads.iter().map(|(id, t)| (*id, t))
    }

    pub fn group(&self, thread_id: ThreadId) -> Result<&Group<H>, ThreadsError> {
        self.groups
            .group(thread_id)
            .ok_or(ThreadsError::ThreadNotFound { thread_id })
    }

    pub fn current_root(&self, thread_id: ThreadId) -> Result<Option<MerkleRoot>, ThreadsError> {
        self.group(thread_id).map(Group::current_root)
    }

    pub fn is_known_root(&self, thread_id: ThreadId, root: &MerkleRoot) -> bool {
        self.groups.is_known_root(thread_id, root)
    }

    pub fn member_count(&self, thread_id: ThreadId) -> Result<usize, ThreadsError> {
        self.group(thread_id).map(Group::member_count)
    }

    pub fn leaf_index_of(&self, thread_id: ThreadId, commitment: &IdentityCommitment) -> Result<Option<usize>, ThreadsError> {
        Ok(self.group(thread_id)?.leaf_index_of(commitment))
    }

    pub fn comment(&self, thread_id: ThreadId, comment_id: CommentId) -> Option<&CommentRecord> {
        self.discussion.comment(thread_id, comment_id)
    }

    pub fn reply(&self, thread_id: ThreadId, comment_id: CommentId, reply_id: ReplyId) -> Option<&ReplyRecord> {
        self.discussion.reply(thread_id, comment_id, reply_id)
    }

    /// Comments of a thread in id order.
    pub fn comments(&self, thread_id: ThreadId) -> impl Iterator<Item = (CommentId, &CommentRecord)> {
        self.discussion.comments(thread_id)
    }

    pub fn is_nullifier_used(&self, nullifier_hash: &NullifierHash) -> bool {
        self.nullifiers.contains(nullifier_hash)
    }

    pub fn nullifier_count(&self) -> usize {
        self.nullifiers.len()
    }
}
