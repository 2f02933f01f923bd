//! # End-to-end protocol scenarios
//!
//! Drives `ZkThreads` through full discussions with mock identities and the
//! transparent mock proof system.

use zkt_core::{AccountId, Amount, CommentId, ReplyId, Scope, Signal, ThreadId, ThreadsError};
use zkt_protocol::{ProtocolConfig, ThreadEvent, ZkThreads};
use zkt_state::ThreadStatus;
use zkt_zkp::{MockIdentity, MockProofSystem, ProofBundle};

const ETHER: Amount = 1_000_000_000_000_000_000;
const T1: ThreadId = ThreadId(1);
const T2: ThreadId = ThreadId(2);
const C1: CommentId = CommentId(1);
const C2: CommentId = CommentId(2);
const R1: ReplyId = ReplyId(1);
const R2: ReplyId = ReplyId(2);

type Core = ZkThreads<MockProofSystem>;

struct World {
    core: Core,
    owner: AccountId,
    alice: MockIdentity,
    bob: MockIdentity,
    charlie: MockIdentity,
}

fn post() -> Signal {
    Signal::from_label("post").unwrap()
}

fn vote() -> Signal {
    Signal::from_label("vote").unwrap()
}

fn world() -> World {
    let core = ZkThreads::new(ProtocolConfig::new("owner"), MockProofSystem).unwrap();
    let h = *core.hasher();
    World {
        core,
        owner: AccountId::new("owner"),
        alice: MockIdentity::from_seed(&h, "alice"),
        bob: MockIdentity::from_seed(&h, "bob"),
        charlie: MockIdentity::from_seed(&h, "charlie"),
    }
}

fn prove(core: &Core, identity: &MockIdentity, scope: Scope, signal: Signal) -> ProofBundle {
    let members = core.list_commitments(scope.thread_id()).unwrap();
    MockProofSystem
        .prove(core.hasher(), core.tree_depth(), identity, members, &scope, &signal)
        .unwrap()
}

/// T1 active with alice, bob and charlie enrolled.
fn discussion() -> World {
    let mut w = world();
    let anyone = AccountId::new("anyone");
    w.core.create_thread(&anyone, T1, ETHER).unwrap();
    w.core.start_thread(&anyone, T1).unwrap();
    for id in [&w.alice, &w.bob, &w.charlie] {
        let c = id.commitment(w.core.hasher());
        w.core.join(T1, c).unwrap();
    }
    w
}

fn post_comment(w: &mut World, who: &MockIdentity, comment: CommentId) -> Result<(), ThreadsError> {
    let bundle = prove(&w.core, who, Scope::comment(T1, comment), post());
    w.core.post_comment(T1, comment, post(), &bundle)
}

fn post_reply(w: &mut World, who: &MockIdentity, comment: CommentId, reply: ReplyId) -> Result<(), ThreadsError> {
    let bundle = prove(&w.core, who, Scope::reply(T1, comment, reply), post());
    w.core.post_reply(T1, comment, reply, post(), &bundle)
}

fn like_comment(w: &mut World, who: &MockIdentity, comment: CommentId) -> Result<u64, ThreadsError> {
    let bundle = prove(&w.core, who, Scope::comment(T1, comment), vote());
    w.core.like_comment(T1, comment, vote(), &bundle)
}

fn like_reply(w: &mut World, who: &MockIdentity, comment: CommentId, reply: ReplyId) -> Result<u64, ThreadsError> {
    let bundle = prove(&w.core, who, Scope::reply(T1, comment, reply), vote());
    w.core.like_reply(T1, comment, reply, vote(), &bundle)
}

fn names(core: &Core) -> Vec<&'static str> {
    core.events().iter().map(|r| r.event.name()).collect()
}

// ── Reference scenario ───────────────────────────────────────────────

#[test]
fn test_reference_scenario() {
    let mut w = world();
    let anyone = AccountId::new("anyone");

    w.core.create_thread(&anyone, T1, ETHER).unwrap();
    assert_eq!(
        w.core.events()[0].event,
        ThreadEvent::NewThread { thread_id: T1 }
    );

    assert_eq!(w.core.start_thread(&anyone, T1).unwrap(), ThreadStatus::Active);

    for id in [&w.alice, &w.bob, &w.charlie] {
        let c = id.commitment(w.core.hasher());
        w.core.join(T1, c).unwrap();
    }

    let (alice, bob, charlie) = (w.alice.clone(), w.bob.clone(), w.charlie.clone());
    post_comment(&mut w, &alice, C1).unwrap();
    assert_eq!(like_comment(&mut w, &bob, C1).unwrap(), 1);
    assert_eq!(like_comment(&mut w, &charlie, C1).unwrap(), 2);
    assert_eq!(
        like_comment(&mut w, &bob, C1).unwrap_err().code(),
        "nullifier_reuse"
    );

    assert_eq!(w.core.pause_thread(&anyone, T1).unwrap(), ThreadStatus::Paused);
    assert_eq!(w.core.end_thread(&anyone, T1).unwrap(), ThreadStatus::Ended);
    let err = w.core.start_thread(&anyone, T1).unwrap_err();
    assert!(err.to_string().contains("state should be Not Started"));

    assert_eq!(
        names(&w.core),
        [
            "NewThread",
            "ThreadStatusChanged",
            "UserJoinedThread",
            "UserJoinedThread",
            "UserJoinedThread",
            "NewComment",
            "CommentLiked",
            "CommentLiked",
            "ThreadStatusChanged",
            "ThreadStatusChanged",
        ]
    );
    assert_eq!(
        w.core.events()[7].event,
        ThreadEvent::CommentLiked {
            thread_id: T1,
            comment_id: C1,
            total_likes: 2
        }
    );
    let sequences: Vec<_> = w.core.events().iter().map(|r| r.sequence).collect();
    assert_eq!(sequences, (1..=10).collect::<Vec<_>>());
}

#[test]
fn test_fee_and_treasury_flow() {
    let mut w = world();
    let anyone = AccountId::new("anyone");
    w.core.create_thread(&anyone, T1, ETHER).unwrap();
    assert_eq!(
        w.core.create_thread(&anyone, T1, ETHER).unwrap_err().code(),
        "duplicate_thread"
    );
    assert_eq!(
        w.core.create_thread(&anyone, T2, ETHER / 2).unwrap_err().code(),
        "insufficient_funds"
    );

    w.core.change_fee(&w.owner.clone(), 2 * ETHER).unwrap();
    assert_eq!(
        w.core.events().last().unwrap().event,
        ThreadEvent::FeeChanged { new_fee: 2 * ETHER }
    );
    w.core.create_thread(&anyone, T2, 2 * ETHER).unwrap();

    assert_eq!(w.core.available_funds(), 3 * ETHER);
    let withdrawal = w.core.withdraw_funds(&w.owner.clone()).unwrap();
    assert_eq!(withdrawal.amount, 3 * ETHER);
    assert_eq!(w.core.available_funds(), 0);
}

// ── One action per identity per scope ────────────────────────────────

#[test]
fn test_post_and_like_share_a_scope() {
    let mut w = discussion();
    let (alice, bob, charlie) = (w.alice.clone(), w.bob.clone(), w.charlie.clone());

    post_comment(&mut w, &alice, C1).unwrap();
    post_reply(&mut w, &alice, C1, R1).unwrap();
    post_comment(&mut w, &bob, C2).unwrap();

    // posting under C1 spent alice's C1 nullifier
    assert_eq!(like_comment(&mut w, &alice, C1).unwrap_err().code(), "nullifier_reuse");
    assert_eq!(like_comment(&mut w, &alice, C2).unwrap(), 1);

    assert_eq!(like_reply(&mut w, &bob, C1, R1).unwrap(), 1);
    assert_eq!(like_reply(&mut w, &charlie, C1, R1).unwrap(), 2);
    assert_eq!(like_reply(&mut w, &bob, C1, R1).unwrap_err().code(), "nullifier_reuse");

    post_reply(&mut w, &alice, C1, R2).unwrap();
    assert_eq!(like_reply(&mut w, &bob, C1, R2).unwrap(), 1);

    assert_eq!(w.core.comment(T1, C1).unwrap().likes, 0);
    assert_eq!(w.core.comment(T1, C2).unwrap().likes, 1);
    assert_eq!(w.core.reply(T1, C1, R1).unwrap().likes, 2);
}

#[test]
fn test_reply_author_can_like_parent_comment() {
    let mut w = discussion();
    let (alice, bob) = (w.alice.clone(), w.bob.clone());
    post_comment(&mut w, &alice, C1).unwrap();
    post_reply(&mut w, &bob, C1, R1).unwrap();
    assert_eq!(like_comment(&mut w, &bob, C1).unwrap(), 1);
}

// ── Atomicity ────────────────────────────────────────────────────────

#[test]
fn test_failures_leave_state_untouched() {
    let mut w = discussion();
    let (alice, bob) = (w.alice.clone(), w.bob.clone());
    post_comment(&mut w, &alice, C1).unwrap();

    let before = serde_json::to_string(&w.core.snapshot()).unwrap();
    let events_before = w.core.events().len();

    assert!(like_comment(&mut w, &alice, C1).is_err());
    assert!(post_comment(&mut w, &bob, C1).is_err());
    assert!(post_reply(&mut w, &bob, C2, R1).is_err());
    assert!(like_reply(&mut w, &bob, C1, R1).is_err());
    assert!(w.core.change_fee(&AccountId::new("mallory"), 0).is_err());
    assert!(w.core.withdraw_funds(&AccountId::new("mallory")).is_err());
    assert!(w.core.resume_thread(&AccountId::new("anyone"), T1).is_err());
    let commitment = alice.commitment(w.core.hasher());
    assert!(w.core.join(T1, commitment).is_err());

    let after = serde_json::to_string(&w.core.snapshot()).unwrap();
    assert_eq!(before, after);
    assert_eq!(w.core.events().len(), events_before);
}

#[test]
fn test_scope_mismatch_consumes_nothing() {
    let mut w = discussion();
    let alice = w.alice.clone();
    post_comment(&mut w, &alice, C1).unwrap();
    post_comment(&mut w, &alice, C2).unwrap();

    let bob = w.bob.clone();
    let for_c1 = prove(&w.core, &bob, Scope::comment(T1, C1), vote());
    let err = w.core.like_comment(T1, C2, vote(), &for_c1).unwrap_err();
    assert!(matches!(err, ThreadsError::ScopeMismatch { .. }));
    assert!(!w.core.is_nullifier_used(&for_c1.nullifier_hash));

    assert_eq!(w.core.like_comment(T1, C1, vote(), &for_c1).unwrap(), 1);
}

// ── Root history ─────────────────────────────────────────────────────

#[test]
fn test_proof_against_older_root_still_verifies() {
    let mut w = discussion();
    let alice = w.alice.clone();
    let stale = prove(&w.core, &alice, Scope::comment(T1, C1), post());

    let dave = MockIdentity::from_seed(w.core.hasher(), "dave");
    let c = dave.commitment(w.core.hasher());
    w.core.join(T1, c).unwrap();
    assert_ne!(w.core.current_root(T1).unwrap(), Some(stale.root));
    assert!(w.core.is_known_root(T1, &stale.root));

    w.core.post_comment(T1, C1, post(), &stale).unwrap();
}

#[test]
fn test_root_from_other_thread_is_unknown() {
    let mut w = discussion();
    let anyone = AccountId::new("anyone");
    w.core.create_thread(&anyone, T2, ETHER).unwrap();
    w.core.start_thread(&anyone, T2).unwrap();
    let alice = w.alice.clone();
    let c = alice.commitment(w.core.hasher());
    w.core.join(T2, c).unwrap();

    let t2_bundle = prove(&w.core, &alice, Scope::comment(T2, C1), post());
    let mut forged = prove(&w.core, &alice, Scope::comment(T1, C1), post());
    forged.root = t2_bundle.root;
    let err = w.core.post_comment(T1, C1, post(), &forged).unwrap_err();
    assert_eq!(err.code(), "unknown_root");
    assert!(err.is_retryable_with_fresh_proof());
}

#[test]
fn test_same_identity_acts_once_per_thread_scope() {
    let mut w = discussion();
    let anyone = AccountId::new("anyone");
    w.core.create_thread(&anyone, T2, ETHER).unwrap();
    w.core.start_thread(&anyone, T2).unwrap();
    let alice = w.alice.clone();
    let c = alice.commitment(w.core.hasher());
    w.core.join(T2, c).unwrap();

    post_comment(&mut w, &alice, C1).unwrap();
    let bundle = prove(&w.core, &alice, Scope::comment(T2, C1), post());
    w.core.post_comment(T2, C1, post(), &bundle).unwrap();
    assert_eq!(w.core.nullifier_count(), 2);
}

// ── Snapshots and replay ─────────────────────────────────────────────

#[test]
fn test_identical_histories_yield_identical_state() {
    let run = || {
        let mut w = discussion();
        let (alice, bob) = (w.alice.clone(), w.bob.clone());
        post_comment(&mut w, &alice, C1).unwrap();
        like_comment(&mut w, &bob, C1).unwrap();
        let _ = like_comment(&mut w, &bob, C1);
        (w.core.snapshot(), w.core.drain_events())
    };
    assert_eq!(run(), run());
}
