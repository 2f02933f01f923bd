//! # zkt-protocol: The zkthreads Protocol Core
//!
//! Composes the primitives from the lower crates into the anonymous,
//! Sybil-resistant discussion protocol.
//!
//! ## Components
//!
//! - **Membership** (`membership.rs`): `GroupMembershipStore`, one
//!   append-only commitment list per thread with its incremental tree and
//!   the history of every root the list has produced.
//!
//! - **Nullifiers** (`nullifier.rs`): `NullifierLedger`, the global set of
//!   consumed nullifier hashes.
//!
//! - **Gateway** (`gateway.rs`): `ProofGateway`, the read-only check that
//!   turns a proof bundle into an `Authorization`. Spending the
//!   authorization is the only way a nullifier enters the ledger.
//!
//! - **Discussion** (`discussion.rs`): comments, replies and like counters.
//!
//! - **Treasury** (`treasury.rs`): escrowed creation fees.
//!
//! - **Facade** (`protocol.rs`): `ZkThreads`, the fourteen public
//!   operations, the event journal and the sequence counter.
//!
//! - **Persistence** (`snapshot.rs`): `StateSnapshot`, a serde image of
//!   the persisted state that restores with every root recomputed.
//!
//! ## Atomicity
//!
//! Every operation runs its fallible checks against `&self` state, then
//! applies mutations that cannot fail. A rejected operation changes
//! nothing: no nullifier, no counter, no event, no sequence number.
//!
//! ## Crate Policy
//!
//! - Logs through `tracing`; counts through the `metrics` facade. No
//!   subscriber or exporter is installed here.
//! - No `.unwrap()` outside tests.

pub mod amount;
pub mod config;
pub mod discussion;
pub mod events;
pub mod gateway;
pub mod membership;
pub mod nullifier;
pub mod protocol;
pub mod snapshot;
pub mod treasury;

pub use config::{LifecycleAuthority, ProtocolConfig, DEFAULT_FEE, DEFAULT_TREE_DEPTH};
pub use discussion::{CommentRecord, DiscussionLedger, ReplyRecord};
pub use events::{EventRecord, ThreadEvent};
pub use gateway::{Authorization, ProofGateway};
pub use membership::{Group, GroupMembershipStore};
pub use nullifier::NullifierLedger;
pub use protocol::{ThreadRecord, ZkThreads};
pub use snapshot::{CommentSnapshot, ReplySnapshot, StateSnapshot, ThreadSnapshot, SNAPSHOT_VERSION};
pub use treasury::{Treasury, Withdrawal};
