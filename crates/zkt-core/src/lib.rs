//! # zkt-core: Foundational Types for zkthreads
//!
//! The leaf of the workspace DAG. Every other `zkt-*` crate depends on it;
//! it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `ThreadId`, `CommentId`,
//!    `ReplyId` and `AccountId` are distinct types. A reply id cannot be
//!    passed where a comment id is expected.
//!
//! 2. **Newtype wrappers for field values.** Identity commitments, Merkle
//!    roots, nullifier hashes, external nullifiers and signals are all
//!    32-byte values, but each gets its own type so a nullifier hash can
//!    never be confused with a root.
//!
//! 3. **One error enum.** `ThreadsError` carries every failure kind the
//!    protocol can surface, each with a stable machine code.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `zkt-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod field;
pub mod identity;
pub mod scope;

pub use error::ThreadsError;
pub use field::{
    ExternalNullifier, FieldParseError, IdentityCommitment, MerkleRoot, NullifierHash, Signal,
};
pub use identity::{AccountId, Amount, CommentId, ReplyId, ThreadId};
pub use scope::Scope;
