//! # zkt-crypto: Hashing and Membership Trees
//!
//! The protocol treats hashing as an opaque capability. This crate defines
//! that capability and ships reference implementations:
//!
//! - **Hasher** (`hasher.rs`): the `FieldHasher` trait, plus
//!   `Sha256FieldHasher`, a domain-separated SHA-256 hasher truncated to
//!   248 bits. Also derives external nullifiers and signal bindings.
//!
//! - **Merkle** (`merkle.rs`): the `MembershipTree` trait and
//!   `IncrementalMerkleTree`, a fixed-depth append-only binary tree that
//!   only keeps the left frontier. Off-device provers rebuild inclusion
//!   paths with `build_path()` from the ordered commitment list.
//!
//! ## Crate Policy
//!
//! - Depends only on `zkt-core` internally.
//! - SHA-256 is a stand-in; a deployment with a SNARK circuit plugs in the
//!   circuit's hash by implementing `FieldHasher`.

pub mod hasher;
pub mod merkle;

pub use hasher::{derive_external_nullifier, signal_hash, FieldHasher, Sha256FieldHasher};
pub use merkle::{build_path, verify_path, IncrementalMerkleTree, MembershipTree, MerklePath, TreeError};
