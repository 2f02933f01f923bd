//! # zkt-zkp: Membership Proof Verification
//!
//! The protocol never verifies a SNARK itself. It hands the proof bytes and
//! the public inputs to a `MembershipVerifier` and acts on the answer.
//!
//! ## Architecture
//!
//! - **Traits** (`traits.rs`): `MembershipVerifier`, the only seam between
//!   the protocol and a proving system.
//!
//! - **Types** (`types.rs`): `PublicInputs` and its fixed 128-byte
//!   encoding, and `ProofBundle`, what a participant submits with an action.
//!
//! - **Mock** (`mock.rs`, feature `mock`): `MockProofSystem`, a transparent
//!   SHA-256 "proof" that binds the public inputs, and `MockIdentity`, which
//!   derives commitments and nullifier hashes the way a Semaphore identity
//!   does. `StaticVerifier` answers a fixed verdict for rejection tests.
//!
//! ## Crate Policy
//!
//! - Depends on `zkt-core` and `zkt-crypto` internally.
//! - Verification is pure: same proof and inputs, same answer.

#[cfg(feature = "mock")]
pub mod mock;
pub mod traits;
pub mod types;

#[cfg(feature = "mock")]
pub use mock::{MockIdentity, MockProofSystem, StaticVerifier};
pub use traits::{MembershipVerifier, ProofError, VerifyError};
pub use types::{ProofBundle, PublicInputs};
