//! # Mock Proof System
//!
//! A deterministic, transparent proof system for development and testing.
//! A "proof" is `SHA256(domain || public_inputs)`. Verification recomputes
//! it and checks equality.
//!
//! ## What It Models
//!
//! `MockIdentity` derives values the way a Semaphore identity does:
//!
//! ```text
//! secret          = hash_pair(nullifier, trapdoor)
//! commitment      = hash_pair(secret, 0)
//! nullifier_hash  = hash_pair(external_nullifier, nullifier)
//! ```
//!
//! The nullifier hash depends only on the identity and the scope, never on
//! the signal. `MockProofSystem::prove` refuses identities that are not in
//! the supplied member list, so a passing mock proof still implies
//! membership at the time it was built.
//!
//! ## Security Warning
//!
//! **NOT PRIVATE.** Anyone who knows the public inputs can recompute the
//! proof. This exists for tests, demos and local replay only.

use sha2::{Digest, Sha256};

use zkt_core::{ExternalNullifier, IdentityCommitment, NullifierHash, Scope, Signal};
use zkt_crypto::{build_path, derive_external_nullifier, signal_hash, FieldHasher};

use crate::traits::{MembershipVerifier, ProofError, VerifyError};
use crate::types::{ProofBundle, PublicInputs};

const MOCK_PROOF_DOMAIN: &[u8] = b"zkthreads.mock-proof.v1";

/// Length of a mock proof in bytes.
pub const MOCK_PROOF_LEN: usize = 32;

/// Private identity material of one participant.
#[derive(Clone, PartialEq, Eq)]
pub struct MockIdentity {
    trapdoor: [u8; 32],
    nullifier: [u8; 32],
}

impl std::fmt::Debug for MockIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MockIdentity(..)")
    }
}

impl MockIdentity {
    /// Build an identity from explicit secrets.
    pub fn new(trapdoor: [u8; 32], nullifier: [u8; 32]) -> Self {
        Self {
            trapdoor,
            nullifier,
        }
    }

    /// Derive an identity deterministically from a seed string.
    pub fn from_seed<H: FieldHasher + ?Sized>(hasher: &H, seed: &str) -> Self {
        Self {
            trapdoor: hasher.hash_bytes(format!("trapdoor:{seed}").as_bytes()),
            nullifier: hasher.hash_bytes(format!("nullifier:{seed}").as_bytes()),
        }
    }

    /// Public commitment enrolled in a thread.
    pub fn commitment<H: FieldHasher + ?Sized>(&self, hasher: &H) -> IdentityCommitment {
        let secret = hasher.hash_pair(&self.nullifier, &self.trapdoor);
        IdentityCommitment(hasher.hash_pair(&secret, &[0u8; 32]))
    }

    /// Nullifier hash for one scope. Independent of any signal.
    pub fn nullifier_hash<H: FieldHasher + ?Sized>(
        &self,
        hasher: &H,
        external_nullifier: &ExternalNullifier,
    ) -> NullifierHash {
        NullifierHash(hasher.hash_pair(external_nullifier.as_bytes(), &self.nullifier))
    }
}

/// Transparent SHA-256 proof system.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockProofSystem;

impl MockProofSystem {
    /// Proof bytes for a given set of public inputs.
    pub fn proof_for(&self, inputs: &PublicInputs) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(MOCK_PROOF_DOMAIN);
        hasher.update(inputs.to_bytes());
        hasher.finalize().to_vec()
    }

    /// Build a proof bundle for `identity` acting on `scope` with `signal`.
    ///
    /// `members` is the thread's ordered commitment list as returned by
    /// `list_commitments`; the claimed root is the root of that list.
    pub fn prove<H: FieldHasher + ?Sized>(
        &self,
        hasher: &H,
        depth: u32,
        identity: &MockIdentity,
        members: &[IdentityCommitment],
        scope: &Scope,
        signal: &Signal,
    ) -> Result<ProofBundle, ProofError> {
        let commitment = identity.commitment(hasher);
        let leaf_index = members
            .iter()
            .position(|m| *m == commitment)
            .ok_or(ProofError::NotAMember)?;
        let path = build_path(hasher, depth, members, leaf_index)?;

        let external_nullifier = derive_external_nullifier(hasher, scope);
        let nullifier_hash = identity.nullifier_hash(hasher, &external_nullifier);
        let inputs = PublicInputs {
            root: path.root,
            nullifier_hash,
            signal_hash: signal_hash(hasher, signal),
            external_nullifier,
        };

        Ok(ProofBundle {
            root: path.root,
            nullifier_hash,
            external_nullifier,
            proof: self.proof_for(&inputs),
        })
    }
}

impl MembershipVerifier for MockProofSystem {
    fn verify(&self, proof: &[u8], inputs: &PublicInputs) -> Result<bool, VerifyError> {
        if proof.len() != MOCK_PROOF_LEN {
            return Err(VerifyError::MalformedProof(format!(
                "expected {MOCK_PROOF_LEN} bytes, got {}",
                proof.len()
            )));
        }
        Ok(proof == self.proof_for(inputs).as_slice())
    }
}

/// Verifier with a fixed verdict, for exercising accept and reject paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticVerifier {
    /// Verdict returned for every proof.
    pub accept: bool,
}

impl StaticVerifier {
    /// Accepts everything.
    pub fn accepting() -> Self {
        Self { accept: true }
    }

    /// Rejects everything.
    pub fn rejecting() -> Self {
        Self { accept: false }
    }
}

impl MembershipVerifier for StaticVerifier {
    fn verify(&self, _proof: &[u8], _inputs: &PublicInputs) -> Result<bool, VerifyError> {
        Ok(self.accept)
    }
}
