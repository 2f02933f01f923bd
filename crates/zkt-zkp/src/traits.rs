//! # Membership Verifier Trait
//!
//! The consumed collaborator interface: given proof bytes and public inputs,
//! accept or reject. Implementations must be pure and deterministic.
//!
//! `Ok(false)` means a well-formed proof that does not verify. `Err` means
//! the verifier could not evaluate the proof at all (wrong length, bad
//! encoding). The protocol treats both as a rejected proof.

use thiserror::Error;

use zkt_core::ThreadsError;
use zkt_crypto::TreeError;

use crate::types::PublicInputs;

/// Error during proof verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// Proof bytes cannot be decoded.
    #[error("malformed proof: {0}")]
    MalformedProof(String),
    /// Public inputs are outside the verifier's accepted domain.
    #[error("invalid public inputs: {0}")]
    InvalidInputs(String),
}

impl From<VerifyError> for ThreadsError {
    fn from(err: VerifyError) -> Self {
        ThreadsError::ProofInvalid {
            reason: err.to_string(),
        }
    }
}

/// Error during (mock) proof generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProofError {
    /// The identity's commitment is not in the supplied member list.
    #[error("identity is not a member of the group")]
    NotAMember,
    /// The member list could not be arranged into a tree.
    #[error("membership tree error: {0}")]
    Tree(#[from] TreeError),
}

/// Abstract interface for a membership proof verifier.
pub trait MembershipVerifier: Send + Sync {
    /// Verify `proof` against `inputs`.
    fn verify(&self, proof: &[u8], inputs: &PublicInputs) -> Result<bool, VerifyError>;
}

impl<V: MembershipVerifier + ?Sized> MembershipVerifier for &V {
    fn verify(&self, proof: &[u8], inputs: &PublicInputs) -> Result<bool, VerifyError> {
        (**self).verify(proof, inputs)
    }
}

impl<V: MembershipVerifier + ?Sized> MembershipVerifier for Box<V> {
    fn verify(&self, proof: &[u8], inputs: &PublicInputs) -> Result<bool, VerifyError> {
        (**self).verify(proof, inputs)
    }
}
