//! # Proof Gateway
//!
//! Turns a proof bundle into an [`Authorization`] or a rejection.
//!
//! ## Checks, in order
//!
//! 1. `ThreadNotFound`: the scope's thread has no group.
//! 2. `UnknownRoot`: the claimed root was never produced by that group.
//! 3. `ScopeMismatch`: the bundle's external nullifier is not the one
//!    derived from the targeted scope.
//! 4. `ProofInvalid`: the verifier rejects the proof for
//!    `(root, nullifier_hash, signal_hash, external_nullifier)`, or cannot
//!    evaluate it.
//! 5. `NullifierReuse`: the nullifier hash is already in the ledger.
//!
//! `authorize` only reads. The nullifier is spent later by passing the
//! returned `Authorization` to `NullifierLedger::consume`, after the
//! caller's own checks pass, so a rejection anywhere leaves the ledger
//! untouched.

use zkt_core::{NullifierHash, Scope, Signal, ThreadsError};
use zkt_crypto::{derive_external_nullifier, signal_hash, FieldHasher};
use zkt_zkp::{MembershipVerifier, ProofBundle, PublicInputs};

use crate::membership::GroupMembershipStore;
use crate::nullifier::NullifierLedger;

/// Proof that a bundle passed every gateway check.
///
/// Not `Clone`: each authorization spends its nullifier once.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "an authorization does nothing until consumed by the nullifier ledger"]
pub struct Authorization {
    scope: Scope,
    nullifier_hash: NullifierHash,
}

impl Authorization {
    pub(crate) fn new(scope: Scope, nullifier_hash: NullifierHash) -> Self {
        Self {
            scope,
            nullifier_hash,
        }
    }

    /// Scope the proof was checked against.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Nullifier hash the authorization will spend.
    pub fn nullifier_hash(&self) -> NullifierHash {
        self.nullifier_hash
    }
}

/// Verifies proof bundles against membership roots and the nullifier set.
#[derive(Debug, Clone)]
pub struct ProofGateway<V, H> {
    verifier: V,
    hasher: H,
}

impl<V: MembershipVerifier, H: FieldHasher> ProofGateway<V, H> {
    pub fn new(verifier: V, hasher: H) -> Self {
        Self { verifier, hasher }
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Run every check for an action on `scope` carrying `signal`.
    pub fn authorize(
        &self,
        groups: &GroupMembershipStore<H>,
        nullifiers: &NullifierLedger,
        scope: &Scope,
        signal: &Signal,
        bundle: &ProofBundle,
    ) -> Result<Authorization, ThreadsError>
    where
        H: Clone,
    {
        let thread_id = scope.thread_id();
        let group = groups
            .group(thread_id)
            .ok_or(ThreadsError::ThreadNotFound { thread_id })?;

        if !group.is_known_root(&bundle.root) {
            return Err(ThreadsError::UnknownRoot {
                thread_id,
                root: bundle.root,
            });
        }

        let expected = derive_external_nullifier(&self.hasher, scope);
        if expected != bundle.external_nullifier {
            return Err(ThreadsError::ScopeMismatch {
                scope: *scope,
                expected,
                supplied: bundle.external_nullifier,
            });
        }

        let inputs = PublicInputs {
            root: bundle.root,
            nullifier_hash: bundle.nullifier_hash,
            signal_hash: signal_hash(&self.hasher, signal),
            external_nullifier: bundle.external_nullifier,
        };
        if !self.verifier.verify(&bundle.proof, &inputs)? {
            return Err(ThreadsError::ProofInvalid {
                reason: "verifier rejected the proof".to_string(),
            });
        }

        if nullifiers.contains(&bundle.nullifier_hash) {
            return Err(ThreadsError::NullifierReuse {
                nullifier_hash: bundle.nullifier_hash,
            });
        }

        Ok(Authorization::new(*scope, bundle.nullifier_hash))
    }
}
