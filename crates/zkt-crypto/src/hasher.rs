//! # Field Hasher
//!
//! Two-to-one compression for tree nodes and a byte-string hash for
//! labels and signals. Implementations must be pure and deterministic.
//!
//! ## Reference Implementation
//!
//! `Sha256FieldHasher` uses domain-separated SHA-256:
//! - Bytes: `SHA256(0x00 || data)`.
//! - Node:  `SHA256(0x01 || left || right)`.
//!
//! The first output byte is cleared so every value fits in a 254-bit
//! scalar field, the same truncation Semaphore-style circuits apply to
//! external nullifiers and signal hashes.

use sha2::{Digest, Sha256};

use zkt_core::{ExternalNullifier, Scope, Signal};

const BYTES_DOMAIN: u8 = 0x00;
const NODE_DOMAIN: u8 = 0x01;

/// Opaque hashing capability used by the membership tree and scope derivation.
pub trait FieldHasher: Send + Sync {
    /// Compress two child nodes into their parent.
    fn hash_pair(&self, left: &[u8; 32], right: &[u8; 32]) -> [u8; 32];

    /// Hash an arbitrary byte string into a field value.
    fn hash_bytes(&self, data: &[u8]) -> [u8; 32];
}

/// Domain-separated SHA-256, truncated to 248 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256FieldHasher;

fn sha256_truncated(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out[0] = 0;
    out
}

impl FieldHasher for Sha256FieldHasher {
    fn hash_pair(&self, left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
        sha256_truncated(&[&[NODE_DOMAIN][..], &left[..], &right[..]])
    }

    fn hash_bytes(&self, data: &[u8]) -> [u8; 32] {
        sha256_truncated(&[&[BYTES_DOMAIN][..], data])
    }
}

/// Derive the external nullifier a scope encodes.
///
/// The same scope always yields the same value, and post and like on one
/// entity share it.
pub fn derive_external_nullifier<H: FieldHasher + ?Sized>(hasher: &H, scope: &Scope) -> ExternalNullifier {
    ExternalNullifier(hasher.hash_bytes(scope.label().as_bytes()))
}

/// Hash binding a signal into a proof's public inputs.
pub fn signal_hash<H: FieldHasher + ?Sized>(hasher: &H, signal: &Signal) -> [u8; 32] {
    hasher.hash_bytes(signal.as_bytes())
}
