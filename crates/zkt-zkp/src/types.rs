//! # Proof Types
//!
//! `PublicInputs` is what a verifier sees. `ProofBundle` is what a
//! participant submits: the claimed root, the nullifier hash, the external
//! nullifier and the opaque proof bytes. The signal travels separately as
//! the action's payload and is bound into the inputs by its hash.

use serde::{Deserialize, Serialize};

use zkt_core::{ExternalNullifier, MerkleRoot, NullifierHash};

/// Length of [`PublicInputs::to_bytes`].
pub const PUBLIC_INPUTS_LEN: usize = 128;

/// Public inputs of a membership proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicInputs {
    /// Membership root the proof was built against.
    pub root: MerkleRoot,
    /// Nullifier hash the proof commits to.
    pub nullifier_hash: NullifierHash,
    /// Hash of the action's signal.
    pub signal_hash: [u8; 32],
    /// Scope tag.
    pub external_nullifier: ExternalNullifier,
}

impl PublicInputs {
    /// Fixed encoding: `root || nullifier_hash || signal_hash || external_nullifier`.
    pub fn to_bytes(&self) -> [u8; PUBLIC_INPUTS_LEN] {
        let mut out = [0u8; PUBLIC_INPUTS_LEN];
        out[0..32].copy_from_slice(self.root.as_bytes());
        out[32..64].copy_from_slice(self.nullifier_hash.as_bytes());
        out[64..96].copy_from_slice(&self.signal_hash);
        out[96..128].copy_from_slice(self.external_nullifier.as_bytes());
        out
    }
}

/// Proof material attached to an anonymous action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofBundle {
    /// Root the proof claims membership against.
    pub root: MerkleRoot,
    /// Single-use tag for this identity in this scope.
    pub nullifier_hash: NullifierHash,
    /// Scope tag the proof was built for.
    pub external_nullifier: ExternalNullifier,
    /// Opaque proof bytes, hex in serialized form.
    #[serde(with = "hex_bytes")]
    pub proof: Vec<u8>,
}

/// Serde helper for hex-encoding `Vec<u8>` fields.
mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        serializer.serialize_str(&hex)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        if s.len() % 2 != 0 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(serde::de::Error::custom("proof must be an even-length hex string"));
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(serde::de::Error::custom))
            .collect()
    }
}
