//! # 32-Byte Field Values
//!
//! Every cryptographic value that crosses the protocol boundary is a
//! 32-byte big-endian word: identity commitments, membership roots,
//! nullifier hashes, external nullifiers and signals. The core never
//! interprets them arithmetically; it only compares, stores and forwards
//! them to the capability traits that do.
//!
//! Each value gets its own newtype. They serialize as 64-char lowercase
//! hex strings and parse with or without a `0x` prefix.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error parsing a 32-byte value from hex or from a label.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldParseError {
    /// Input was not exactly 64 hex characters.
    #[error("expected 64 hex chars, got {0}")]
    BadLength(usize),
    /// Input contained a non-hex character.
    #[error("invalid hex at byte {0}")]
    BadHex(usize),
    /// Signal label does not fit in 31 bytes.
    #[error("signal label is {0} bytes; at most 31 allowed")]
    LabelTooLong(usize),
}

fn encode_hex(bytes: &[u8; 32]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn decode_hex(s: &str) -> Result<[u8; 32], FieldParseError> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    if s.len() != 64 {
        return Err(FieldParseError::BadLength(s.len()));
    }
    let mut out = [0u8; 32];
    for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
        if !chunk.iter().all(u8::is_ascii_hexdigit) {
            return Err(FieldParseError::BadHex(i));
        }
        let pair = std::str::from_utf8(chunk).map_err(|_| FieldParseError::BadHex(i))?;
        out[i] = u8::from_str_radix(pair, 16).map_err(|_| FieldParseError::BadHex(i))?;
    }
    Ok(out)
}

macro_rules! field_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// Wrap raw big-endian bytes.
            pub const fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Borrow the raw bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Encode a small integer big-endian into the low 8 bytes.
            pub fn from_u64(value: u64) -> Self {
                let mut bytes = [0u8; 32];
                bytes[24..].copy_from_slice(&value.to_be_bytes());
                Self(bytes)
            }

            /// Lowercase hex, no prefix.
            pub fn to_hex(&self) -> String {
                encode_hex(&self.0)
            }

            /// Parse 64 hex chars, optionally `0x`-prefixed.
            pub fn from_hex(s: &str) -> Result<Self, FieldParseError> {
                decode_hex(s).map(Self)
            }

            /// Whether every byte is zero.
            pub fn is_zero(&self) -> bool {
                self.0.iter().all(|b| *b == 0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "0x{}", self.to_hex())
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), self.to_hex())
            }
        }

        impl std::str::FromStr for $name {
            type Err = FieldParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::from_hex(s)
            }
        }

        impl From<[u8; 32]> for $name {
            fn from(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

field_newtype!(
    /// Public value enrolling one participant in one thread's anonymity set.
    IdentityCommitment
);

field_newtype!(
    /// Root of a thread's membership tree at some point in its history.
    MerkleRoot
);

field_newtype!(
    /// Single-use tag derived from an identity secret and an external nullifier.
    NullifierHash
);

field_newtype!(
    /// Scope tag binding a proof to one comment or reply.
    ExternalNullifier
);

field_newtype!(
    /// Content a participant attaches to an action (`"post"`, `"like"`, ...).
    Signal
);

impl Signal {
    /// Encode a short UTF-8 label left-aligned and zero-padded.
    ///
    /// The last byte is always zero, so labels are limited to 31 bytes.
    pub fn from_label(label: &str) -> Result<Self, FieldParseError> {
        let raw = label.as_bytes();
        if raw.len() > 31 {
            return Err(FieldParseError::LabelTooLong(raw.len()));
        }
        let mut bytes = [0u8; 32];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self(bytes))
    }

    /// Decode a label written by [`Signal::from_label`].
    ///
    /// Returns `None` if the value is not zero-padded UTF-8.
    pub fn label(&self) -> Option<String> {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(32);
        if self.0[end..].iter().any(|b| *b != 0) {
            return None;
        }
        std::str::from_utf8(&self.0[..end]).ok().map(str::to_string)
    }
}
