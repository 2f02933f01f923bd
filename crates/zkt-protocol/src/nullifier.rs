//! Global ledger of consumed nullifier hashes.
//!
//! A nullifier moves from unused to used exactly once and never back. The
//! only way in is [`NullifierLedger::consume`], which takes an
//! [`Authorization`] produced by a successful gateway check.

use std::collections::BTreeSet;

use zkt_core::NullifierHash;

use crate::gateway::Authorization;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NullifierLedger {
    used: BTreeSet<NullifierHash>,
}

impl NullifierLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, nullifier_hash: &NullifierHash) -> bool {
        self.used.contains(nullifier_hash)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Spend an authorization. Returns the consumed nullifier hash.
    pub fn consume(&mut self, authorization: Authorization) -> NullifierHash {
        let nullifier_hash = authorization.nullifier_hash();
        self.used.insert(nullifier_hash);
        metrics::counter!("zkthreads_nullifiers_consumed_total").increment(1);
        nullifier_hash
    }

    /// Consumed hashes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &NullifierHash> {
        self.used.iter()
    }

    /// Rebuild from persisted hashes. Returns `None` on a duplicate.
    pub(crate) fn from_persisted(hashes: &[NullifierHash]) -> Option<Self> {
        let mut used = BTreeSet::new();
        for h in hashes {
            if !used.insert(*h) {
                return None;
            }
        }
        Some(Self { used })
    }
}
