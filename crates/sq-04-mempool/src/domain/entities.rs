//! Pool entities and node-local configuration.

use super::value_objects::{GasPrice, PriorityKey, SequenceKey};
use serde::{Deserialize, Serialize};
use shared_types::{tx_hash, Address, Hash};
use sq_03_cost_estimator::EstimatedTx;
use std::cmp::Ordering;

/// An admitted transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PooledTx {
    /// SHA-256 of `raw`.
    pub hash: Hash,
    /// Raw transaction bytes, as they will appear in a proposal.
    pub raw: Vec<u8>,
    /// Decoded form and estimated cost.
    pub estimate: EstimatedTx,
    /// Arrival sequence number.
    pub arrival: u64,
    /// Height at which the transaction was admitted.
    pub admitted_at: u64,
}

impl PooledTx {
    /// Wraps an estimated transaction.
    pub fn new(raw: Vec<u8>, estimate: EstimatedTx, arrival: u64, admitted_at: u64) -> Self {
        Self {
            hash: tx_hash(&raw),
            raw,
            estimate,
            arrival,
            admitted_at,
        }
    }

    /// Fee-paying account.
    pub fn signer(&self) -> Address {
        self.estimate.inner().signer
    }

    /// Account sequence.
    pub fn sequence(&self) -> u64 {
        self.estimate.inner().sequence
    }

    /// Pool key.
    pub fn key(&self) -> SequenceKey {
        (self.signer(), self.sequence())
    }

    /// Estimated gas.
    pub fn gas(&self) -> u64 {
        self.estimate.cost.gas
    }

    /// Raw byte length.
    pub fn bytes(&self) -> u64 {
        self.estimate.cost.bytes
    }

    /// Offered gas price.
    pub fn price(&self) -> GasPrice {
        let inner = self.estimate.inner();
        GasPrice::new(inner.fee, inner.gas_limit)
    }

    /// Priority index entry.
    pub fn priority(&self) -> PriorityKey {
        PriorityKey::new(self.price(), self.arrival, self.hash)
    }

    /// True once the entry is `ttl` or more blocks old at `height`.
    pub fn is_expired(&self, height: u64, ttl: u64) -> bool {
        height.saturating_sub(self.admitted_at) >= ttl
    }
}

/// Total order used to select candidates: signer, then sequence, then arrival.
///
/// The order depends only on the transactions themselves, so every proposer
/// holding the same candidate set lays them out identically.
pub fn candidate_order(a: &PooledTx, b: &PooledTx) -> Ordering {
    a.signer()
        .cmp(&b.signer())
        .then_with(|| a.sequence().cmp(&b.sequence()))
        .then_with(|| a.arrival.cmp(&b.arrival))
        .then_with(|| a.hash.cmp(&b.hash))
}

/// Node-local pool settings. Not consensus critical.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MempoolConfig {
    /// Maximum transactions in the pool.
    pub max_transactions: usize,
    /// Maximum transactions per account.
    pub max_per_account: usize,
    /// Blocks an entry may wait before it expires.
    pub ttl_blocks: u64,
}

impl Default for MempoolConfig {
    fn default() -> Self {
        Self {
            max_transactions: 5000,
            max_per_account: 64,
            ttl_blocks: 5,
        }
    }
}

impl MempoolConfig {
    /// Creates a minimal config for testing.
    pub fn for_testing() -> Self {
        Self {
            max_transactions: 8,
            max_per_account: 4,
            ttl_blocks: 2,
        }
    }
}
