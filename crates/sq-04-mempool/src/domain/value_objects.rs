//! Value objects for the pending pool.
//!
//! Immutable types used for ordering and indexing admitted transactions.

use shared_types::{Address, Hash};
use std::cmp::Ordering;

/// The pool key: at most one transaction per account sequence.
pub type SequenceKey = (Address, u64);

/// Offered price per unit of gas, kept as the exact ratio `fee / gas_limit`.
///
/// Compared by cross-multiplication in `u128` so no precision is lost.
#[derive(Clone, Copy, Debug)]
pub struct GasPrice {
    /// Total fee offered.
    pub fee: u64,
    /// Gas limit the fee is spread over.
    pub gas_limit: u64,
}

impl GasPrice {
    /// Creates a gas price.
    pub fn new(fee: u64, gas_limit: u64) -> Self {
        Self { fee, gas_limit }
    }
}

impl Ord for GasPrice {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = u128::from(self.fee) * u128::from(other.gas_limit);
        let rhs = u128::from(other.fee) * u128::from(self.gas_limit);
        lhs.cmp(&rhs)
    }
}

impl PartialOrd for GasPrice {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for GasPrice {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GasPrice {}

/// A transaction reference in the priority index.
///
/// Implements `Ord` such that the highest priority entry sorts first:
/// higher gas price, then earlier arrival, then hash.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PriorityKey {
    /// Offered gas price.
    pub price: GasPrice,
    /// Arrival sequence number (earlier = higher priority for ties).
    pub arrival: u64,
    /// Transaction hash.
    pub hash: Hash,
}

impl PriorityKey {
    /// Creates a priority key.
    pub fn new(price: GasPrice, arrival: u64, hash: Hash) -> Self {
        Self {
            price,
            arrival,
            hash,
        }
    }

    /// True if `self` outranks `other` on price alone or on equal price by arrival.
    pub fn outranks(&self, other: &Self) -> bool {
        self.price > other.price || (self.price == other.price && self.arrival < other.arrival)
    }
}

impl Ord for PriorityKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .price
            .cmp(&self.price)
            .then_with(|| self.arrival.cmp(&other.arrival))
            .then_with(|| self.hash.cmp(&other.hash))
    }
}

impl PartialOrd for PriorityKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pool occupancy snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStatus {
    /// Transactions held.
    pub pending_count: usize,
    /// Distinct signing accounts.
    pub account_count: usize,
    /// Raw bytes held.
    pub total_bytes: u64,
    /// Sum of estimated gas.
    pub total_gas: u64,
    /// Next arrival sequence number.
    pub next_arrival: u64,
}
