//! # Pending Pool
//!
//! Admitted transactions awaiting inclusion.
//!
//! ## Data Structures
//!
//! - `by_hash`: O(1) lookup by transaction hash
//! - `by_key`: O(log n) (account, sequence) index, also the candidate order
//! - `by_priority`: O(log n) priority queue (BTreeSet), lowest at the back
//! - `per_account`: pending count per signer
//!
//! ## Invariants
//!
//! - One entry per (account, sequence); a strictly higher priority newcomer
//!   replaces the incumbent, otherwise it is refused
//! - Every entry appears in all three indices
//! - Arrival numbers are assigned here, under the caller's write lock

use super::entities::{candidate_order, MempoolConfig, PooledTx};
use super::errors::AdmissionError;
use super::value_objects::{PoolStatus, PriorityKey, SequenceKey};
use shared_types::{Address, Hash};
use sq_03_cost_estimator::EstimatedTx;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// Result of a successful insert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdmitOutcome {
    /// New entry.
    Accepted { hash: Hash },
    /// Identical transaction already pooled; nothing changed.
    AlreadyKnown { hash: Hash },
    /// Replaced a lower-priority entry at the same (account, sequence).
    Replaced { hash: Hash, previous: Hash },
}

impl AdmitOutcome {
    /// Hash of the submitted transaction.
    pub fn hash(&self) -> &Hash {
        match self {
            Self::Accepted { hash } | Self::AlreadyKnown { hash } | Self::Replaced { hash, .. } => {
                hash
            }
        }
    }
}

/// The pending pool.
#[derive(Debug)]
pub struct PendingPool {
    config: MempoolConfig,
    by_hash: HashMap<Hash, Arc<PooledTx>>,
    by_key: BTreeMap<SequenceKey, Hash>,
    by_priority: BTreeSet<PriorityKey>,
    per_account: HashMap<Address, usize>,
    next_arrival: u64,
    total_bytes: u64,
    total_gas: u64,
}

impl PendingPool {
    /// Creates an empty pool.
    pub fn new(config: MempoolConfig) -> Self {
        Self {
            config,
            by_hash: HashMap::new(),
            by_key: BTreeMap::new(),
            by_priority: BTreeSet::new(),
            per_account: HashMap::new(),
            next_arrival: 0,
            total_bytes: 0,
            total_gas: 0,
        }
    }

    /// Creates a pool with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MempoolConfig::default())
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &MempoolConfig {
        &self.config
    }

    /// Number of pooled transactions.
    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    /// True if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    /// Checks if a transaction is pooled.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.by_hash.contains_key(hash)
    }

    /// Gets a transaction by hash.
    pub fn get(&self, hash: &Hash) -> Option<&Arc<PooledTx>> {
        self.by_hash.get(hash)
    }

    /// Gets the transaction at an (account, sequence) key.
    pub fn get_by_key(&self, signer: &Address, sequence: u64) -> Option<&Arc<PooledTx>> {
        self.by_key
            .get(&(*signer, sequence))
            .and_then(|h| self.by_hash.get(h))
    }

    /// Pending transactions of one account.
    pub fn account_count(&self, signer: &Address) -> usize {
        self.per_account.get(signer).copied().unwrap_or(0)
    }

    /// Occupancy snapshot.
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            pending_count: self.by_hash.len(),
            account_count: self.per_account.len(),
            total_bytes: self.total_bytes,
            total_gas: self.total_gas,
            next_arrival: self.next_arrival,
        }
    }

    /// Inserts an estimated transaction as one atomic upsert.
    ///
    /// # Errors
    /// - `DuplicateSequence` if the incumbent at the same key is not outranked
    /// - `AccountLimitReached` if the account is full and this is a new key
    /// - `PoolFull` if at capacity and the lowest entry is not outranked
    pub fn insert(
        &mut self,
        raw: Vec<u8>,
        estimate: EstimatedTx,
        height: u64,
    ) -> Result<AdmitOutcome, AdmissionError> {
        let entry = PooledTx::new(raw, estimate, self.next_arrival, height);
        let hash = entry.hash;

        if self.by_hash.contains_key(&hash) {
            return Ok(AdmitOutcome::AlreadyKnown { hash });
        }

        let key = entry.key();
        let priority = entry.priority();

        if let Some(existing_hash) = self.by_key.get(&key).copied() {
            let existing = self
                .by_hash
                .get(&existing_hash)
                .map(|tx| tx.priority())
                .ok_or(AdmissionError::DuplicateSequence {
                    signer: key.0,
                    sequence: key.1,
                })?;
            if !priority.outranks(&existing) {
                return Err(AdmissionError::DuplicateSequence {
                    signer: key.0,
                    sequence: key.1,
                });
            }
            self.remove(&existing_hash);
            self.add_internal(entry);
            return Ok(AdmitOutcome::Replaced {
                hash,
                previous: existing_hash,
            });
        }

        if self.account_count(&key.0) >= self.config.max_per_account {
            return Err(AdmissionError::AccountLimitReached {
                signer: key.0,
                limit: self.config.max_per_account,
            });
        }

        if self.by_hash.len() >= self.config.max_transactions && !self.try_evict_for(&priority) {
            return Err(AdmissionError::PoolFull {
                capacity: self.config.max_transactions,
            });
        }

        self.add_internal(entry);
        Ok(AdmitOutcome::Accepted { hash })
    }

    /// Evicts the lowest priority entry if `newcomer` strictly outranks it.
    fn try_evict_for(&mut self, newcomer: &PriorityKey) -> bool {
        let Some(lowest) = self.by_priority.iter().next_back().cloned() else {
            return false;
        };
        if !newcomer.outranks(&lowest) {
            return false;
        }
        self.remove(&lowest.hash);
        true
    }

    fn add_internal(&mut self, entry: PooledTx) {
        self.next_arrival += 1;
        self.total_bytes = self.total_bytes.saturating_add(entry.bytes());
        self.total_gas = self.total_gas.saturating_add(entry.gas());
        self.by_priority.insert(entry.priority());
        self.by_key.insert(entry.key(), entry.hash);
        *self.per_account.entry(entry.signer()).or_default() += 1;
        self.by_hash.insert(entry.hash, Arc::new(entry));
    }

    /// Removes a transaction, returning it if present.
    pub fn remove(&mut self, hash: &Hash) -> Option<Arc<PooledTx>> {
        let entry = self.by_hash.remove(hash)?;

        self.by_priority.remove(&entry.priority());
        self.by_key.remove(&entry.key());
        let signer = entry.signer();
        if let Some(count) = self.per_account.get_mut(&signer) {
            *count -= 1;
            if *count == 0 {
                self.per_account.remove(&signer);
            }
        }
        self.total_bytes = self.total_bytes.saturating_sub(entry.bytes());
        self.total_gas = self.total_gas.saturating_sub(entry.gas());

        Some(entry)
    }

    /// Removes transactions included in a finalized block.
    ///
    /// Returns the hashes actually removed.
    pub fn remove_committed(&mut self, hashes: &[Hash]) -> Vec<Hash> {
        hashes
            .iter()
            .filter_map(|h| self.remove(h).map(|tx| tx.hash))
            .collect()
    }

    /// Drops entries that have waited `ttl_blocks` or more at `height`.
    pub fn evict_expired(&mut self, height: u64) -> Vec<Hash> {
        let ttl = self.config.ttl_blocks;
        let expired: Vec<Hash> = self
            .by_hash
            .values()
            .filter(|tx| tx.is_expired(height, ttl))
            .map(|tx| tx.hash)
            .collect();
        for hash in &expired {
            self.remove(hash);
        }
        expired
    }

    /// Snapshot of all entries in candidate order (signer, sequence, arrival).
    pub fn candidates(&self) -> Vec<Arc<PooledTx>> {
        let mut out: Vec<Arc<PooledTx>> = self
            .by_key
            .values()
            .filter_map(|h| self.by_hash.get(h).cloned())
            .collect();
        out.sort_by(|a, b| candidate_order(a, b));
        out
    }

    /// Entries from highest to lowest priority.
    pub fn by_priority(&self) -> Vec<Arc<PooledTx>> {
        self.by_priority
            .iter()
            .filter_map(|p| self.by_hash.get(&p.hash).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Message, PlainTransaction, ProtocolParams};
    use sq_03_cost_estimator::CostEstimator;

    fn send(signer: u8, sequence: u64, fee: u64) -> (Vec<u8>, EstimatedTx) {
        let raw = PlainTransaction {
            signer: [signer; 20],
            sequence,
            gas_limit: 100_000,
            fee,
            memo: String::new(),
            message: Message::Send {
                to: [0xEE; 20],
                amount: 1,
            },
        }
        .encode()
        .unwrap();
        let est = CostEstimator::new(ProtocolParams::default())
            .estimate(&raw)
            .unwrap();
        (raw, est)
    }

    fn insert(
        pool: &mut PendingPool,
        signer: u8,
        seq: u64,
        fee: u64,
    ) -> Result<AdmitOutcome, AdmissionError> {
        let (raw, est) = send(signer, seq, fee);
        pool.insert(raw, est, 1)
    }

    #[test]
    fn test_insert_and_idempotent_resubmit() {
        let mut pool = PendingPool::with_defaults();
        let first = insert(&mut pool, 1, 0, 100_000).unwrap();
        assert!(matches!(first, AdmitOutcome::Accepted { .. }));

        let again = insert(&mut pool, 1, 0, 100_000).unwrap();
        assert_eq!(again, AdmitOutcome::AlreadyKnown { hash: *first.hash() });
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.status().next_arrival, 1);
    }

    #[test]
    fn test_higher_fee_replaces_same_sequence() {
        let mut pool = PendingPool::with_defaults();
        let first = insert(&mut pool, 1, 0, 100_000).unwrap();
        let second = insert(&mut pool, 1, 0, 200_000).unwrap();

        assert_eq!(
            second,
            AdmitOutcome::Replaced {
                hash: *second.hash(),
                previous: *first.hash()
            }
        );
        assert_eq!(pool.len(), 1);
        assert!(!pool.contains(first.hash()));
        let kept = pool.get_by_key(&[1; 20], 0).unwrap();
        assert_eq!(kept.estimate.inner().fee, 200_000);
    }

    #[test]
    fn test_equal_or_lower_fee_is_duplicate_sequence() {
        let mut pool = PendingPool::with_defaults();
        insert(&mut pool, 1, 0, 200_000).unwrap();
        assert_eq!(
            insert(&mut pool, 1, 0, 150_000),
            Err(AdmissionError::DuplicateSequence {
                signer: [1; 20],
                sequence: 0
            })
        );
    }

    #[test]
    fn test_account_limit() {
        let mut pool = PendingPool::new(MempoolConfig::for_testing());
        for seq in 0..4 {
            insert(&mut pool, 1, seq, 100_000).unwrap();
        }
        assert!(matches!(
            insert(&mut pool, 1, 4, 100_000),
            Err(AdmissionError::AccountLimitReached { limit: 4, .. })
        ));
        // Replacement at an existing key is still allowed.
        assert!(matches!(
            insert(&mut pool, 1, 2, 900_000),
            Ok(AdmitOutcome::Replaced { .. })
        ));
    }

    #[test]
    fn test_capacity_eviction_requires_higher_priority() {
        let mut pool = PendingPool::new(MempoolConfig::for_testing());
        for signer in 0..8u8 {
            insert(&mut pool, signer, 0, 100_000 + u64::from(signer)).unwrap();
        }
        assert_eq!(
            insert(&mut pool, 20, 0, 100_000),
            Err(AdmissionError::PoolFull { capacity: 8 })
        );

        insert(&mut pool, 21, 0, 500_000).unwrap();
        assert_eq!(pool.len(), 8);
        assert!(pool.get_by_key(&[0; 20], 0).is_none());
    }

    #[test]
    fn test_candidates_in_signer_sequence_order() {
        let mut pool = PendingPool::with_defaults();
        insert(&mut pool, 2, 1, 100_000).unwrap();
        insert(&mut pool, 1, 0, 100_000).unwrap();
        insert(&mut pool, 2, 0, 900_000).unwrap();

        let keys: Vec<_> = pool.candidates().iter().map(|tx| tx.key()).collect();
        assert_eq!(keys, vec![([1; 20], 0), ([2; 20], 0), ([2; 20], 1)]);

        let top = pool.by_priority();
        assert_eq!(top[0].key(), ([2; 20], 0));
    }

    #[test]
    fn test_expiry_and_commit_removal() {
        let mut pool = PendingPool::new(MempoolConfig::for_testing());
        let (raw, est) = send(1, 0, 100_000);
        let old = pool.insert(raw, est, 1).unwrap();
        let (raw, est) = send(2, 0, 100_000);
        let fresh = pool.insert(raw, est, 3).unwrap();

        assert!(pool.evict_expired(2).is_empty());
        assert_eq!(pool.evict_expired(3), vec![*old.hash()]);

        assert_eq!(
            pool.remove_committed(&[*fresh.hash(), [9; 32]]),
            vec![*fresh.hash()]
        );
        assert!(pool.is_empty());
        assert_eq!(
            pool.status(),
            PoolStatus {
                next_arrival: 2,
                ..PoolStatus::default()
            }
        );
    }
}
