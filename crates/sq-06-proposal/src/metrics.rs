//! Metrics collection for the proposal subsystem

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for admission and proposals
#[derive(Debug, Default)]
pub struct Metrics {
    /// Transactions admitted (including replacements)
    pub txs_admitted: AtomicU64,

    /// Transactions rejected at CheckTx
    pub txs_rejected: AtomicU64,

    /// Proposals prepared
    pub proposals_prepared: AtomicU64,

    /// Prepared proposals that fell back to the empty square
    pub empty_fallbacks: AtomicU64,

    /// Proposals accepted by validation
    pub proposals_accepted: AtomicU64,

    /// Proposals rejected by validation
    pub proposals_rejected: AtomicU64,

    /// Deadline violations during prepare or process
    pub timeouts: AtomicU64,

    /// Dimension of the last prepared square
    pub last_square_size: AtomicU64,

    /// Blocks finalized
    pub blocks_finalized: AtomicU64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a CheckTx outcome
    pub fn record_check_tx(&self, admitted: bool) {
        if admitted {
            self.txs_admitted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.txs_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a prepared proposal
    pub fn record_prepared(&self, square_size: usize, fallback: bool) {
        self.proposals_prepared.fetch_add(1, Ordering::Relaxed);
        self.last_square_size
            .store(square_size as u64, Ordering::Relaxed);
        if fallback {
            self.empty_fallbacks.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a validation verdict
    pub fn record_verdict(&self, accepted: bool) {
        if accepted {
            self.proposals_accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.proposals_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a deadline violation
    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a finalized block
    pub fn record_finalized(&self) {
        self.blocks_finalized.fetch_add(1, Ordering::Relaxed);
    }

    /// Get proposals prepared
    pub fn get_proposals_prepared(&self) -> u64 {
        self.proposals_prepared.load(Ordering::Relaxed)
    }

    /// Get timeouts
    pub fn get_timeouts(&self) -> u64 {
        self.timeouts.load(Ordering::Relaxed)
    }

    /// Get last square size
    pub fn get_last_square_size(&self) -> u64 {
        self.last_square_size.load(Ordering::Relaxed)
    }

    /// Get the share of validated proposals that were accepted
    pub fn get_acceptance_rate(&self) -> f64 {
        let accepted = self.proposals_accepted.load(Ordering::Relaxed);
        let total = accepted + self.proposals_rejected.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        accepted as f64 / total as f64
    }
}
