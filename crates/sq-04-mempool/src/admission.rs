//! The admission controller: CheckTx policy in front of the pending pool.

use crate::domain::{
    AdmissionError, AdmitOutcome, MempoolConfig, PendingPool, PoolStatus, PooledTx,
};
use parking_lot::RwLock;
use shared_types::{tx_hash, Hash, ProtocolParams};
use sq_03_cost_estimator::{CostEstimator, EstimatedTx};
use std::sync::Arc;
use tracing::{debug, info};

/// Handle to the pool shared between admission and proposal building.
pub type SharedPool = Arc<RwLock<PendingPool>>;

/// Outcome of a CheckTx.
pub type AdmitResult = Result<AdmitOutcome, AdmissionError>;

/// Decides whether transactions enter the pending pool.
///
/// All cost estimation happens before the pool lock is taken; the lock is
/// held only for the upsert itself, so many admissions can run in parallel.
#[derive(Clone)]
pub struct AdmissionController {
    estimator: CostEstimator,
    pool: SharedPool,
}

impl AdmissionController {
    /// Creates a controller with a fresh pool.
    pub fn new(params: ProtocolParams, config: MempoolConfig) -> Self {
        Self::with_pool(
            CostEstimator::new(params),
            Arc::new(RwLock::new(PendingPool::new(config))),
        )
    }

    /// Creates a controller over an existing pool.
    pub fn with_pool(estimator: CostEstimator, pool: SharedPool) -> Self {
        Self { estimator, pool }
    }

    /// Shared pool handle.
    pub fn pool(&self) -> SharedPool {
        Arc::clone(&self.pool)
    }

    /// The estimator in use.
    pub fn estimator(&self) -> &CostEstimator {
        &self.estimator
    }

    /// Stateless admission checks: size, decoding, compute and fee ceilings.
    ///
    /// # Errors
    /// Any `AdmissionError` that does not depend on pool contents.
    pub fn check(&self, raw: &[u8]) -> Result<EstimatedTx, AdmissionError> {
        let params = self.estimator.params();

        let size = raw.len() as u64;
        if size > params.max_tx_bytes {
            return Err(AdmissionError::ExceedsSizeLimit {
                size,
                limit: params.max_tx_bytes,
            });
        }

        let estimate = self.estimator.estimate(raw)?;
        let gas = estimate.cost.gas;
        let inner = estimate.inner();

        if gas > params.max_tx_gas {
            return Err(AdmissionError::ExceedsComputeBudget {
                gas,
                limit: params.max_tx_gas,
            });
        }
        if gas > inner.gas_limit {
            return Err(AdmissionError::ExceedsComputeBudget {
                gas,
                limit: inner.gas_limit,
            });
        }

        let required = inner.gas_limit.saturating_mul(params.min_gas_price);
        if inner.fee < required {
            return Err(AdmissionError::InsufficientFee {
                fee: inner.fee,
                required,
            });
        }

        Ok(estimate)
    }

    /// Admits `raw` at `height`.
    ///
    /// Re-submitting a pooled transaction returns `AlreadyKnown`.
    pub fn admit(&self, raw: &[u8], height: u64) -> AdmitResult {
        let hash = tx_hash(raw);
        if self.pool.read().contains(&hash) {
            return Ok(AdmitOutcome::AlreadyKnown { hash });
        }

        let estimate = match self.check(raw) {
            Ok(est) => est,
            Err(e) => {
                debug!("[sq-04] rejected {}: {}", hex_prefix(&hash), e);
                return Err(e);
            }
        };

        let result = self.pool.write().insert(raw.to_vec(), estimate, height);
        match &result {
            Ok(AdmitOutcome::Replaced { previous, .. }) => info!(
                "[sq-04] {} replaced {}",
                hex_prefix(&hash),
                hex_prefix(previous)
            ),
            Ok(_) => {}
            Err(e) => debug!("[sq-04] rejected {}: {}", hex_prefix(&hash), e),
        }
        result
    }

    /// Snapshot of pooled transactions in candidate order.
    pub fn candidates(&self) -> Vec<Arc<PooledTx>> {
        self.pool.read().candidates()
    }

    /// Removes transactions included at a finalized height.
    pub fn remove_committed(&self, hashes: &[Hash]) -> Vec<Hash> {
        self.pool.write().remove_committed(hashes)
    }

    /// Drops expired entries at `height`.
    pub fn evict_expired(&self, height: u64) -> Vec<Hash> {
        let expired = self.pool.write().evict_expired(height);
        if !expired.is_empty() {
            info!("[sq-04] expired {} transactions at height {}", expired.len(), height);
        }
        expired
    }

    /// Pool occupancy.
    pub fn status(&self) -> PoolStatus {
        self.pool.read().status()
    }
}

fn hex_prefix(hash: &Hash) -> String {
    hex::encode(&hash[..4])
}
