//! A state machine adapter that charges estimated gas.
//!
//! Used by nodes running without an application and by tests; it executes
//! nothing and reports the cost estimator's view of each transaction.

use crate::error::Result;
use crate::ports::{BlockContext, StateMachine, TxResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::ProtocolParams;
use sq_03_cost_estimator::CostEstimator;
use tracing::debug;

/// Result code for a transaction the estimator rejects.
pub const CODE_REJECTED: u32 = 1;

/// Executes nothing; every priceable transaction succeeds.
pub struct EstimatingStateMachine {
    estimator: CostEstimator,
    executed: Mutex<Vec<BlockContext>>,
}

impl EstimatingStateMachine {
    /// Creates the adapter.
    pub fn new(params: ProtocolParams) -> Self {
        Self {
            estimator: CostEstimator::new(params),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Blocks executed so far, oldest first.
    pub fn executed_blocks(&self) -> Vec<BlockContext> {
        self.executed.lock().clone()
    }
}

#[async_trait]
impl StateMachine for EstimatingStateMachine {
    async fn execute_block(&self, block: &BlockContext, txs: &[Vec<u8>]) -> Result<Vec<TxResult>> {
        let results = txs
            .iter()
            .map(|raw| match self.estimator.estimate(raw) {
                Ok(est) => TxResult::ok(est.cost.gas),
                Err(e) => TxResult {
                    code: CODE_REJECTED,
                    gas_used: 0,
                    log: e.to_string(),
                },
            })
            .collect();
        debug!("[sq-06] executed block {} ({} txs)", block.height, txs.len());
        self.executed.lock().push(block.clone());
        Ok(results)
    }
}
