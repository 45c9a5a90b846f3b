//! Outbound ports (driven side - SPI)

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// Result code of a successfully executed transaction.
pub const CODE_OK: u32 = 0;

/// Header fields of the block being finalized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    /// Block height
    pub height: u64,
    /// Block time (unix seconds)
    pub time: u64,
    /// Hash of the previous block
    pub prev_hash: Hash,
}

/// Execution outcome of one transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxResult {
    /// `CODE_OK` or an application error code
    pub code: u32,
    /// Gas consumed
    pub gas_used: u64,
    /// Human-readable log
    pub log: String,
}

impl TxResult {
    /// Successful execution.
    pub fn ok(gas_used: u64) -> Self {
        Self {
            code: CODE_OK,
            gas_used,
            log: String::new(),
        }
    }

    /// True if the transaction executed successfully.
    pub fn is_ok(&self) -> bool {
        self.code == CODE_OK
    }
}

/// Port: the application state machine that executes finalized blocks.
///
/// Only result codes flow back; state transitions stay on the other side.
#[async_trait]
pub trait StateMachine: Send + Sync {
    /// Executes `txs` in order, returning one result per transaction.
    async fn execute_block(&self, block: &BlockContext, txs: &[Vec<u8>]) -> Result<Vec<TxResult>>;
}
