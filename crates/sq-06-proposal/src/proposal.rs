//! Proposal and verdict types exchanged with the consensus engine.

use serde::{Deserialize, Serialize};
use shared_types::{tx_hash, ErrorClass, Hash};
use sq_02_commitment::Root;
use thiserror::Error;

/// A block proposal as received from the proposer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    /// Height being proposed
    pub height: u64,
    /// Ordered raw transactions
    pub txs: Vec<Vec<u8>>,
    /// Claimed square dimension
    pub dimension: usize,
    /// Claimed data root
    pub data_root: Root,
}

impl Proposal {
    /// Hashes of the proposed transactions, in order.
    pub fn tx_hashes(&self) -> Vec<Hash> {
        self.txs.iter().map(|raw| tx_hash(raw)).collect()
    }

    /// Summed raw transaction bytes.
    pub fn block_bytes(&self) -> u64 {
        self.txs.iter().map(|raw| raw.len() as u64).sum()
    }
}

/// A proposal built by this node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreparedProposal {
    /// Height being proposed
    pub height: u64,
    /// Ordered raw transactions
    pub txs: Vec<Vec<u8>>,
    /// Square dimension
    pub dimension: usize,
    /// Data root
    pub data_root: Root,
    /// Summed estimated gas
    pub gas_used: u64,
    /// Summed raw transaction bytes
    pub block_bytes: u64,
}

impl PreparedProposal {
    /// The claims other validators will check.
    pub fn to_proposal(&self) -> Proposal {
        Proposal {
            height: self.height,
            txs: self.txs.clone(),
            dimension: self.dimension,
            data_root: self.data_root,
        }
    }

    /// True for a proposal with no transactions.
    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }
}

/// Why a proposal was refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidReason {
    /// Reconstructed dimension differs from the claim.
    #[error("dimension mismatch: claimed {claimed}, reconstructed {actual}")]
    DimensionMismatch {
        /// Claimed dimension
        claimed: usize,
        /// Reconstructed dimension
        actual: usize,
    },

    /// Reconstructed root differs from the claim.
    #[error("data root mismatch: claimed {claimed}, reconstructed {actual}")]
    RootMismatch {
        /// Claimed root
        claimed: Root,
        /// Reconstructed root
        actual: Root,
    },

    /// Square larger than the configured maximum.
    #[error("square of {dimension} exceeds maximum {max}")]
    OversizeSquare {
        /// Claimed or required dimension
        dimension: usize,
        /// Configured maximum
        max: usize,
    },

    /// A blob transaction failed its structural or commitment check.
    #[error("transaction {index}: malformed blob transaction: {reason}")]
    MalformedBlobTx {
        /// Position in the proposal
        index: usize,
        /// Underlying failure
        reason: String,
    },

    /// A transaction that does not decode or is out of order.
    #[error("transaction {index}: {reason}")]
    MalformedTx {
        /// Position in the proposal
        index: usize,
        /// Underlying failure
        reason: String,
    },

    /// The transaction list could not be laid out or committed to.
    #[error("square construction failed: {0}")]
    LayoutFailed(String),

    /// Gas or bytes over the proposal budget.
    #[error("{resource} {used} exceeds budget {limit}")]
    BudgetExceeded {
        /// `"gas"`, `"bytes"` or `"tx gas"`
        resource: &'static str,
        /// Amount used
        used: u64,
        /// Ceiling
        limit: u64,
    },

    /// A newer height arrived first.
    #[error("height {height} superseded by {current}")]
    Stale {
        /// Proposal height
        height: u64,
        /// Newest height
        current: u64,
    },

    /// Validation ran past its deadline.
    #[error("validation exceeded {deadline_ms}ms")]
    Timeout {
        /// Deadline in milliseconds
        deadline_ms: u64,
    },

    /// The validation worker failed.
    #[error("validation aborted: {0}")]
    Aborted(String),
}

impl InvalidReason {
    /// Taxonomy class of the refusal.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::DimensionMismatch { .. } | Self::RootMismatch { .. } => ErrorClass::Mismatch,
            Self::OversizeSquare { .. } | Self::BudgetExceeded { .. } => {
                ErrorClass::ResourceExceeded
            }
            Self::MalformedBlobTx { .. } | Self::MalformedTx { .. } | Self::LayoutFailed(_) => {
                ErrorClass::Malformed
            }
            Self::Stale { .. } | Self::Timeout { .. } | Self::Aborted(_) => ErrorClass::Timeout,
        }
    }
}

/// Outcome of validating a proposal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Vote for it.
    Valid,
    /// Refuse to vote for it.
    Invalid(InvalidReason),
}

impl Verdict {
    /// True for `Valid`.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The refusal reason, if any.
    pub fn reason(&self) -> Option<&InvalidReason> {
        match self {
            Self::Valid => None,
            Self::Invalid(reason) => Some(reason),
        }
    }
}

impl From<InvalidReason> for Verdict {
    fn from(reason: InvalidReason) -> Self {
        Self::Invalid(reason)
    }
}
