//! Error types for the proposal subsystem

use crate::state::HeightPhase;
use shared_types::{Classify, ErrorClass, ParamsError};
use sq_02_commitment::CommitmentError;
use sq_05_square_builder::BuildError;
use thiserror::Error;

/// Result type for proposal operations
pub type Result<T> = std::result::Result<T, ProposalError>;

/// Proposal service errors
///
/// Validation outcomes are never errors; they are [`crate::Verdict`]s.
#[derive(Debug, Error)]
pub enum ProposalError {
    /// Square construction failed
    #[error("square construction failed: {0}")]
    Build(#[from] BuildError),

    /// Square commitment failed
    #[error("commitment failed: {0}")]
    Commitment(#[from] CommitmentError),

    /// Protocol parameters are invalid or disagree with a peer
    #[error("protocol parameters: {0}")]
    Params(#[from] ParamsError),

    /// Work did not finish before its deadline
    #[error("deadline of {deadline_ms}ms exceeded")]
    Timeout {
        /// Deadline in milliseconds
        deadline_ms: u64,
    },

    /// A newer height superseded this one
    #[error("height {height} superseded by {current}")]
    Stale {
        /// Height the work was for
        height: u64,
        /// Height now being worked on
        current: u64,
    },

    /// The state machine failed to execute a block
    #[error("state machine error: {0}")]
    StateMachine(String),

    /// A blocking worker panicked or was cancelled
    #[error("worker failed: {0}")]
    Worker(String),

    /// Height phase transition out of order
    #[error("invalid phase transition {from:?} -> {to:?} at height {height}")]
    InvalidTransition {
        /// Height of the round
        height: u64,
        /// Current phase
        from: HeightPhase,
        /// Requested phase
        to: HeightPhase,
    },
}

impl Classify for ProposalError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::Build(e) => e.class(),
            Self::Commitment(e) => e.class(),
            Self::Params(e) => e.class(),
            Self::Timeout { .. } | Self::Stale { .. } => ErrorClass::Timeout,
            Self::StateMachine(_) | Self::Worker(_) | Self::InvalidTransition { .. } => {
                ErrorClass::Fatal
            }
        }
    }
}
