//! Admission error types.

use shared_types::{Address, Classify, ErrorClass};
use sq_03_cost_estimator::CostError;

/// Why a transaction was refused entry to the pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AdmissionError {
    /// Raw transaction over the per-transaction byte ceiling.
    ExceedsSizeLimit { size: u64, limit: u64 },

    /// Estimated gas over the per-transaction ceiling or the tx's own gas limit.
    ExceedsComputeBudget { gas: u64, limit: u64 },

    /// Transaction failed decoding or cost estimation.
    Malformed(CostError),

    /// An entry with the same (account, sequence) key outranks this one.
    DuplicateSequence { signer: Address, sequence: u64 },

    /// Fee below `gas × min_gas_price`.
    InsufficientFee { fee: u64, required: u64 },

    /// Account has reached its pending transaction limit.
    AccountLimitReached { signer: Address, limit: usize },

    /// Pool at capacity and the transaction does not outrank the lowest entry.
    PoolFull { capacity: usize },
}

impl std::fmt::Display for AdmissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExceedsSizeLimit { size, limit } => {
                write!(f, "Transaction size {} exceeds limit {}", size, limit)
            }
            Self::ExceedsComputeBudget { gas, limit } => {
                write!(f, "Estimated gas {} exceeds limit {}", gas, limit)
            }
            Self::Malformed(e) => write!(f, "Malformed transaction: {}", e),
            Self::DuplicateSequence { signer, sequence } => {
                write!(
                    f,
                    "Sequence {} of account {:?} already pooled at equal or higher priority",
                    sequence,
                    &signer[..4]
                )
            }
            Self::InsufficientFee { fee, required } => {
                write!(f, "Fee {} below required {}", fee, required)
            }
            Self::AccountLimitReached { signer, limit } => {
                write!(
                    f,
                    "Account {:?} reached limit of {} transactions",
                    &signer[..4],
                    limit
                )
            }
            Self::PoolFull { capacity } => {
                write!(f, "Pool full at {} transactions", capacity)
            }
        }
    }
}

impl std::error::Error for AdmissionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CostError> for AdmissionError {
    fn from(e: CostError) -> Self {
        Self::Malformed(e)
    }
}

impl Classify for AdmissionError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::Malformed(_) => ErrorClass::Malformed,
            _ => ErrorClass::ResourceExceeded,
        }
    }
}
