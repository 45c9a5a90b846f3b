//! Commitment error types.

use shared_types::{Classify, ErrorClass};
use sq_01_shares::ShareError;
use thiserror::Error;

/// Errors raised while committing to shares.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitmentError {
    /// Share splitting or parsing failed.
    #[error("share error: {0}")]
    Share(#[from] ShareError),

    /// Leaves not in non-decreasing namespace order.
    #[error("namespace order violated at leaf {index}")]
    UnorderedNamespace {
        /// Offending leaf.
        index: usize,
    },

    /// Empty share range.
    #[error("empty share range")]
    EmptyRange,

    /// Range outside the tree or square.
    #[error("range {start}..{end} out of bounds for {len} shares")]
    RangeOutOfBounds {
        /// Range start.
        start: usize,
        /// Range end (exclusive).
        end: usize,
        /// Available shares.
        len: usize,
    },
}

impl Classify for CommitmentError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::Share(e) => e.class(),
            _ => ErrorClass::Malformed,
        }
    }
}
