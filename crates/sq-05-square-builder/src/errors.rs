//! Square construction errors.

use shared_types::{Classify, ErrorClass};
use sq_01_shares::ShareError;
use thiserror::Error;

/// Failure to lay out an ordered transaction list.
///
/// Selection never fails on an oversized candidate; these errors come from
/// laying out a list someone else ordered, or from a broken share.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// A transaction could not be split into shares.
    #[error("share error: {0}")]
    Share(#[from] ShareError),

    /// The content needs a square above the maximum dimension.
    #[error("content needs {needed} shares, a {max}x{max} square holds {capacity}")]
    SquareTooLarge {
        /// Shares the content occupies.
        needed: usize,
        /// Maximum dimension.
        max: usize,
        /// `max²`.
        capacity: usize,
    },

    /// Plain transactions must precede blob transactions.
    #[error("plain transaction at index {index} follows a blob transaction")]
    PlainAfterBlob {
        /// Position of the offending transaction.
        index: usize,
    },

    /// A section came out a different size than planned.
    #[error("{section} section planned at {planned} shares, produced {actual}")]
    SectionSizeMismatch {
        /// Section name.
        section: &'static str,
        /// Planned share count.
        planned: usize,
        /// Produced share count.
        actual: usize,
    },
}

impl Classify for BuildError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::Share(e) => e.class(),
            Self::SquareTooLarge { .. } => ErrorClass::ResourceExceeded,
            Self::PlainAfterBlob { .. } => ErrorClass::Malformed,
            Self::SectionSizeMismatch { .. } => ErrorClass::Mismatch,
        }
    }
}
