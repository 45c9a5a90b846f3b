//! Share and square error types.

use crate::share::SHARE_SIZE;
use shared_types::{Classify, ErrorClass, Namespace};
use thiserror::Error;

/// Errors raised while splitting, parsing or arranging shares.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareError {
    /// Raw share of the wrong length.
    #[error("share must be {SHARE_SIZE} bytes, got {0}")]
    InvalidSize(usize),

    /// Share version outside the supported set.
    #[error("unsupported share version {0}")]
    UnsupportedShareVersion(u8),

    /// Blob with no data.
    #[error("blob has no data")]
    EmptyBlob,

    /// Blob longer than a sequence length can express.
    #[error("blob of {0} bytes is too large")]
    BlobTooLarge(usize),

    /// Share-version-1 blob without a signer.
    #[error("share version 1 blob is missing its signer")]
    MissingSigner,

    /// First share of a sequence is not flagged as a sequence start.
    #[error("sequence does not begin with a sequence-start share")]
    MissingSequenceStart,

    /// A continuation share flagged as a sequence start.
    #[error("unexpected sequence-start share at position {0}")]
    UnexpectedSequenceStart(usize),

    /// Sequence shorter than its declared length.
    #[error("sequence declares {declared} bytes but only {available} are present")]
    TruncatedSequence {
        /// Declared sequence length.
        declared: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// Malformed unit length prefix.
    #[error("invalid varint length prefix")]
    InvalidVarint,

    /// Share of a different namespace inside one sequence.
    #[error("namespace {found} inside a {expected} sequence")]
    NamespaceMismatch {
        /// Namespace of the sequence.
        expected: Namespace,
        /// Namespace found.
        found: Namespace,
    },

    /// Malformed PayForBlobs index wrapper.
    #[error("invalid index wrapper")]
    InvalidIndexWrapper,

    /// Share count that is not a power-of-two square.
    #[error("{0} shares do not form a power-of-two square")]
    NotSquare(usize),
}

impl Classify for ShareError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::BlobTooLarge(_) => ErrorClass::ResourceExceeded,
            _ => ErrorClass::Malformed,
        }
    }
}
