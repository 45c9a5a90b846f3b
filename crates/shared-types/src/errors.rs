//! # Error Types
//!
//! The shared error taxonomy and decoding errors used across subsystems.

use thiserror::Error;

/// Coarse classification of every failure in the proposal pipeline.
///
/// | Class | Meaning | Retry |
/// |-------|---------|-------|
/// | `Malformed` | Structurally invalid input | Never |
/// | `ResourceExceeded` | Over a size or compute ceiling | Sender may resubmit smaller |
/// | `Mismatch` | Proposal failed reconstruction | Affects one height only |
/// | `Timeout` | Bounded-time violation | Treated as reject |
/// | `Fatal` | Configuration disagreement | Operator must intervene |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Structurally invalid input.
    Malformed,
    /// Size or compute ceiling exceeded.
    ResourceExceeded,
    /// Proposal reconstruction disagreed with its claims.
    Mismatch,
    /// Deadline exceeded or work abandoned.
    Timeout,
    /// Protocol-breaking misconfiguration.
    Fatal,
}

impl ErrorClass {
    /// True if the same input may succeed later.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ResourceExceeded | Self::Timeout)
    }

    /// True if the node operator must intervene.
    pub fn is_critical(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Implemented by every subsystem error so callers can act on the class.
pub trait Classify {
    /// The taxonomy class of this error.
    fn class(&self) -> ErrorClass;
}

/// Raw transaction decoding failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Shorter than the type marker.
    #[error("transaction too short: {0} bytes")]
    TooShort(usize),

    /// Unknown type marker.
    #[error("unknown transaction marker {0}")]
    UnknownMarker(String),

    /// Body failed to decode.
    #[error("invalid transaction body: {0}")]
    Body(String),

    /// Blob transaction whose inner transaction is not a plain transaction.
    #[error("blob transaction does not wrap a plain transaction")]
    InnerNotPlain,

    /// Blob transaction whose inner transaction carries no `PayForBlobs`.
    #[error("blob transaction carries no PayForBlobs message")]
    MissingPayForBlobs,

    /// Blob transaction without blobs.
    #[error("blob transaction carries no blobs")]
    NoBlobs,
}

impl Classify for DecodeError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Malformed
    }
}

/// A transaction could not be serialized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transaction encoding failed: {0}")]
pub struct EncodeError(pub String);

impl Classify for EncodeError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Malformed
    }
}
