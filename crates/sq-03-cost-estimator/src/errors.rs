//! Cost estimation error types.

use shared_types::{Classify, DecodeError, ErrorClass, NamespaceError};
use sq_02_commitment::CommitmentError;
use thiserror::Error;

/// A transaction the estimator refuses to price.
///
/// Every variant is a structural defect of the transaction itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CostError {
    /// Raw bytes do not decode.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Client header declares more validators than the node will verify.
    #[error("client header declares {count} validators, maximum is {max}")]
    TooManyValidators {
        /// Declared validators.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Client header with no validators.
    #[error("client header has an empty validator set")]
    EmptyValidatorSet,

    /// More commit signatures than validators.
    #[error("client header carries {signatures} signatures for {validators} validators")]
    ExcessSignatures {
        /// Signatures present.
        signatures: usize,
        /// Validators declared.
        validators: usize,
    },

    /// PayForBlobs outside a blob transaction.
    #[error("PayForBlobs message without attached blobs")]
    PayForBlobsWithoutBlobs,

    /// PayForBlobs field lengths disagree with the attached blobs.
    #[error("PayForBlobs declares {declared} blobs, {attached} attached")]
    BlobCountMismatch {
        /// Entries in the message.
        declared: usize,
        /// Blobs attached.
        attached: usize,
    },

    /// PayForBlobs signer differs from the transaction signer.
    #[error("PayForBlobs signer differs from the transaction signer")]
    SignerMismatch,

    /// Blob in a namespace users may not write.
    #[error("blob {index}: {source}")]
    InvalidNamespace {
        /// Blob position.
        index: usize,
        /// Underlying namespace error.
        source: NamespaceError,
    },

    /// Blob namespace differs from the declared one.
    #[error("blob {index}: namespace differs from PayForBlobs")]
    NamespaceMismatch {
        /// Blob position.
        index: usize,
    },

    /// Blob length differs from the declared size.
    #[error("blob {index}: declared {declared} bytes, carries {actual}")]
    BlobSizeMismatch {
        /// Blob position.
        index: usize,
        /// Declared size.
        declared: u32,
        /// Actual size.
        actual: usize,
    },

    /// Blob share version differs from the declared one.
    #[error("blob {index}: share version differs from PayForBlobs")]
    ShareVersionMismatch {
        /// Blob position.
        index: usize,
    },

    /// Share-version-1 blob whose embedded signer is not the payer.
    #[error("blob {index}: embedded signer differs from PayForBlobs signer")]
    BlobSignerMismatch {
        /// Blob position.
        index: usize,
    },

    /// Declared share commitment differs from the one computed from the blob.
    #[error("blob {index}: share commitment mismatch")]
    BlobCommitmentMismatch {
        /// Blob position.
        index: usize,
    },

    /// Blob could not be split or committed to.
    #[error("blob commitment failed: {0}")]
    Commitment(#[from] CommitmentError),
}

impl Classify for CostError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Malformed
    }
}
