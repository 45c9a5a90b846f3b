//! Consistency between a PayForBlobs message and the blobs it pays for.

use crate::errors::CostError;
use shared_types::{Blob, MsgPayForBlobs, PlainTransaction};
use sq_01_shares::{ensure_supported_version, SHARE_VERSION_ONE};
use sq_02_commitment::create_commitment;

/// Checks a blob transaction's inner message against its blobs.
///
/// The commitment check re-splits and re-hashes every blob, so its cost is
/// linear in the blob bytes already charged for.
///
/// # Errors
/// Any disagreement between the message and the blobs.
pub fn validate_blob_tx(
    inner: &PlainTransaction,
    blobs: &[Blob],
    subtree_root_threshold: usize,
) -> Result<(), CostError> {
    let pfb: &MsgPayForBlobs = inner
        .pay_for_blobs()
        .ok_or(CostError::PayForBlobsWithoutBlobs)?;

    let attached = blobs.len();
    for declared in [
        pfb.namespaces.len(),
        pfb.blob_sizes.len(),
        pfb.share_commitments.len(),
        pfb.share_versions.len(),
    ] {
        if declared != attached {
            return Err(CostError::BlobCountMismatch { declared, attached });
        }
    }
    if pfb.signer != inner.signer {
        return Err(CostError::SignerMismatch);
    }

    for (index, blob) in blobs.iter().enumerate() {
        blob.namespace
            .validate_for_blob()
            .map_err(|source| CostError::InvalidNamespace { index, source })?;
        if blob.namespace != pfb.namespaces[index] {
            return Err(CostError::NamespaceMismatch { index });
        }
        if blob.data.len() != pfb.blob_sizes[index] as usize {
            return Err(CostError::BlobSizeMismatch {
                index,
                declared: pfb.blob_sizes[index],
                actual: blob.data.len(),
            });
        }
        if blob.share_version != pfb.share_versions[index] {
            return Err(CostError::ShareVersionMismatch { index });
        }
        ensure_supported_version(blob.share_version)
            .map_err(|e| CostError::Commitment(e.into()))?;
        if blob.share_version == SHARE_VERSION_ONE && blob.signer != Some(pfb.signer) {
            return Err(CostError::BlobSignerMismatch { index });
        }

        let computed = create_commitment(blob, subtree_root_threshold)?;
        if computed != pfb.share_commitments[index] {
            return Err(CostError::BlobCommitmentMismatch { index });
        }
    }
    Ok(())
}

/// Builds a consistent `MsgPayForBlobs` for `blobs`.
///
/// Used by clients and tests to produce well-formed blob transactions.
pub fn pay_for_blobs_message(
    signer: shared_types::Address,
    blobs: &[Blob],
    subtree_root_threshold: usize,
) -> Result<MsgPayForBlobs, CostError> {
    let mut msg = MsgPayForBlobs {
        signer,
        namespaces: Vec::with_capacity(blobs.len()),
        blob_sizes: Vec::with_capacity(blobs.len()),
        share_commitments: Vec::with_capacity(blobs.len()),
        share_versions: Vec::with_capacity(blobs.len()),
    };
    for blob in blobs {
        msg.namespaces.push(blob.namespace);
        msg.blob_sizes.push(blob.data.len() as u32);
        msg.share_commitments
            .push(create_commitment(blob, subtree_root_threshold)?);
        msg.share_versions.push(blob.share_version);
    }
    Ok(msg)
}
