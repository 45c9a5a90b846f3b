//! Blob share commitments.
//!
//! A blob's shares are cut into a mountain range of power-of-two chunks no
//! wider than the blob's subtree width. Each chunk's NMT root is a subtree of
//! some row tree once the blob sits at an aligned index, so the commitment
//! can be re-derived from the square without the blob itself.

use crate::errors::CommitmentError;
use crate::merkle::merkle_root;
use crate::nmt::{nmt_root, NamespacedHash, NAMESPACED_HASH_SIZE};
use shared_types::{Blob, Hash};
use sq_01_shares::{blob_shares, round_down_power_of_two, subtree_width, Share, Square};

/// Chunk sizes for `total` leaves, greedily taking the largest allowed
/// power of two.
pub fn merkle_mountain_range_sizes(total: usize, max_tree_size: usize) -> Vec<usize> {
    let mut sizes = Vec::new();
    let mut remaining = total;
    while remaining != 0 {
        let size = if remaining >= max_tree_size {
            max_tree_size
        } else {
            round_down_power_of_two(remaining)
        };
        sizes.push(size);
        remaining -= size;
    }
    sizes
}

/// Commitment over the shares of one blob.
pub fn commitment_from_shares(
    shares: &[Share],
    subtree_root_threshold: usize,
) -> Result<Hash, CommitmentError> {
    if shares.is_empty() {
        return Err(CommitmentError::EmptyRange);
    }
    let width = subtree_width(shares.len(), subtree_root_threshold);
    let mut cursor = 0usize;
    let mut subtree_roots: Vec<[u8; NAMESPACED_HASH_SIZE]> = Vec::new();

    for size in merkle_mountain_range_sizes(shares.len(), width) {
        let root: NamespacedHash = nmt_root(&shares[cursor..cursor + size])?;
        subtree_roots.push(root.to_bytes());
        cursor += size;
    }
    Ok(merkle_root(&subtree_roots))
}

/// Share commitment of `blob`, as declared in `MsgPayForBlobs`.
pub fn create_commitment(
    blob: &Blob,
    subtree_root_threshold: usize,
) -> Result<Hash, CommitmentError> {
    let shares = blob_shares(blob)?;
    commitment_from_shares(&shares, subtree_root_threshold)
}

/// Re-derives the commitment of the blob occupying `start..start + len` in
/// `square`.
pub fn blob_commitment_at(
    square: &Square,
    start: usize,
    len: usize,
    subtree_root_threshold: usize,
) -> Result<Hash, CommitmentError> {
    let end = start.saturating_add(len);
    if len == 0 {
        return Err(CommitmentError::EmptyRange);
    }
    let shares = square
        .shares()
        .get(start..end)
        .ok_or(CommitmentError::RangeOutOfBounds {
            start,
            end,
            len: square.share_count(),
        })?;
    commitment_from_shares(shares, subtree_root_threshold)
}
