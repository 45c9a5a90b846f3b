//! Inclusion proofs for share ranges.
//!
//! An `NmtRangeProof` proves a contiguous run of leaves against a row root:
//! it carries the roots of every maximal subtree lying wholly outside the
//! range, in left-to-right order. A `ShareProof` chains that to the data
//! root through the RFC-6962 proof of the row root.

use crate::commitment::Root;
use crate::errors::CommitmentError;
use crate::merkle::{split_point, MerkleProof};
use crate::nmt::{inner_node, leaf_node, subtree_root, NamespacedHash};
use serde::{Deserialize, Serialize};
use sq_01_shares::Share;

/// Proof of leaves `start..end` within a tree of `total` leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NmtRangeProof {
    /// First proven leaf.
    pub start: usize,
    /// One past the last proven leaf.
    pub end: usize,
    /// Leaves in the tree.
    pub total: usize,
    /// Roots of the subtrees outside the range.
    pub nodes: Vec<NamespacedHash>,
}

impl NmtRangeProof {
    /// Builds a proof for `leaves[start..end]`.
    pub fn generate(
        leaves: &[NamespacedHash],
        start: usize,
        end: usize,
    ) -> Result<Self, CommitmentError> {
        if start >= end {
            return Err(CommitmentError::EmptyRange);
        }
        if end > leaves.len() {
            return Err(CommitmentError::RangeOutOfBounds {
                start,
                end,
                len: leaves.len(),
            });
        }
        let mut nodes = Vec::new();
        collect_outside(leaves, 0, start, end, &mut nodes);
        Ok(Self {
            start,
            end,
            total: leaves.len(),
            nodes,
        })
    }

    /// Checks that `shares` are exactly the proven range under `root`.
    pub fn verify(&self, root: &NamespacedHash, shares: &[Share]) -> bool {
        if self.start >= self.end
            || self.end > self.total
            || shares.len() != self.end - self.start
        {
            return false;
        }
        let leaves: Vec<NamespacedHash> = shares.iter().map(leaf_node).collect();
        let mut nodes = self.nodes.iter();
        let rebuilt = rebuild(0, self.total, self, &leaves, &mut nodes);
        nodes.next().is_none() && rebuilt.as_ref() == Some(root)
    }
}

fn collect_outside(
    leaves: &[NamespacedHash],
    offset: usize,
    start: usize,
    end: usize,
    out: &mut Vec<NamespacedHash>,
) {
    let hi = offset + leaves.len();
    if hi <= start || offset >= end {
        out.push(subtree_root(leaves));
        return;
    }
    if leaves.len() == 1 {
        return;
    }
    let k = split_point(leaves.len());
    collect_outside(&leaves[..k], offset, start, end, out);
    collect_outside(&leaves[k..], offset + k, start, end, out);
}

fn rebuild<'a>(
    offset: usize,
    len: usize,
    proof: &NmtRangeProof,
    leaves: &[NamespacedHash],
    nodes: &mut impl Iterator<Item = &'a NamespacedHash>,
) -> Option<NamespacedHash> {
    let hi = offset + len;
    if hi <= proof.start || offset >= proof.end {
        return nodes.next().copied();
    }
    if len == 1 {
        return leaves.get(offset - proof.start).copied();
    }
    let k = split_point(len);
    let left = rebuild(offset, k, proof, leaves, nodes)?;
    let right = rebuild(offset + k, len - k, proof, leaves, nodes)?;
    Some(inner_node(&left, &right))
}

/// Proof of a share range within one row, anchored to the data root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareProof {
    /// Row holding the shares.
    pub row: usize,
    /// Root of that row.
    pub row_root: NamespacedHash,
    /// Range proof against the row root.
    pub row_proof: NmtRangeProof,
    /// Proof of the row root against the data root.
    pub root_proof: MerkleProof,
}

impl ShareProof {
    /// Checks `shares` against `data_root`.
    pub fn verify(&self, data_root: &Root, shares: &[Share]) -> bool {
        self.root_proof.index == self.row
            && self.row_proof.verify(&self.row_root, shares)
            && self
                .root_proof
                .verify(&self.row_root.to_bytes(), data_root.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nmt::leaf_nodes;
    use shared_types::Namespace;
    use sq_01_shares::{namespace_padding_shares, tail_padding_shares};

    fn row() -> Vec<Share> {
        let ns = Namespace::v0(b"p").unwrap();
        let mut shares = namespace_padding_shares(&ns, 3);
        shares.extend(tail_padding_shares(5));
        shares
    }

    #[test]
    fn test_every_range_verifies() {
        let shares = row();
        let leaves = leaf_nodes(&shares).unwrap();
        let root = subtree_root(&leaves);

        for start in 0..shares.len() {
            for end in start + 1..=shares.len() {
                let proof = NmtRangeProof::generate(&leaves, start, end).unwrap();
                assert!(proof.verify(&root, &shares[start..end]), "{start}..{end}");
            }
        }
    }

    #[test]
    fn test_wrong_shares_rejected() {
        let shares = row();
        let leaves = leaf_nodes(&shares).unwrap();
        let root = subtree_root(&leaves);
        let proof = NmtRangeProof::generate(&leaves, 1, 3).unwrap();

        assert!(!proof.verify(&root, &shares[2..4]));
        assert!(!proof.verify(&root, &shares[1..2]));
    }

    #[test]
    fn test_invalid_ranges() {
        let leaves = leaf_nodes(&row()).unwrap();
        assert_eq!(
            NmtRangeProof::generate(&leaves, 2, 2),
            Err(CommitmentError::EmptyRange)
        );
        assert!(matches!(
            NmtRangeProof::generate(&leaves, 0, 9),
            Err(CommitmentError::RangeOutOfBounds { .. })
        ));
    }
}
