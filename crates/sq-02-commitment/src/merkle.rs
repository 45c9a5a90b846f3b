//! RFC-6962 binary Merkle tree.
//!
//! ALGORITHM: leaves are hashed as `H(0x00 ‖ data)`, inner nodes as
//! `H(0x01 ‖ left ‖ right)`. A range of `n > 1` items is split at the
//! largest power of two strictly below `n`, so no padding leaves exist and
//! the tree over any prefix is stable. The root of zero items is `H("")`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::Hash;

/// Domain prefix of leaf hashes.
pub const LEAF_PREFIX: u8 = 0x00;

/// Domain prefix of inner node hashes.
pub const INNER_PREFIX: u8 = 0x01;

/// Hash of a leaf.
pub fn leaf_hash(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash of an inner node.
pub fn inner_hash(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([INNER_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Root of the empty tree.
pub fn empty_hash() -> Hash {
    Sha256::digest([]).into()
}

/// Split point for a range of `n > 1` items.
pub(crate) fn split_point(n: usize) -> usize {
    n.next_power_of_two() / 2
}

/// Root over `items`.
pub fn merkle_root<T: AsRef<[u8]>>(items: &[T]) -> Hash {
    match items.len() {
        0 => empty_hash(),
        1 => leaf_hash(items[0].as_ref()),
        n => {
            let k = split_point(n);
            inner_hash(&merkle_root(&items[..k]), &merkle_root(&items[k..]))
        }
    }
}

/// Position of a sibling relative to the running hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiblingPosition {
    Left,
    Right,
}

/// A single node in a proof path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode {
    /// The sibling hash at this level.
    pub hash: Hash,
    /// Position of the sibling.
    pub position: SiblingPosition,
}

/// Inclusion proof for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Index of the proven item.
    pub index: usize,
    /// Number of items in the tree.
    pub total: usize,
    /// Sibling path from leaf to root.
    pub path: Vec<ProofNode>,
}

impl MerkleProof {
    /// Builds the proof for `items[index]`, or `None` if out of range.
    pub fn generate<T: AsRef<[u8]>>(items: &[T], index: usize) -> Option<Self> {
        if index >= items.len() {
            return None;
        }
        let mut path = Vec::new();
        collect_path(items, index, &mut path);
        path.reverse();
        Some(Self {
            index,
            total: items.len(),
            path,
        })
    }

    /// Recomputes the root from `item` and the path and compares.
    pub fn verify(&self, item: &[u8], expected_root: &Hash) -> bool {
        let mut current = leaf_hash(item);
        for node in &self.path {
            current = match node.position {
                SiblingPosition::Left => inner_hash(&node.hash, &current),
                SiblingPosition::Right => inner_hash(&current, &node.hash),
            };
        }
        current == *expected_root
    }
}

// Pushes siblings root-first; the caller reverses.
fn collect_path<T: AsRef<[u8]>>(items: &[T], index: usize, path: &mut Vec<ProofNode>) {
    if items.len() <= 1 {
        return;
    }
    let k = split_point(items.len());
    if index < k {
        path.push(ProofNode {
            hash: merkle_root(&items[k..]),
            position: SiblingPosition::Right,
        });
        collect_path(&items[..k], index, path);
    } else {
        path.push(ProofNode {
            hash: merkle_root(&items[..k]),
            position: SiblingPosition::Left,
        });
        collect_path(&items[k..], index - k, path);
    }
}
