//! Namespaced Merkle tree.
//!
//! Every node carries the smallest and largest namespace beneath it, so a
//! reader holding a root can tell which namespaces a subtree covers and can
//! be handed a proof that a namespace is complete.
//!
//! ```text
//! leaf  = ns ‖ ns ‖ H(0x00 ‖ share)
//! inner = min(l) ‖ max(r) ‖ H(0x01 ‖ l ‖ r)
//! ```
//!
//! Leaves must be pushed in non-decreasing namespace order.

use crate::errors::CommitmentError;
use crate::merkle::{split_point, INNER_PREFIX, LEAF_PREFIX};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::{Hash, Namespace, NAMESPACE_SIZE};
use sq_01_shares::Share;
use std::fmt;

/// Serialized size of a namespaced hash.
pub const NAMESPACED_HASH_SIZE: usize = 2 * NAMESPACE_SIZE + 32;

/// A node digest with its namespace range.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespacedHash {
    /// Smallest namespace beneath this node.
    pub min: Namespace,
    /// Largest namespace beneath this node.
    pub max: Namespace,
    /// SHA-256 digest.
    pub digest: Hash,
}

impl NamespacedHash {
    /// `min ‖ max ‖ digest`.
    pub fn to_bytes(&self) -> [u8; NAMESPACED_HASH_SIZE] {
        let mut out = [0u8; NAMESPACED_HASH_SIZE];
        out[..NAMESPACE_SIZE].copy_from_slice(self.min.as_bytes());
        out[NAMESPACE_SIZE..2 * NAMESPACE_SIZE].copy_from_slice(self.max.as_bytes());
        out[2 * NAMESPACE_SIZE..].copy_from_slice(&self.digest);
        out
    }

    /// True if `namespace` falls within this node's range.
    pub fn contains(&self, namespace: &Namespace) -> bool {
        self.min <= *namespace && *namespace <= self.max
    }

    /// Root of an empty tree.
    pub fn empty() -> Self {
        let zero = Namespace::from_raw([0u8; NAMESPACE_SIZE]);
        Self {
            min: zero,
            max: zero,
            digest: Sha256::digest([]).into(),
        }
    }
}

impl fmt::Debug for NamespacedHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NamespacedHash({}..{}, {})",
            self.min,
            self.max,
            hex::encode(self.digest)
        )
    }
}

/// Leaf node for a share.
pub fn leaf_node(share: &Share) -> NamespacedHash {
    let namespace = share.namespace();
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(share.as_bytes());
    NamespacedHash {
        min: namespace,
        max: namespace,
        digest: hasher.finalize().into(),
    }
}

/// Parent of two nodes.
pub fn inner_node(left: &NamespacedHash, right: &NamespacedHash) -> NamespacedHash {
    let mut hasher = Sha256::new();
    hasher.update([INNER_PREFIX]);
    hasher.update(left.to_bytes());
    hasher.update(right.to_bytes());
    NamespacedHash {
        min: left.min.min(right.min),
        max: left.max.max(right.max),
        digest: hasher.finalize().into(),
    }
}

/// Root over already-ordered leaf nodes.
pub fn subtree_root(leaves: &[NamespacedHash]) -> NamespacedHash {
    match leaves.len() {
        0 => NamespacedHash::empty(),
        1 => leaves[0],
        n => {
            let k = split_point(n);
            inner_node(&subtree_root(&leaves[..k]), &subtree_root(&leaves[k..]))
        }
    }
}

/// Leaf nodes for `shares`, checking namespace order.
///
/// # Errors
/// `UnorderedNamespace` at the first share whose namespace decreases.
pub fn leaf_nodes<'a, I>(shares: I) -> Result<Vec<NamespacedHash>, CommitmentError>
where
    I: IntoIterator<Item = &'a Share>,
{
    let mut leaves: Vec<NamespacedHash> = Vec::new();
    for (index, share) in shares.into_iter().enumerate() {
        let leaf = leaf_node(share);
        if let Some(prev) = leaves.last() {
            if leaf.min < prev.max {
                return Err(CommitmentError::UnorderedNamespace { index });
            }
        }
        leaves.push(leaf);
    }
    Ok(leaves)
}

/// Root of the namespaced tree over `shares`.
pub fn nmt_root<'a, I>(shares: I) -> Result<NamespacedHash, CommitmentError>
where
    I: IntoIterator<Item = &'a Share>,
{
    Ok(subtree_root(&leaf_nodes(shares)?))
}
