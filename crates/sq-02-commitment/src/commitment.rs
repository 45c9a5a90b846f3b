//! Square commitment: row roots, column roots and the data root.
//!
//! ## Version 1
//!
//! 1. NMT root of each row and each column (computed in parallel)
//! 2. Data root = RFC-6962 root over `row_roots ‖ column_roots`, each root
//!    serialized as `min ‖ max ‖ digest`
//!
//! The result depends only on the square's shares and dimension.

use crate::errors::CommitmentError;
use crate::merkle::{merkle_root, MerkleProof};
use crate::nmt::{leaf_nodes, nmt_root, NamespacedHash, NAMESPACED_HASH_SIZE};
use crate::proof::{NmtRangeProof, ShareProof};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use shared_types::Hash;
use sq_01_shares::Square;
use std::fmt;
use tracing::{debug, instrument};

/// Version of the commitment construction.
pub const COMMITMENT_VERSION: u32 = 1;

/// The single digest committing to a square.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Root(pub Hash);

impl Root {
    /// Raw digest.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parses lowercase or uppercase hex.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        Some(Self(bytes.try_into().ok()?))
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Root({})", self.to_hex())
    }
}

/// Row roots, column roots and the data root of one square.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SquareCommitment {
    /// One root per row, top to bottom.
    pub row_roots: Vec<NamespacedHash>,
    /// One root per column, left to right.
    pub column_roots: Vec<NamespacedHash>,
    /// Digest over all of the above.
    pub root: Root,
}

impl SquareCommitment {
    /// Commits to `square`.
    ///
    /// # Errors
    /// `UnorderedNamespace` if a row or column is not namespace-ordered.
    #[instrument(skip_all, fields(size = square.size()))]
    pub fn compute(square: &Square) -> Result<Self, CommitmentError> {
        let size = square.size();

        let row_roots = (0..size)
            .into_par_iter()
            .map(|r| nmt_root(square.row(r).unwrap_or_default()))
            .collect::<Result<Vec<_>, _>>()?;
        let column_roots = (0..size)
            .into_par_iter()
            .map(|c| nmt_root(square.column(c)))
            .collect::<Result<Vec<_>, _>>()?;

        let root = Root(data_root(&row_roots, &column_roots));
        debug!("[sq-02] committed {}x{} square: {}", size, size, root);

        Ok(Self {
            row_roots,
            column_roots,
            root,
        })
    }

    /// Dimension of the committed square.
    pub fn size(&self) -> usize {
        self.row_roots.len()
    }

    /// Proves shares `start_col..end_col` of `row` against the data root.
    pub fn prove_shares(
        &self,
        square: &Square,
        row: usize,
        start_col: usize,
        end_col: usize,
    ) -> Result<ShareProof, CommitmentError> {
        let shares = square.row(row).ok_or(CommitmentError::RangeOutOfBounds {
            start: row,
            end: row + 1,
            len: square.size(),
        })?;
        let leaves = leaf_nodes(shares)?;
        let row_proof = NmtRangeProof::generate(&leaves, start_col, end_col)?;

        let roots = self.serialized_roots();
        let root_proof =
            MerkleProof::generate(&roots, row).ok_or(CommitmentError::RangeOutOfBounds {
                start: row,
                end: row + 1,
                len: roots.len(),
            })?;

        Ok(ShareProof {
            row,
            row_root: self.row_roots[row],
            row_proof,
            root_proof,
        })
    }

    fn serialized_roots(&self) -> Vec<[u8; NAMESPACED_HASH_SIZE]> {
        self.row_roots
            .iter()
            .chain(self.column_roots.iter())
            .map(NamespacedHash::to_bytes)
            .collect()
    }
}

/// RFC-6962 root over `row_roots ‖ column_roots`.
pub fn data_root(row_roots: &[NamespacedHash], column_roots: &[NamespacedHash]) -> Hash {
    let items: Vec<[u8; NAMESPACED_HASH_SIZE]> = row_roots
        .iter()
        .chain(column_roots.iter())
        .map(NamespacedHash::to_bytes)
        .collect();
    merkle_root(&items)
}

/// Data root of `square`.
pub fn commit(square: &Square) -> Result<Root, CommitmentError> {
    SquareCommitment::compute(square).map(|c| c.root)
}
