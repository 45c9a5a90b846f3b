//! # Commitment Subsystem
//!
//! **Subsystem ID:** 2
//!
//! ## Purpose
//!
//! Computes the cryptographic commitment over a data square and the finer
//! per-blob commitments used for inclusion proofs.
//!
//! ## Commitment Layers
//!
//! | Layer | Construction | Module |
//! |-------|--------------|--------|
//! | Row / column root | Namespaced Merkle tree over shares | `nmt` |
//! | Data root | RFC-6962 tree over row roots then column roots | `commitment` |
//! | Blob commitment | RFC-6962 over mountain-range NMT subtree roots | `blob` |
//! | Inclusion | NMT range proof + row-root Merkle proof | `proof` |
//!
//! ## Determinism
//!
//! Every function here is pure over share bytes. Row and column roots are
//! computed in parallel with `rayon`; the parallel collect preserves index
//! order so the result never depends on scheduling.

pub mod blob;
pub mod commitment;
pub mod errors;
pub mod merkle;
pub mod nmt;
pub mod proof;

pub use blob::{blob_commitment_at, commitment_from_shares, create_commitment};
pub use commitment::{commit, data_root, Root, SquareCommitment, COMMITMENT_VERSION};
pub use errors::CommitmentError;
pub use merkle::{merkle_root, MerkleProof, ProofNode, SiblingPosition};
pub use nmt::{nmt_root, NamespacedHash};
pub use proof::{NmtRangeProof, ShareProof};
