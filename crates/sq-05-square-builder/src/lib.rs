//! # Square Builder Subsystem
//!
//! **Subsystem ID:** 5
//!
//! ## Purpose
//!
//! Turns a set of admitted transactions into a data square: picks what fits
//! the block budget, then lays the picks out deterministically.
//!
//! ## Algorithm
//!
//! 1. Order candidates by (signer, sequence, arrival, hash)
//! 2. Greedily accept candidates whose inclusion keeps gas, bytes and the
//!    square share count within budget; skip the rest (and the signer's
//!    later sequences)
//! 3. Plan: compact TX and PAY_FOR_BLOB sections, then blobs stably sorted
//!    by namespace, each starting on its subtree-width boundary
//! 4. Place: write the shares, pad between blobs, tail-pad to the smallest
//!    power-of-two square
//!
//! Steps 3 and 4 are `construct`, which proposal validation re-runs on the
//! proposed transaction list.
//!
//! ## Module Structure
//!
//! - `budget`: BlockBudget
//! - `builder`: selection and SquareBuilder
//! - `layout`: the two-pass layout
//! - `errors`: BuildError

pub mod budget;
pub mod builder;
pub mod errors;
pub mod layout;

pub use budget::BlockBudget;
pub use builder::{BuiltSquare, SquareBuilder};
pub use errors::BuildError;
pub use layout::{
    blob_starts, construct, plan, square_size_for, BlobPlacement, LayoutPlan, SquareLayout, TxRef,
};
