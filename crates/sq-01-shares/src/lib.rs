//! # Shares Subsystem
//!
//! **Subsystem ID:** 1
//!
//! ## Purpose
//!
//! Defines the fixed-size share, the unit every transaction and blob is cut
//! into, and the square matrix those shares are arranged in.
//!
//! ## Share Layout
//!
//! ```text
//! ┌───────────────┬──────┬──────────────┬──────────┬────────┬──────────────┐
//! │ namespace(29) │ info │ seq_len(4)*  │ reserved │ signer │ payload      │
//! │               │ (1)  │ start only   │ (4) comp │ (20)** │              │
//! └───────────────┴──────┴──────────────┴──────────┴────────┴──────────────┘
//!   *  only on the first share of a sequence
//!   ** only on the first share of a share-version-1 blob
//! ```
//!
//! `info = share_version << 1 | sequence_start`.
//!
//! | Kind | Namespaces | Content |
//! |------|-----------|---------|
//! | Compact | `TX`, `PAY_FOR_BLOB` | `uvarint(len) ‖ unit` stream, reserved = first unit offset |
//! | Sparse | user namespaces | raw blob bytes |
//! | Padding | any | `seq_len = 0`, zero filled |
//!
//! ## Module Structure
//!
//! - `share`: the `Share` type, `InfoByte`, size constants
//! - `compact`: compact splitter and parser
//! - `sparse`: blob splitter and parser
//! - `padding`: the three padding share kinds
//! - `index_wrapper`: the PayForBlobs unit pointing at blob start shares
//! - `alignment`: power-of-two helpers and blob subtree alignment
//! - `square`: the `Square` matrix
//! - `varint`: unsigned varint used for compact unit prefixes

pub mod alignment;
pub mod compact;
pub mod errors;
pub mod index_wrapper;
pub mod padding;
pub mod share;
pub mod sparse;
pub mod square;
pub mod varint;

pub use alignment::*;
pub use compact::*;
pub use errors::*;
pub use index_wrapper::*;
pub use padding::*;
pub use share::*;
pub use sparse::*;
pub use square::*;
