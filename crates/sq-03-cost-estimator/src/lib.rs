//! # Cost Estimator Subsystem
//!
//! **Subsystem ID:** 3
//!
//! ## Purpose
//!
//! Produces a bounded `(bytes, gas)` cost for a raw transaction without
//! executing it, and rejects blob transactions whose declared share
//! commitments do not match their payloads.
//!
//! ## Guarantees
//!
//! | Property | Enforcement |
//! |----------|-------------|
//! | Pure | No I/O, no shared state; a function of bytes and `ProtocolParams` |
//! | Bounded | Decoding capped at `max_tx_bytes`, validator sets capped at `max_client_validators` |
//! | Blob integrity | `blob_check::validate_blob_tx` recomputes every share commitment |

pub mod blob_check;
pub mod errors;
pub mod estimator;

pub use blob_check::{pay_for_blobs_message, validate_blob_tx};
pub use errors::CostError;
pub use estimator::{estimate, CostEstimator, EstimatedTx, TxCost};
