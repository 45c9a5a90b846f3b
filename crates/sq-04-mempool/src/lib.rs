//! # Mempool Subsystem
//!
//! **Subsystem ID:** 4
//!
//! ## Purpose
//!
//! Admits priced transactions into a pending pool keyed by
//! (account, sequence) and hands proposers a deterministic snapshot of it.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | One entry per (account, sequence) | `domain/pool.rs` - `insert()` upsert |
//! | Idempotent re-submission | `admission.rs` fast path, `insert()` hash check |
//! | Highest priority wins, earlier arrival on ties | `PriorityKey::outranks` |
//! | Snapshots never mutate | `candidates()` under a read lock |
//!
//! ## Admission Pipeline
//!
//! ```text
//! raw ──size──→ estimate (sq-03) ──gas/fee──→ [write lock] upsert ──→ AdmitOutcome
//! ```
//!
//! ## Module Structure
//!
//! - `domain/`: PendingPool, PooledTx, priority value objects, AdmissionError
//! - `admission`: AdmissionController and the shared pool handle

pub mod admission;
pub mod domain;

pub use admission::{AdmissionController, AdmitResult, SharedPool};
pub use domain::*;
