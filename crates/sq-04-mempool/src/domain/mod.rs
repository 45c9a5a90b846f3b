//! # Domain Layer - Mempool Subsystem
//!
//! ## Components
//!
//! - `entities`: PooledTx, MempoolConfig, candidate ordering
//! - `pool`: PendingPool with sequence, priority and account indices
//! - `value_objects`: GasPrice, PriorityKey, PoolStatus
//! - `errors`: AdmissionError enumeration

pub mod entities;
pub mod errors;
pub mod pool;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use pool::*;
pub use value_objects::*;
