//! # Square-Chain Benchmarks
//!
//! Criterion benchmarks for the four consensus-time entry points, each over
//! Send, PayForBlobs and UpdateClient workloads.

pub mod sq_04_check_tx;
pub mod sq_05_prepare;
pub mod sq_06_finalize;
pub mod sq_06_process;
