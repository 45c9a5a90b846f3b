//! # Square-Chain Test Suite
//!
//! Unified test crate for cross-crate flows, property tests and benchmarks.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Transaction builders, tracing setup
//! ├── benchmarks/       # Criterion benchmarks per entry point
//! │   ├── sq_04_check_tx.rs
//! │   ├── sq_05_prepare.rs
//! │   ├── sq_06_finalize.rs
//! │   └── sq_06_process.rs
//! │
//! └── integration/      # Cross-crate flows and properties
//!     ├── flows.rs
//!     └── properties.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p sq-tests
//!
//! # By category
//! cargo test -p sq-tests integration::flows::
//! cargo test -p sq-tests integration::properties::
//!
//! # Benchmarks
//! cargo bench -p sq-tests
//! ```

pub mod benchmarks;
pub mod fixtures;
pub mod integration;
