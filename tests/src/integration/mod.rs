//! # Integration Tests
//!
//! Cross-crate flows and square properties.

pub mod flows;
pub mod properties;
