//! # Shared Types Crate
//!
//! Entities, the transaction model, protocol parameters and the error
//! taxonomy shared by every square-chain subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: cross-subsystem types are defined here.
//! - **Versioned Parameters**: everything that must agree across validators
//!   lives in [`ProtocolParams`] and is covered by its fingerprint.

pub mod entities;
pub mod errors;
pub mod params;
pub mod transactions;

pub use entities::*;
pub use errors::*;
pub use params::*;
pub use transactions::*;
