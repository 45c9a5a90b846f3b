//! # Protocol Parameters
//!
//! Consensus-critical parameters. Every validator must run with identical
//! values for a given height; `fingerprint()` lets peers compare them and a
//! disagreement is reported as a fatal misconfiguration, never retried.

use crate::entities::{sha256, Hash};
use crate::errors::{Classify, ErrorClass};
use bincode::Options;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current commitment and layout scheme version.
pub const PROTOCOL_VERSION: u32 = 1;

/// Default minimum square dimension.
pub const DEFAULT_MIN_SQUARE_SIZE: usize = 2;

/// Default maximum square dimension.
pub const DEFAULT_MAX_SQUARE_SIZE: usize = 128;

/// Default blob alignment / commitment threshold.
pub const DEFAULT_SUBTREE_ROOT_THRESHOLD: usize = 64;

/// Default per-transaction byte ceiling (2 MiB).
pub const DEFAULT_MAX_TX_BYTES: u64 = 2 * 1024 * 1024;

/// Gas charged by the cost estimator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasSchedule {
    /// Flat cost of any transaction.
    pub tx_base_gas: u64,
    /// Cost per raw transaction byte.
    pub tx_size_gas_per_byte: u64,
    /// Cost per share-padded blob byte.
    pub blob_gas_per_byte: u64,
    /// Cost of verifying the sender signature.
    pub sig_verify_gas: u64,
    /// Flat cost of a transfer.
    pub send_gas: u64,
    /// Flat cost of a light-client update.
    pub update_client_base_gas: u64,
    /// Cost per validator in a light-client update header.
    pub update_client_gas_per_validator: u64,
}

impl Default for GasSchedule {
    fn default() -> Self {
        Self {
            tx_base_gas: 21_000,
            tx_size_gas_per_byte: 10,
            blob_gas_per_byte: 8,
            sig_verify_gas: 1_000,
            send_gas: 10_000,
            update_client_base_gas: 50_000,
            update_client_gas_per_validator: 1_000,
        }
    }
}

/// Consensus-critical configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolParams {
    /// Layout / commitment scheme version.
    pub version: u32,
    /// Smallest square dimension produced.
    pub min_square_size: usize,
    /// Largest square dimension accepted.
    pub max_square_size: usize,
    /// Blob alignment and commitment threshold.
    pub subtree_root_threshold: usize,
    /// Per-transaction byte ceiling.
    pub max_tx_bytes: u64,
    /// Per-transaction compute ceiling.
    pub max_tx_gas: u64,
    /// Per-proposal compute budget.
    pub max_block_gas: u64,
    /// Per-proposal byte budget.
    pub max_block_bytes: u64,
    /// Minimum fee per unit of gas.
    pub min_gas_price: u64,
    /// Largest validator set an UpdateClient header may declare.
    pub max_client_validators: usize,
    /// Gas schedule.
    pub gas: GasSchedule,
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            min_square_size: DEFAULT_MIN_SQUARE_SIZE,
            max_square_size: DEFAULT_MAX_SQUARE_SIZE,
            subtree_root_threshold: DEFAULT_SUBTREE_ROOT_THRESHOLD,
            max_tx_bytes: DEFAULT_MAX_TX_BYTES,
            max_tx_gas: 50_000_000,
            max_block_gas: 100_000_000,
            max_block_bytes: 8 * 1024 * 1024,
            min_gas_price: 1,
            max_client_validators: 500,
            gas: GasSchedule::default(),
        }
    }
}

/// Invalid or incompatible protocol parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// A square size that is zero or not a power of two.
    #[error("{field} must be a non-zero power of two, got {value}")]
    NotPowerOfTwo {
        /// Offending field.
        field: &'static str,
        /// Offending value.
        value: usize,
    },

    /// `min_square_size` above `max_square_size`.
    #[error("min_square_size {min} exceeds max_square_size {max}")]
    MinAboveMax {
        /// Minimum dimension.
        min: usize,
        /// Maximum dimension.
        max: usize,
    },

    /// A field that must be non-zero.
    #[error("{0} must be non-zero")]
    Zero(&'static str),

    /// Unsupported scheme version.
    #[error("unsupported protocol version {0}")]
    UnsupportedVersion(u32),

    /// Local and remote parameters disagree.
    #[error("protocol parameter mismatch: local {local}, remote {remote}")]
    ConfigMismatch {
        /// Local fingerprint (hex).
        local: String,
        /// Remote fingerprint (hex).
        remote: String,
    },
}

impl Classify for ParamsError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Fatal
    }
}

impl ProtocolParams {
    /// Checks internal consistency.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.version != PROTOCOL_VERSION {
            return Err(ParamsError::UnsupportedVersion(self.version));
        }
        for (field, value) in [
            ("min_square_size", self.min_square_size),
            ("max_square_size", self.max_square_size),
        ] {
            if !value.is_power_of_two() {
                return Err(ParamsError::NotPowerOfTwo { field, value });
            }
        }
        if self.min_square_size > self.max_square_size {
            return Err(ParamsError::MinAboveMax {
                min: self.min_square_size,
                max: self.max_square_size,
            });
        }
        if self.subtree_root_threshold == 0 {
            return Err(ParamsError::Zero("subtree_root_threshold"));
        }
        if self.max_tx_bytes == 0 {
            return Err(ParamsError::Zero("max_tx_bytes"));
        }
        if self.max_block_gas == 0 {
            return Err(ParamsError::Zero("max_block_gas"));
        }
        Ok(())
    }

    /// Maximum number of shares in a square.
    pub fn max_square_shares(&self) -> usize {
        self.max_square_size * self.max_square_size
    }

    /// SHA-256 over the canonical encoding of the parameters.
    pub fn fingerprint(&self) -> Hash {
        let encoded = bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .with_big_endian()
            .serialize(self)
            .unwrap_or_default();
        sha256(&encoded)
    }

    /// Compares against a peer's fingerprint.
    ///
    /// # Errors
    /// `ConfigMismatch` when the fingerprints differ. This is fatal.
    pub fn ensure_compatible(&self, remote: &Hash) -> Result<(), ParamsError> {
        let local = self.fingerprint();
        if &local != remote {
            tracing::error!(
                local = %hex::encode(local),
                remote = %hex::encode(remote),
                "protocol parameters disagree with peer"
            );
            return Err(ParamsError::ConfigMismatch {
                local: hex::encode(local),
                remote: hex::encode(remote),
            });
        }
        Ok(())
    }
}
