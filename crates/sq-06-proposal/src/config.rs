//! Configuration types for the proposal service

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use shared_types::ProtocolParams;
use sq_04_mempool::MempoolConfig;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Default PrepareProposal deadline in milliseconds
pub const DEFAULT_PREPARE_DEADLINE_MS: u64 = 2_000;

/// Default ProcessProposal deadline in milliseconds
pub const DEFAULT_PROCESS_DEADLINE_MS: u64 = 2_000;

/// Runtime configuration for a node
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Consensus-critical parameters
    pub params: ProtocolParams,

    /// Pending pool settings
    pub mempool: MempoolConfig,

    /// Wall-clock budget for preparing a proposal
    pub prepare_deadline_ms: u64,

    /// Wall-clock budget for validating a proposal
    pub process_deadline_ms: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            params: ProtocolParams::default(),
            mempool: MempoolConfig::default(),
            prepare_deadline_ms: DEFAULT_PREPARE_DEADLINE_MS,
            process_deadline_ms: DEFAULT_PROCESS_DEADLINE_MS,
        }
    }
}

impl NodeConfig {
    /// Creates a config with short deadlines for testing
    pub fn for_testing() -> Self {
        Self {
            mempool: MempoolConfig::for_testing(),
            prepare_deadline_ms: 500,
            process_deadline_ms: 500,
            ..Self::default()
        }
    }

    /// Loads defaults, then the JSON file at `path` if given, then
    /// `SQ_*` environment overrides, and validates the result.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                Self::from_json(&text)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        info!(
            "[sq-06] config loaded: max square {}, fingerprint {}",
            config.params.max_square_size,
            hex::encode(&config.params.fingerprint()[..8])
        );
        Ok(config)
    }

    /// Parses a JSON config; missing fields take their defaults.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        serde_json::from_str(text).context("parsing config JSON")
    }

    /// Applies overrides from `lookup` (normally the process environment).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SQ_MAX_SQUARE_SIZE") {
            self.params.max_square_size = v.parse().context("SQ_MAX_SQUARE_SIZE")?;
        }
        if let Some(v) = lookup("SQ_MAX_BLOCK_GAS") {
            self.params.max_block_gas = v.parse().context("SQ_MAX_BLOCK_GAS")?;
        }
        if let Some(v) = lookup("SQ_MAX_TX_BYTES") {
            self.params.max_tx_bytes = v.parse().context("SQ_MAX_TX_BYTES")?;
        }
        if let Some(v) = lookup("SQ_TTL_BLOCKS") {
            self.mempool.ttl_blocks = v.parse().context("SQ_TTL_BLOCKS")?;
        }
        Ok(())
    }

    /// Checks parameters and node-local settings.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.params.validate()?;
        if self.prepare_deadline_ms == 0 || self.process_deadline_ms == 0 {
            bail!("proposal deadlines must be non-zero");
        }
        if self.mempool.max_transactions == 0 || self.mempool.max_per_account == 0 {
            bail!("mempool capacities must be non-zero");
        }
        Ok(())
    }

    /// PrepareProposal deadline
    pub fn prepare_deadline(&self) -> Duration {
        Duration::from_millis(self.prepare_deadline_ms)
    }

    /// ProcessProposal deadline
    pub fn process_deadline(&self) -> Duration {
        Duration::from_millis(self.process_deadline_ms)
    }
}
