//! Per-proposal budget.

use shared_types::ProtocolParams;
use sq_01_shares::round_down_power_of_two;

/// Limits a single proposal must stay within.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockBudget {
    /// Maximum square dimension.
    pub max_square_size: usize,
    /// Maximum summed raw transaction bytes.
    pub max_bytes: u64,
    /// Maximum summed estimated gas.
    pub max_gas: u64,
}

impl BlockBudget {
    /// The protocol-wide budget.
    pub fn from_params(params: &ProtocolParams) -> Self {
        Self {
            max_square_size: params.max_square_size,
            max_bytes: params.max_block_bytes,
            max_gas: params.max_block_gas,
        }
    }

    /// Tightens the byte budget, e.g. to the consensus engine's request.
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = self.max_bytes.min(max_bytes);
        self
    }

    /// Tightens the square dimension.
    pub fn with_max_square_size(mut self, max_square_size: usize) -> Self {
        self.max_square_size = self.max_square_size.min(max_square_size);
        self
    }

    /// The dimension actually usable under `params`: a power of two, at
    /// most the protocol maximum and never below the protocol minimum.
    pub fn effective_square_size(&self, params: &ProtocolParams) -> usize {
        let capped = self.max_square_size.min(params.max_square_size).max(1);
        round_down_power_of_two(capped).max(params.min_square_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_square_size() {
        let params = ProtocolParams::default();
        let budget = BlockBudget::from_params(&params);
        assert_eq!(budget.effective_square_size(&params), 128);
        assert_eq!(budget.with_max_square_size(100).effective_square_size(&params), 64);
        assert_eq!(budget.with_max_square_size(1).effective_square_size(&params), 2);
    }

    #[test]
    fn test_with_max_bytes_only_tightens() {
        let budget = BlockBudget::from_params(&ProtocolParams::default());
        assert_eq!(budget.with_max_bytes(10).max_bytes, 10);
        assert_eq!(budget.with_max_bytes(u64::MAX).max_bytes, budget.max_bytes);
    }
}
