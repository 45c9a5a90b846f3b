//! The cost estimator.
//!
//! ## Cost Model
//!
//! ```text
//! gas = tx_base_gas
//!     + raw_bytes × tx_size_gas_per_byte
//!     + sig_verify_gas
//!     + message gas
//! ```
//!
//! | Message | Gas |
//! |---------|-----|
//! | `Send` | `send_gas` |
//! | `PayForBlobs` | `blob_gas_per_byte × Σ share-padded blob bytes` |
//! | `UpdateClient` | `update_client_base_gas + update_client_gas_per_validator × validators` |
//!
//! The UpdateClient charge is linear in the validator count the header
//! declares, and the count is capped by `max_client_validators`. Estimating
//! never looks at chain or remote state; it is linear in the raw bytes.

use crate::blob_check::validate_blob_tx;
use crate::errors::CostError;
use shared_types::{decode_transaction, DecodedTx, Message, PlainTransaction, ProtocolParams};
use sq_01_shares::{
    compact_shares_needed, delimited_len, round_up_power_of_two, sparse_shares_needed,
    IndexWrapper, SHARE_SIZE,
};
use tracing::{debug, trace};

/// The estimated footprint of one transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TxCost {
    /// Raw transaction length.
    pub bytes: u64,
    /// Estimated compute weight.
    pub gas: u64,
    /// Bytes added to the compact share stream.
    pub compact_bytes: usize,
    /// Sparse share count of each attached blob.
    pub blob_shares: Vec<usize>,
    /// Worst-case share footprint on its own, alignment padding included.
    pub shares: usize,
}

/// A decoded transaction with its cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EstimatedTx {
    /// The decoded transaction.
    pub tx: DecodedTx,
    /// Its cost.
    pub cost: TxCost,
}

impl EstimatedTx {
    /// The fee-paying transaction.
    pub fn inner(&self) -> &PlainTransaction {
        self.tx.tx()
    }
}

/// Prices transactions under a fixed set of protocol parameters.
#[derive(Clone, Debug)]
pub struct CostEstimator {
    params: ProtocolParams,
}

impl CostEstimator {
    /// Creates an estimator.
    pub fn new(params: ProtocolParams) -> Self {
        Self { params }
    }

    /// Protocol parameters in use.
    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    /// Decodes and prices `raw`.
    ///
    /// # Errors
    /// `CostError` if the transaction is malformed.
    pub fn estimate(&self, raw: &[u8]) -> Result<EstimatedTx, CostError> {
        let result = decode_transaction(raw, self.params.max_tx_bytes)
            .map_err(CostError::from)
            .and_then(|tx| {
                let cost = self.estimate_decoded(raw.len(), &tx)?;
                Ok(EstimatedTx { tx, cost })
            });
        match &result {
            Ok(est) => trace!(
                bytes = est.cost.bytes,
                gas = est.cost.gas,
                shares = est.cost.shares,
                "[sq-03] estimated"
            ),
            Err(e) => debug!("[sq-03] unpriceable transaction: {}", e),
        }
        result
    }

    /// Prices an already-decoded transaction of `raw_len` bytes.
    pub fn estimate_decoded(&self, raw_len: usize, tx: &DecodedTx) -> Result<TxCost, CostError> {
        let schedule = &self.params.gas;
        let bytes = raw_len as u64;

        let message_gas = match tx {
            DecodedTx::Plain(plain) => self.plain_message_gas(plain)?,
            DecodedTx::Blob { inner, blobs, .. } => {
                validate_blob_tx(inner, blobs, self.params.subtree_root_threshold)?;
                let padded: u64 = blobs
                    .iter()
                    .map(|b| {
                        (sparse_shares_needed(b.data.len(), b.share_version) * SHARE_SIZE) as u64
                    })
                    .sum();
                schedule.blob_gas_per_byte.saturating_mul(padded)
            }
        };

        let gas = schedule
            .tx_base_gas
            .saturating_add(bytes.saturating_mul(schedule.tx_size_gas_per_byte))
            .saturating_add(schedule.sig_verify_gas)
            .saturating_add(message_gas);

        let (compact_bytes, blob_shares) = match tx {
            DecodedTx::Plain(_) => (delimited_len(raw_len), Vec::new()),
            DecodedTx::Blob {
                inner_bytes,
                blobs,
                ..
            } => {
                let wrapper = IndexWrapper::encoded_len(inner_bytes.len(), blobs.len());
                let shares = blobs
                    .iter()
                    .map(|b| sparse_shares_needed(b.data.len(), b.share_version))
                    .collect();
                (delimited_len(wrapper), shares)
            }
        };

        let shares = compact_shares_needed(compact_bytes)
            + blob_shares
                .iter()
                .map(|n| n + round_up_power_of_two(*n) - 1)
                .sum::<usize>();

        Ok(TxCost {
            bytes,
            gas,
            compact_bytes,
            blob_shares,
            shares,
        })
    }

    fn plain_message_gas(&self, tx: &PlainTransaction) -> Result<u64, CostError> {
        let schedule = &self.params.gas;
        match &tx.message {
            Message::Send { .. } => Ok(schedule.send_gas),
            Message::PayForBlobs(_) => Err(CostError::PayForBlobsWithoutBlobs),
            Message::UpdateClient { header, .. } => {
                let validators = header.validators.len();
                if validators == 0 {
                    return Err(CostError::EmptyValidatorSet);
                }
                if validators > self.params.max_client_validators {
                    return Err(CostError::TooManyValidators {
                        count: validators,
                        max: self.params.max_client_validators,
                    });
                }
                if header.signatures.len() > validators {
                    return Err(CostError::ExcessSignatures {
                        signatures: header.signatures.len(),
                        validators,
                    });
                }
                Ok(schedule.update_client_base_gas.saturating_add(
                    schedule
                        .update_client_gas_per_validator
                        .saturating_mul(validators as u64),
                ))
            }
        }
    }
}

/// Prices `raw` under `params`.
pub fn estimate(raw: &[u8], params: &ProtocolParams) -> Result<EstimatedTx, CostError> {
    CostEstimator::new(params.clone()).estimate(raw)
}
