//! Proposal re-validation.
//!
//! A proposal is valid iff laying out its transaction list exactly as given
//! reproduces the claimed dimension and data root. Selection is not re-run:
//! the proposer already chose, the validator only checks the result.

use crate::proposal::{InvalidReason, Proposal, Verdict};
use crate::state::CancelFlag;
use shared_types::{DecodeError, DecodedTx, ProtocolParams};
use sq_02_commitment::commit;
use sq_03_cost_estimator::{CostError, CostEstimator};
use sq_05_square_builder::{construct, square_size_for, BuildError, TxRef};
use tracing::{debug, info, instrument};

/// Transactions estimated between cancellation checks.
const CANCEL_CHECK_INTERVAL: usize = 64;

/// Reconstructs proposals and compares them against their claims.
#[derive(Clone, Debug)]
pub struct ProposalValidator {
    estimator: CostEstimator,
}

impl ProposalValidator {
    /// Creates a validator.
    pub fn new(params: ProtocolParams) -> Self {
        Self {
            estimator: CostEstimator::new(params),
        }
    }

    /// Protocol parameters in use.
    pub fn params(&self) -> &ProtocolParams {
        self.estimator.params()
    }

    /// Validates without cancellation.
    pub fn validate(&self, proposal: &Proposal) -> Verdict {
        self.validate_with(proposal, &CancelFlag::never())
    }

    /// Validates, giving up with `Stale` once `cancel` trips.
    ///
    /// Never panics on adversarial input; every failure is a verdict.
    #[instrument(skip_all, fields(height = proposal.height, txs = proposal.txs.len()))]
    pub fn validate_with(&self, proposal: &Proposal, cancel: &CancelFlag) -> Verdict {
        match self.reconstruct(proposal, cancel) {
            Ok(()) => {
                debug!(
                    dimension = proposal.dimension,
                    "[sq-06] proposal reconstructed"
                );
                Verdict::Valid
            }
            Err(reason) => {
                info!(class = ?reason.class(), "[sq-06] proposal rejected: {}", reason);
                Verdict::Invalid(reason)
            }
        }
    }

    fn reconstruct(&self, proposal: &Proposal, cancel: &CancelFlag) -> Result<(), InvalidReason> {
        let params = self.params();

        if proposal.dimension > params.max_square_size {
            return Err(InvalidReason::OversizeSquare {
                dimension: proposal.dimension,
                max: params.max_square_size,
            });
        }

        let bytes = proposal.block_bytes();
        if bytes > params.max_block_bytes {
            return Err(InvalidReason::BudgetExceeded {
                resource: "bytes",
                used: bytes,
                limit: params.max_block_bytes,
            });
        }

        let mut decoded: Vec<DecodedTx> = Vec::with_capacity(proposal.txs.len());
        let mut gas = 0u64;
        for (index, raw) in proposal.txs.iter().enumerate() {
            if index % CANCEL_CHECK_INTERVAL == 0 {
                check_cancelled(cancel, proposal.height)?;
            }
            let estimate = self
                .estimator
                .estimate(raw)
                .map_err(|e| rejected_tx(index, &e))?;
            if estimate.cost.gas > params.max_tx_gas {
                return Err(InvalidReason::BudgetExceeded {
                    resource: "tx gas",
                    used: estimate.cost.gas,
                    limit: params.max_tx_gas,
                });
            }
            gas = gas.saturating_add(estimate.cost.gas);
            decoded.push(estimate.tx);
        }
        if gas > params.max_block_gas {
            return Err(InvalidReason::BudgetExceeded {
                resource: "gas",
                used: gas,
                limit: params.max_block_gas,
            });
        }

        check_cancelled(cancel, proposal.height)?;
        let refs: Vec<TxRef<'_>> = proposal
            .txs
            .iter()
            .zip(&decoded)
            .map(|(raw, tx)| TxRef::new(raw, tx))
            .collect();
        let layout = construct(&refs, params).map_err(|e| layout_failure(e, params))?;

        let actual = layout.size();
        if actual != proposal.dimension {
            return Err(InvalidReason::DimensionMismatch {
                claimed: proposal.dimension,
                actual,
            });
        }

        check_cancelled(cancel, proposal.height)?;
        let root = commit(&layout.square).map_err(|e| InvalidReason::LayoutFailed(e.to_string()))?;
        if root != proposal.data_root {
            return Err(InvalidReason::RootMismatch {
                claimed: proposal.data_root,
                actual: root,
            });
        }
        Ok(())
    }
}

fn check_cancelled(cancel: &CancelFlag, height: u64) -> Result<(), InvalidReason> {
    if cancel.is_cancelled() {
        return Err(InvalidReason::Stale {
            height,
            current: cancel.superseded_by().unwrap_or(height),
        });
    }
    Ok(())
}

/// True for failures specific to blob-carrying transactions.
fn is_blob_defect(err: &CostError) -> bool {
    match err {
        CostError::Decode(e) => matches!(
            e,
            DecodeError::InnerNotPlain | DecodeError::MissingPayForBlobs | DecodeError::NoBlobs
        ),
        CostError::PayForBlobsWithoutBlobs
        | CostError::BlobCountMismatch { .. }
        | CostError::SignerMismatch
        | CostError::InvalidNamespace { .. }
        | CostError::NamespaceMismatch { .. }
        | CostError::BlobSizeMismatch { .. }
        | CostError::ShareVersionMismatch { .. }
        | CostError::BlobSignerMismatch { .. }
        | CostError::BlobCommitmentMismatch { .. }
        | CostError::Commitment(_) => true,
        CostError::TooManyValidators { .. }
        | CostError::EmptyValidatorSet
        | CostError::ExcessSignatures { .. } => false,
    }
}

fn rejected_tx(index: usize, err: &CostError) -> InvalidReason {
    let reason = err.to_string();
    if is_blob_defect(err) {
        InvalidReason::MalformedBlobTx { index, reason }
    } else {
        InvalidReason::MalformedTx { index, reason }
    }
}

fn layout_failure(err: BuildError, params: &ProtocolParams) -> InvalidReason {
    match err {
        BuildError::SquareTooLarge { needed, max, .. } => InvalidReason::OversizeSquare {
            dimension: square_size_for(needed, params.min_square_size),
            max,
        },
        BuildError::PlainAfterBlob { index } => InvalidReason::MalformedTx {
            index,
            reason: err.to_string(),
        },
        other => InvalidReason::LayoutFailed(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{Blob, BlobTx, ClientHeader, Message, Namespace, PlainTransaction};
    use sq_02_commitment::Root;
    use sq_03_cost_estimator::pay_for_blobs_message;
    use std::sync::Arc;

    fn plain(signer: u8, message: Message) -> PlainTransaction {
        PlainTransaction {
            signer: [signer; 20],
            sequence: 0,
            gas_limit: 10_000_000,
            fee: 10_000_000,
            memo: String::new(),
            message,
        }
    }

    fn send(signer: u8) -> Vec<u8> {
        plain(
            signer,
            Message::Send {
                to: [0xEE; 20],
                amount: 5,
            },
        )
        .encode()
        .unwrap()
    }

    fn blob_tx(signer: u8, ns: &[u8], len: usize) -> Vec<u8> {
        let blobs = vec![Blob::new(Namespace::v0(ns).unwrap(), vec![signer; len])];
        let msg = pay_for_blobs_message([signer; 20], &blobs, 64).unwrap();
        BlobTx::new(&plain(signer, Message::PayForBlobs(msg)), blobs).unwrap().encode().unwrap()
    }

    /// Honest proposal over `txs` in the given order.
    fn propose(txs: Vec<Vec<u8>>, params: &ProtocolParams) -> Proposal {
        let estimator = CostEstimator::new(params.clone());
        let decoded: Vec<DecodedTx> = txs
            .iter()
            .map(|raw| estimator.estimate(raw).unwrap().tx)
            .collect();
        let refs: Vec<TxRef<'_>> = txs
            .iter()
            .zip(&decoded)
            .map(|(raw, tx)| TxRef::new(raw, tx))
            .collect();
        let layout = construct(&refs, params).unwrap();
        let data_root = commit(&layout.square).unwrap();
        Proposal {
            height: 1,
            dimension: layout.size(),
            data_root,
            txs,
        }
    }

    fn validator() -> ProposalValidator {
        ProposalValidator::new(ProtocolParams::default())
    }

    #[test]
    fn test_honest_proposal_valid() {
        let params = ProtocolParams::default();
        let proposal = propose(
            vec![send(1), send(2), blob_tx(3, b"zz", 900), blob_tx(4, b"aa", 40)],
            &params,
        );
        assert_eq!(validator().validate(&proposal), Verdict::Valid);
    }

    #[test]
    fn test_empty_proposal_valid() {
        let proposal = propose(Vec::new(), &ProtocolParams::default());
        assert_eq!(proposal.dimension, 2);
        assert!(validator().validate(&proposal).is_valid());
    }

    #[test]
    fn test_root_bit_flip_rejected() {
        let mut proposal = propose(vec![send(1)], &ProtocolParams::default());
        let mut bytes = proposal.data_root.0;
        bytes[31] ^= 0x01;
        proposal.data_root = Root(bytes);

        assert!(matches!(
            validator().validate(&proposal),
            Verdict::Invalid(InvalidReason::RootMismatch { .. })
        ));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut proposal = propose(vec![send(1)], &ProtocolParams::default());
        proposal.dimension = 4;
        assert_eq!(
            validator().validate(&proposal),
            Verdict::Invalid(InvalidReason::DimensionMismatch {
                claimed: 4,
                actual: 2
            })
        );
    }

    #[test]
    fn test_claimed_dimension_over_max() {
        let mut proposal = propose(vec![send(1)], &ProtocolParams::default());
        proposal.dimension = 256;
        assert_eq!(
            validator().validate(&proposal),
            Verdict::Invalid(InvalidReason::OversizeSquare {
                dimension: 256,
                max: 128
            })
        );
    }

    #[test]
    fn test_content_over_max_square() {
        let roomy = ProtocolParams::default();
        let mut proposal = propose(vec![blob_tx(1, b"big", 10_000)], &roomy);
        assert_eq!(proposal.dimension, 8);

        let tight = ProposalValidator::new(ProtocolParams {
            max_square_size: 4,
            ..ProtocolParams::default()
        });
        let expected = Verdict::Invalid(InvalidReason::OversizeSquare {
            dimension: 8,
            max: 4,
        });
        assert_eq!(tight.validate(&proposal), expected);

        // Understating the dimension does not get past layout.
        proposal.dimension = 4;
        assert_eq!(tight.validate(&proposal), expected);
    }

    #[test]
    fn test_bad_blob_commitment_rejected() {
        let params = ProtocolParams::default();
        let mut proposal = propose(vec![send(1)], &params);

        let blobs = vec![Blob::new(Namespace::v0(b"x").unwrap(), vec![1; 600])];
        let mut msg = pay_for_blobs_message([2; 20], &blobs, 64).unwrap();
        msg.share_commitments[0][0] ^= 0xFF;
        let bad = BlobTx::new(&plain(2, Message::PayForBlobs(msg)), blobs).unwrap();
        proposal.txs.push(bad.encode().unwrap());

        assert!(matches!(
            validator().validate(&proposal),
            Verdict::Invalid(InvalidReason::MalformedBlobTx { index: 1, .. })
        ));
    }

    #[test]
    fn test_undecodable_tx_rejected() {
        let mut proposal = propose(vec![send(1)], &ProtocolParams::default());
        proposal.txs.insert(0, b"garbage!".to_vec());
        assert!(matches!(
            validator().validate(&proposal),
            Verdict::Invalid(InvalidReason::MalformedTx { index: 0, .. })
        ));
    }

    #[test]
    fn test_plain_after_blob_rejected() {
        let params = ProtocolParams::default();
        let mut proposal = propose(vec![blob_tx(1, b"a", 10)], &params);
        proposal.txs.push(send(2));
        assert!(matches!(
            validator().validate(&proposal),
            Verdict::Invalid(InvalidReason::MalformedTx { index: 1, .. })
        ));
    }

    #[test]
    fn test_gas_budget_exceeded() {
        let header = ClientHeader {
            height: 9,
            validators: vec![[1; 32]; 200],
            signatures: Vec::new(),
        };
        let update = plain(
            1,
            Message::UpdateClient {
                client_id: "07-tendermint-0".into(),
                header,
            },
        )
        .encode()
        .unwrap();
        let params = ProtocolParams::default();
        let proposal = propose(vec![update, send(2)], &params);

        let tight = ProtocolParams {
            max_block_gas: 100_000,
            ..ProtocolParams::default()
        };
        assert!(matches!(
            ProposalValidator::new(tight).validate(&proposal),
            Verdict::Invalid(InvalidReason::BudgetExceeded { .. })
        ));
    }

    #[test]
    fn test_cancelled_validation_is_stale() {
        use crate::state::HeightTracker;

        let tracker = Arc::new(HeightTracker::new(1));
        let flag = tracker.cancel_flag(1);
        tracker.advance(2);

        let proposal = propose(vec![send(1)], &ProtocolParams::default());
        assert_eq!(
            validator().validate_with(&proposal, &flag),
            Verdict::Invalid(InvalidReason::Stale {
                height: 1,
                current: 2
            })
        );
    }

    #[test]
    fn test_validation_is_repeatable() {
        let proposal = propose(
            vec![send(1), blob_tx(2, b"q", 2_000)],
            &ProtocolParams::default(),
        );
        let v = validator();
        assert_eq!(v.validate(&proposal), v.validate(&proposal));
    }
}
