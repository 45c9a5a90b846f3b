//! # Integration Test Flows
//!
//! End-to-end flows across admission (sq-04), square building (sq-05),
//! commitment (sq-02) and the proposal service (sq-06).
//!
//! ## Flows Tested:
//!
//! 1. **CheckTx → PrepareProposal → ProcessProposal → FinalizeBlock** across two nodes
//! 2. **Malformed blobs**: rejected at admission, never in a square
//! 3. **Budget edges**: oversize-only pools produce the minimal padding square
//! 4. **Tampered claims**: a one-bit root change is a `RootMismatch`
//! 5. **FinalizeBlock**: every benchmark workload executes and drains the pool

#[cfg(test)]
mod tests {
    use crate::fixtures::{
        init_tracing, pay_for_blobs, pooled, send, tampered_pay_for_blobs, update_client,
        Workload,
    };
    use shared_types::{Classify, ErrorClass, ProtocolParams, TX_NAMESPACE};
    use sq_02_commitment::{commit, Root};
    use sq_04_mempool::{AdmissionError, AdmitOutcome};
    use sq_05_square_builder::{BlockBudget, SquareBuilder};
    use sq_06_proposal::{
        EstimatingStateMachine, HeightPhase, InvalidReason, NodeConfig, ProposalService, Verdict,
    };
    use std::sync::Arc;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn node(config: NodeConfig) -> Arc<ProposalService> {
        let sm = Arc::new(EstimatingStateMachine::new(config.params.clone()));
        Arc::new(ProposalService::new(config, sm).unwrap())
    }

    fn default_node() -> Arc<ProposalService> {
        node(NodeConfig::default())
    }

    // =============================================================================
    // FULL HEIGHT CYCLE
    // =============================================================================

    /// A proposer and a validator agree on a mixed block, and both pools drain.
    #[tokio::test]
    async fn test_two_nodes_agree_on_mixed_block() {
        init_tracing();
        let proposer = default_node();
        let validator = default_node();

        let txs = vec![
            send(1, 0),
            send(1, 1),
            update_client(2, 0, 50),
            pay_for_blobs(3, 0, &[(b"rollup-a", 3_000), (b"rollup-b", 200)]),
            pay_for_blobs(4, 0, &[(b"rollup-a", 70_000)]),
        ];
        for raw in &txs {
            assert!(matches!(
                proposer.check_tx(raw),
                Ok(AdmitOutcome::Accepted { .. })
            ));
            validator.check_tx(raw).unwrap();
        }

        let prepared = proposer.prepare_from_pool(1).await.unwrap();
        assert_eq!(prepared.txs.len(), txs.len());

        let verdict = validator.process_proposal(prepared.to_proposal()).await;
        assert_eq!(verdict, Verdict::Valid);
        assert_eq!(validator.phase(), HeightPhase::Accepted);

        for svc in [&proposer, &validator] {
            let response = svc
                .finalize_block(prepared.txs.clone(), 1, 1_700_000_000, [0; 32])
                .await
                .unwrap();
            assert_eq!(response.removed, txs.len());
            assert_eq!(svc.admission().status().pending_count, 0);
        }
    }

    /// CheckTx keeps running while a proposal is prepared; the proposal is
    /// still valid and the pool is not disturbed by building.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_check_tx_concurrent_with_prepare() {
        let svc = default_node();
        for i in 0..50u8 {
            svc.check_tx(&send(i, 0)).unwrap();
        }

        let admitting = {
            let svc = Arc::clone(&svc);
            tokio::spawn(async move {
                for i in 50..150u8 {
                    svc.check_tx(&send(i, 0)).unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };
        let prepared = svc.prepare_from_pool(1).await.unwrap();
        admitting.await.unwrap();

        assert!(prepared.txs.len() >= 50);
        assert_eq!(svc.admission().status().pending_count, 150);
        assert!(svc.process_proposal(prepared.to_proposal()).await.is_valid());
    }

    /// Every benchmark workload executes cleanly and leaves the pool empty.
    #[tokio::test]
    async fn test_finalize_executes_every_workload() {
        for workload in Workload::ALL {
            let svc = default_node();
            let txs = workload.generate(100);
            for raw in &txs {
                svc.check_tx(raw).unwrap();
            }

            let response = svc
                .finalize_block(txs.clone(), 1, 1_700_000_000, [0; 32])
                .await
                .unwrap();

            assert_eq!(response.results.len(), txs.len(), "{}", workload.name());
            assert!(response.results.iter().all(|r| r.is_ok()));
            let gas: u64 = response.results.iter().map(|r| r.gas_used).sum();
            assert_eq!(response.gas_used, gas);
            assert_eq!(response.removed, txs.len());
            assert_eq!(svc.admission().status().pending_count, 0);
            assert_eq!(svc.current_height(), 2);
        }
    }

    // =============================================================================
    // MALFORMED BLOBS
    // =============================================================================

    #[tokio::test]
    async fn test_malformed_blob_never_reaches_a_square() {
        let svc = default_node();
        let bad = tampered_pay_for_blobs(9, 0, 1_500);

        let err = svc.check_tx(&bad).unwrap_err();
        assert!(matches!(err, AdmissionError::Malformed(_)));
        assert_eq!(err.class(), ErrorClass::Malformed);

        // Even when the consensus engine hands it over directly.
        let prepared = svc
            .prepare_proposal(vec![send(1, 0), bad.clone()], u64::MAX, 1)
            .await
            .unwrap();
        assert_eq!(prepared.txs, vec![send(1, 0)]);
        assert!(!prepared.txs.contains(&bad));
    }

    #[tokio::test]
    async fn test_proposal_smuggling_malformed_blob_rejected() {
        let proposer = default_node();
        let validator = default_node();
        let mut proposal = proposer
            .prepare_proposal(vec![send(1, 0)], u64::MAX, 1)
            .await
            .unwrap()
            .to_proposal();
        proposal.txs.push(tampered_pay_for_blobs(2, 0, 600));

        assert!(matches!(
            validator.process_proposal(proposal).await,
            Verdict::Invalid(InvalidReason::MalformedBlobTx { index: 1, .. })
        ));
    }

    // =============================================================================
    // SQUARE SCENARIOS
    // =============================================================================

    /// One single-share transaction and a 2×2 maximum: the transaction at
    /// position 0, three padding shares, and a stable root.
    #[test]
    fn test_single_share_tx_in_two_by_two_square() {
        let params = ProtocolParams::default();
        let builder = SquareBuilder::new(params.clone());
        let budget = BlockBudget::from_params(&params).with_max_square_size(2);
        let tx = pooled(send(1, 0), 0, &params);

        let built = builder.build(&[tx], &budget).unwrap();
        let square = &built.layout.square;

        assert_eq!(square.size(), 2);
        assert_eq!(square.shares()[0].namespace(), TX_NAMESPACE);
        assert!(!square.shares()[0].is_padding());
        assert!(square.shares()[1..].iter().all(|s| s.is_padding()));
        assert_eq!(commit(square).unwrap(), commit(square).unwrap());
    }

    /// A pool holding only a transaction over the budget yields the minimum
    /// all-padding square.
    #[test]
    fn test_oversize_only_pool_yields_padding_square() {
        let params = ProtocolParams::default();
        let builder = SquareBuilder::new(params.clone());
        let big = pooled(pay_for_blobs(1, 0, &[(b"huge", 5_000)]), 0, &params);

        for budget in [
            BlockBudget::from_params(&params).with_max_square_size(2),
            BlockBudget {
                max_gas: big.gas() - 1,
                ..BlockBudget::from_params(&params)
            },
        ] {
            let built = builder.build(&[Arc::clone(&big)], &budget).unwrap();
            assert!(built.txs.is_empty());
            assert_eq!(built.skipped, vec![big.hash]);
            assert_eq!(built.size(), params.min_square_size);
            assert!(built.layout.square.shares().iter().all(|s| s.is_padding()));
        }
    }

    // =============================================================================
    // TAMPERED CLAIMS
    // =============================================================================

    #[tokio::test]
    async fn test_root_bit_flip_is_root_mismatch() {
        let proposer = default_node();
        let validator = default_node();
        let prepared = proposer
            .prepare_proposal(
                vec![send(1, 0), pay_for_blobs(2, 0, &[(b"ns", 4_000)])],
                u64::MAX,
                1,
            )
            .await
            .unwrap();

        for bit in [0u8, 3, 7] {
            let mut proposal = prepared.to_proposal();
            let mut root = *proposal.data_root.as_bytes();
            root[17] ^= 1 << bit;
            proposal.data_root = Root(root);
            assert!(matches!(
                validator.process_proposal(proposal).await,
                Verdict::Invalid(InvalidReason::RootMismatch { .. })
            ));
        }
        assert!(validator
            .process_proposal(prepared.to_proposal())
            .await
            .is_valid());
    }

    // =============================================================================
    // CONFIGURATION AGREEMENT
    // =============================================================================

    #[test]
    fn test_disagreeing_square_ceiling_is_fatal() {
        let a = default_node();
        let mut config = NodeConfig::default();
        config.params.max_square_size = 64;
        let b = node(config);

        let err = a
            .ensure_compatible(&b.config().params.fingerprint())
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::Fatal);
    }
}
