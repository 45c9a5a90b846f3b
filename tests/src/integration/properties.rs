//! # Square Properties
//!
//! Property tests over arbitrary candidate sets:
//!
//! - **Determinism**: same candidates, any order, byte-identical square and root
//! - **Round-trip**: every built square validates
//! - **Padding**: `dimension²` shares, smallest permitted power of two
//! - **Budget**: gas and dimension stay within the budget

#[cfg(test)]
mod tests {
    use crate::fixtures::{pay_for_blobs, pooled, send};
    use proptest::prelude::*;
    use shared_types::ProtocolParams;
    use sq_02_commitment::commit;
    use sq_04_mempool::PooledTx;
    use sq_05_square_builder::{BlockBudget, SquareBuilder};
    use sq_06_proposal::{Proposal, ProposalValidator, Verdict};
    use std::sync::Arc;

    const TAGS: [&[u8]; 3] = [b"alpha", b"beta", b"gamma"];

    /// (signer, sequence, optional (namespace tag, blob length))
    type TxSpec = (u8, u64, Option<(usize, usize)>);

    fn tx_specs() -> impl Strategy<Value = Vec<TxSpec>> {
        prop::collection::vec(
            (
                0u8..6,
                0u64..3,
                prop::option::of((0usize..TAGS.len(), 1usize..6_000)),
            ),
            0..16,
        )
    }

    fn candidates(specs: &[TxSpec], params: &ProtocolParams) -> Vec<Arc<PooledTx>> {
        specs
            .iter()
            .enumerate()
            .map(|(arrival, (signer, sequence, blob))| {
                let raw = match blob {
                    None => send(*signer, *sequence),
                    Some((tag, len)) => pay_for_blobs(*signer, *sequence, &[(TAGS[*tag], *len)]),
                };
                pooled(raw, arrival as u64, params)
            })
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_build_is_order_independent(specs in tx_specs()) {
            let params = ProtocolParams::default();
            let builder = SquareBuilder::new(params.clone());
            let budget = BlockBudget::from_params(&params);

            let forward = candidates(&specs, &params);
            let mut backward = forward.clone();
            backward.reverse();

            let a = builder.build(&forward, &budget).unwrap();
            let b = builder.build(&backward, &budget).unwrap();

            prop_assert_eq!(a.raw_txs(), b.raw_txs());
            prop_assert_eq!(a.layout.square.shares(), b.layout.square.shares());
            prop_assert_eq!(commit(&a.layout.square).unwrap(), commit(&b.layout.square).unwrap());
        }

        #[test]
        fn prop_built_square_validates(specs in tx_specs()) {
            let params = ProtocolParams::default();
            let built = SquareBuilder::new(params.clone())
                .build(&candidates(&specs, &params), &BlockBudget::from_params(&params))
                .unwrap();

            let proposal = Proposal {
                height: 1,
                txs: built.raw_txs(),
                dimension: built.size(),
                data_root: commit(&built.layout.square).unwrap(),
            };
            prop_assert_eq!(ProposalValidator::new(params).validate(&proposal), Verdict::Valid);
        }

        #[test]
        fn prop_padding_reaches_power_of_two(specs in tx_specs()) {
            let params = ProtocolParams::default();
            let built = SquareBuilder::new(params.clone())
                .build(&candidates(&specs, &params), &BlockBudget::from_params(&params))
                .unwrap();
            let square = &built.layout.square;
            let size = square.size();

            prop_assert!(size.is_power_of_two());
            prop_assert!(size >= params.min_square_size);
            prop_assert_eq!(square.share_count(), size * size);
            prop_assert!(built.layout.used_shares <= size * size);
            // Never a size larger than needed.
            if size > params.min_square_size {
                prop_assert!(built.layout.used_shares > (size / 2) * (size / 2));
            }
        }

        #[test]
        fn prop_budget_is_respected(
            specs in tx_specs(),
            max_square_size in prop::sample::select(vec![2usize, 4, 8]),
            max_gas in 50_000u64..2_000_000,
        ) {
            let params = ProtocolParams::default();
            let budget = BlockBudget {
                max_gas,
                ..BlockBudget::from_params(&params).with_max_square_size(max_square_size)
            };
            let built = SquareBuilder::new(params.clone())
                .build(&candidates(&specs, &params), &budget)
                .unwrap();

            prop_assert!(built.gas_used <= max_gas);
            prop_assert!(built.size() <= max_square_size);
            let gas: u64 = built.txs.iter().map(|tx| tx.gas()).sum();
            prop_assert_eq!(gas, built.gas_used);
        }
    }
}
