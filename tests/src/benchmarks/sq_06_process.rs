//! # SQ-06 ProcessProposal Benchmarks
//!
//! Full reconstruction of an honest proposal: estimate every transaction,
//! lay the square out again and recompute the root.

use crate::fixtures::{pooled, Workload};
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use shared_types::ProtocolParams;
use sq_02_commitment::commit;
use sq_05_square_builder::{BlockBudget, SquareBuilder};
use sq_06_proposal::{Proposal, ProposalValidator};
use std::time::Duration;

fn honest_proposal(workload: Workload, count: usize, params: &ProtocolParams) -> Proposal {
    let candidates: Vec<_> = workload
        .generate(count)
        .into_iter()
        .enumerate()
        .map(|(i, raw)| pooled(raw, i as u64, params))
        .collect();
    let built = SquareBuilder::new(params.clone())
        .build(&candidates, &BlockBudget::from_params(params))
        .unwrap();
    Proposal {
        height: 1,
        txs: built.raw_txs(),
        dimension: built.size(),
        data_root: commit(&built.layout.square).unwrap(),
    }
}

/// Register ProcessProposal benchmarks
pub fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("sq-06-process-proposal");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    let params = ProtocolParams::default();
    let validator = ProposalValidator::new(params.clone());

    for workload in Workload::ALL {
        for count in [10usize, 100, 1_000] {
            let proposal = honest_proposal(workload, count, &params);
            group.throughput(Throughput::Elements(proposal.txs.len() as u64));
            group.bench_with_input(
                BenchmarkId::new(workload.name(), count),
                &proposal,
                |b, proposal| b.iter(|| black_box(validator.validate(proposal).is_valid())),
            );
        }
    }

    group.finish();
}
