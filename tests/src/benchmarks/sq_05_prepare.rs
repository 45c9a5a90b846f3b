//! # SQ-05 PrepareProposal Benchmarks
//!
//! Selection, two-pass layout and commitment over a pool snapshot. Candidates
//! are shuffled; the builder sorts them itself.

use crate::fixtures::{pooled, Workload};
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use rand::seq::SliceRandom;
use shared_types::ProtocolParams;
use sq_02_commitment::commit;
use sq_04_mempool::PooledTx;
use sq_05_square_builder::{BlockBudget, SquareBuilder};
use std::sync::Arc;
use std::time::Duration;

/// Register PrepareProposal benchmarks
pub fn bench_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("sq-05-prepare-proposal");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    let params = ProtocolParams::default();
    let builder = SquareBuilder::new(params.clone());
    let budget = BlockBudget::from_params(&params);

    for workload in Workload::ALL {
        for count in [10usize, 100, 1_000] {
            let mut candidates: Vec<Arc<PooledTx>> = workload
                .generate(count)
                .into_iter()
                .enumerate()
                .map(|(i, raw)| pooled(raw, i as u64, &params))
                .collect();
            candidates.shuffle(&mut rand::thread_rng());

            group.throughput(Throughput::Elements(count as u64));
            group.bench_with_input(
                BenchmarkId::new(workload.name(), count),
                &candidates,
                |b, candidates| {
                    b.iter(|| {
                        let built = builder.build(candidates, &budget).unwrap();
                        black_box(commit(&built.layout.square).unwrap())
                    })
                },
            );
        }
    }

    group.finish();
}
