//! # SQ-06 FinalizeBlock Benchmarks
//!
//! Execution of a decided block through the state machine port, followed by
//! pool pruning and the height advance. Includes a Send block filling
//! `max_block_bytes`.

use crate::fixtures::Workload;
use criterion::measurement::WallTime;
use criterion::{black_box, BenchmarkGroup, BenchmarkId, Criterion, Throughput};
use sq_06_proposal::{EstimatingStateMachine, NodeConfig, ProposalService};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

fn service() -> ProposalService {
    let config = NodeConfig::default();
    let sm = Arc::new(EstimatingStateMachine::new(config.params.clone()));
    ProposalService::new(config, sm).unwrap()
}

fn bench_block(
    group: &mut BenchmarkGroup<'_, WallTime>,
    rt: &Runtime,
    svc: &ProposalService,
    id: BenchmarkId,
    txs: Vec<Vec<u8>>,
) {
    group.throughput(Throughput::Elements(txs.len() as u64));
    group.bench_with_input(id, &txs, |b, txs| {
        b.iter(|| {
            let response = rt
                .block_on(svc.finalize_block(txs.clone(), 1, 1_700_000_000, [0; 32]))
                .unwrap();
            black_box(response.gas_used)
        })
    });
}

/// Register FinalizeBlock benchmarks
pub fn bench_finalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sq-06-finalize-block");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);

    let rt = Runtime::new().unwrap();
    let svc = service();

    for workload in Workload::ALL {
        for count in [1usize, 100, 1_000] {
            bench_block(
                &mut group,
                &rt,
                &svc,
                BenchmarkId::new(workload.name(), count),
                workload.generate(count),
            );
        }
    }

    let tx_len = Workload::Send.generate(1)[0].len() as u64;
    let full = (svc.config().params.max_block_bytes / tx_len) as usize;
    bench_block(
        &mut group,
        &rt,
        &svc,
        BenchmarkId::new("send_full_block", full),
        Workload::Send.generate(full),
    );

    group.finish();
}
