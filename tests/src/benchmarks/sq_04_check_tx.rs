//! # SQ-04 CheckTx Benchmarks
//!
//! Stateless admission (decode, estimate, blob commitment check) and the
//! full admit into a pool.

use crate::fixtures::Workload;
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use shared_types::ProtocolParams;
use sq_04_mempool::{AdmissionController, MempoolConfig};
use std::time::Duration;

/// Register CheckTx benchmarks
pub fn bench_check_tx(c: &mut Criterion) {
    let mut group = c.benchmark_group("sq-04-check-tx");
    group.measurement_time(Duration::from_secs(5));

    let controller = AdmissionController::new(ProtocolParams::default(), MempoolConfig::default());
    for workload in Workload::ALL {
        let raw = workload.generate(1).remove(0);
        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("check", workload.name()),
            &raw,
            |b, raw| b.iter(|| black_box(controller.check(raw).is_ok())),
        );
    }

    for workload in Workload::ALL {
        let txs = workload.generate(500);
        group.throughput(Throughput::Elements(txs.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("admit_500", workload.name()),
            &txs,
            |b, txs| {
                b.iter(|| {
                    let fresh = AdmissionController::new(
                        ProtocolParams::default(),
                        MempoolConfig::default(),
                    );
                    for raw in txs {
                        black_box(fresh.admit(raw, 1).is_ok());
                    }
                })
            },
        );
    }

    group.finish();
}
