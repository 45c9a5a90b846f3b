//! # Square-Chain Proposal Benchmarks
//!
//! | Entry point | Work measured |
//! |-------------|---------------|
//! | CheckTx | Decode, estimate, blob commitment check, pool upsert |
//! | PrepareProposal | Selection, layout, row/column roots, data root |
//! | ProcessProposal | Re-estimation, layout, data root comparison |
//! | FinalizeBlock | State machine execution, pool pruning, height advance |

use criterion::{criterion_group, criterion_main};
use sq_tests::benchmarks::{
    sq_04_check_tx::bench_check_tx, sq_05_prepare::bench_prepare, sq_06_finalize::bench_finalize,
    sq_06_process::bench_process,
};

criterion_group!(
    benches,
    bench_check_tx,
    bench_prepare,
    bench_process,
    bench_finalize
);
criterion_main!(benches);
