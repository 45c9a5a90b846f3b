//! # Test Fixtures
//!
//! Transaction builders shared by integration tests and benchmarks.

use shared_types::{
    Address, Blob, BlobTx, ClientHeader, Message, Namespace, PlainTransaction, ProtocolParams,
};
use sq_03_cost_estimator::{pay_for_blobs_message, CostEstimator};
use sq_04_mempool::PooledTx;
use std::sync::{Arc, Once};

/// Gas limit and fee given to every fixture transaction.
pub const FIXTURE_GAS_LIMIT: u64 = 10_000_000;

/// Deterministic account address.
pub fn account(id: u8) -> Address {
    [id; 20]
}

/// Namespace for blob fixtures.
pub fn namespace(tag: &[u8]) -> Namespace {
    Namespace::v0(tag).expect("fixture namespace fits")
}

fn plain(signer: u8, sequence: u64, message: Message) -> PlainTransaction {
    PlainTransaction {
        signer: account(signer),
        sequence,
        gas_limit: FIXTURE_GAS_LIMIT,
        fee: FIXTURE_GAS_LIMIT,
        memo: String::new(),
        message,
    }
}

/// A transfer.
pub fn send(signer: u8, sequence: u64) -> Vec<u8> {
    send_with_fee(signer, sequence, FIXTURE_GAS_LIMIT)
}

/// A transfer paying `fee`.
pub fn send_with_fee(signer: u8, sequence: u64, fee: u64) -> Vec<u8> {
    PlainTransaction {
        fee,
        ..plain(
            signer,
            sequence,
            Message::Send {
                to: account(0xEE),
                amount: 1,
            },
        )
    }
    .encode()
    .expect("fixture transaction encodes")
}

/// A light-client update declaring `validators` validators.
pub fn update_client(signer: u8, sequence: u64, validators: usize) -> Vec<u8> {
    plain(
        signer,
        sequence,
        Message::UpdateClient {
            client_id: "07-tendermint-0".into(),
            header: ClientHeader {
                height: sequence + 1,
                validators: vec![[7; 32]; validators],
                signatures: Vec::new(),
            },
        },
    )
    .encode()
    .expect("fixture transaction encodes")
}

fn blobs_for(signer: u8, specs: &[(&[u8], usize)]) -> Vec<Blob> {
    specs
        .iter()
        .map(|(tag, len)| Blob::new(namespace(tag), vec![signer; *len]))
        .collect()
}

fn wrap_blobs(inner: &PlainTransaction, blobs: Vec<Blob>) -> Vec<u8> {
    BlobTx::new(inner, blobs)
        .and_then(|tx| tx.encode())
        .expect("fixture transaction encodes")
}

/// A blob transaction carrying one blob per `(namespace tag, length)`.
pub fn pay_for_blobs(signer: u8, sequence: u64, specs: &[(&[u8], usize)]) -> Vec<u8> {
    let blobs = blobs_for(signer, specs);
    let msg = pay_for_blobs_message(account(signer), &blobs, 64).expect("fixture blobs commit");
    wrap_blobs(&plain(signer, sequence, Message::PayForBlobs(msg)), blobs)
}

/// A blob transaction whose first declared commitment does not match its blob.
pub fn tampered_pay_for_blobs(signer: u8, sequence: u64, len: usize) -> Vec<u8> {
    let blobs = blobs_for(signer, &[(b"tamper", len)]);
    let mut msg =
        pay_for_blobs_message(account(signer), &blobs, 64).expect("fixture blobs commit");
    msg.share_commitments[0][0] ^= 0x01;
    wrap_blobs(&plain(signer, sequence, Message::PayForBlobs(msg)), blobs)
}

/// Wraps `raw` as a pooled transaction admitted at height 0.
pub fn pooled(raw: Vec<u8>, arrival: u64, params: &ProtocolParams) -> Arc<PooledTx> {
    let estimate = CostEstimator::new(params.clone())
        .estimate(&raw)
        .expect("fixture transaction prices");
    Arc::new(PooledTx::new(raw, estimate, arrival, 0))
}

/// Transaction shapes exercised by benchmarks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Workload {
    /// Small transfers
    Send,
    /// One 2 KiB blob each
    PayForBlobs,
    /// Light-client updates with 100 validators
    UpdateClient,
}

impl Workload {
    /// All workloads.
    pub const ALL: [Workload; 3] = [Self::Send, Self::PayForBlobs, Self::UpdateClient];

    /// Benchmark label.
    pub fn name(self) -> &'static str {
        match self {
            Self::Send => "send",
            Self::PayForBlobs => "pay_for_blobs",
            Self::UpdateClient => "update_client",
        }
    }

    /// One transaction from a distinct account per index.
    pub fn generate(self, count: usize) -> Vec<Vec<u8>> {
        (0..count)
            .map(|i| {
                let signer = (i % 250) as u8;
                let sequence = (i / 250) as u64;
                match self {
                    Self::Send => send(signer, sequence),
                    Self::PayForBlobs => pay_for_blobs(signer, sequence, &[(b"bench", 2_048)]),
                    Self::UpdateClient => update_client(signer, sequence, 100),
                }
            })
            .collect()
    }
}

/// Installs a `tracing` subscriber honouring `RUST_LOG`, once per process.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
