//! Candidate selection.
//!
//! Candidates are visited in (signer, sequence, arrival) order. Each one is
//! accepted only if the square it would produce still fits every budget;
//! a candidate that does not fit is skipped and the walk continues, so one
//! large blob cannot starve the smaller transactions behind it.

use crate::budget::BlockBudget;
use crate::errors::BuildError;
use crate::layout::{blob_starts, construct, SquareLayout, TxRef};
use shared_types::{Address, Hash, Namespace, ProtocolParams};
use sq_01_shares::compact_shares_needed;
use sq_04_mempool::{candidate_order, PooledTx, SequenceKey, SharedPool};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Running share count of a tentative selection.
///
/// Mirrors pass one of the layout exactly: compact stream lengths plus the
/// blob share counts kept in square order.
#[derive(Clone, Debug, Default)]
struct ShareSizer {
    tx_stream: usize,
    pfb_stream: usize,
    blobs: Vec<(Namespace, usize)>,
}

impl ShareSizer {
    fn used_shares(&self) -> usize {
        let reserved =
            compact_shares_needed(self.tx_stream) + compact_shares_needed(self.pfb_stream);
        blob_starts(reserved, self.blobs.iter().map(|(_, n)| *n)).1
    }

    /// Adds `tx`, returning the blob slots it took so it can be undone.
    fn push(&mut self, tx: &PooledTx) -> Vec<usize> {
        let cost = &tx.estimate.cost;
        let blobs = tx.estimate.tx.blobs();
        if blobs.is_empty() {
            self.tx_stream += cost.compact_bytes;
            return Vec::new();
        }
        self.pfb_stream += cost.compact_bytes;
        blobs
            .iter()
            .zip(&cost.blob_shares)
            .map(|(blob, shares)| {
                let at = self.blobs.partition_point(|(ns, _)| *ns <= blob.namespace);
                self.blobs.insert(at, (blob.namespace, *shares));
                at
            })
            .collect()
    }

    fn undo(&mut self, tx: &PooledTx, slots: Vec<usize>) {
        if slots.is_empty() {
            self.tx_stream -= tx.estimate.cost.compact_bytes;
            return;
        }
        self.pfb_stream -= tx.estimate.cost.compact_bytes;
        for at in slots.into_iter().rev() {
            self.blobs.remove(at);
        }
    }
}

/// A built square plus the transactions it holds.
#[derive(Clone, Debug)]
pub struct BuiltSquare {
    /// Selected transactions in proposal order: plain first, then blob txs.
    pub txs: Vec<Arc<PooledTx>>,
    /// The constructed square.
    pub layout: SquareLayout,
    /// Summed estimated gas.
    pub gas_used: u64,
    /// Summed raw bytes.
    pub bytes_used: u64,
    /// Candidates left out.
    pub skipped: Vec<Hash>,
}

impl BuiltSquare {
    /// Square dimension.
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    /// Raw transactions in proposal order.
    pub fn raw_txs(&self) -> Vec<Vec<u8>> {
        self.txs.iter().map(|tx| tx.raw.clone()).collect()
    }
}

/// Selects candidates and lays them out.
#[derive(Clone, Debug)]
pub struct SquareBuilder {
    params: ProtocolParams,
}

impl SquareBuilder {
    /// Creates a builder.
    pub fn new(params: ProtocolParams) -> Self {
        Self { params }
    }

    /// Protocol parameters in use.
    pub fn params(&self) -> &ProtocolParams {
        &self.params
    }

    /// Builds from a pool snapshot; the pool itself is never modified.
    pub fn build_from_pool(
        &self,
        pool: &SharedPool,
        budget: &BlockBudget,
    ) -> Result<BuiltSquare, BuildError> {
        let candidates = pool.read().candidates();
        self.build(&candidates, budget)
    }

    /// Selects from `candidates` and builds the square.
    ///
    /// The result depends only on the candidate set, never on the order it
    /// is passed in.
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub fn build(
        &self,
        candidates: &[Arc<PooledTx>],
        budget: &BlockBudget,
    ) -> Result<BuiltSquare, BuildError> {
        let square_size = budget.effective_square_size(&self.params);
        let max_shares = square_size * square_size;

        let mut ordered: Vec<&Arc<PooledTx>> = candidates.iter().collect();
        ordered.sort_by(|a, b| candidate_order(a, b));

        let mut sizer = ShareSizer::default();
        let mut plain = Vec::new();
        let mut with_blobs = Vec::new();
        let mut skipped = Vec::new();
        let mut gapped: HashSet<Address> = HashSet::new();
        let mut seen: HashSet<Hash> = HashSet::new();
        let mut taken: HashSet<SequenceKey> = HashSet::new();
        let mut gas_used = 0u64;
        let mut bytes_used = 0u64;

        for candidate in ordered {
            if !seen.insert(candidate.hash) {
                continue;
            }
            let signer = candidate.signer();
            if gapped.contains(&signer) || taken.contains(&candidate.key()) {
                skipped.push(candidate.hash);
                continue;
            }

            let gas = gas_used.saturating_add(candidate.gas());
            let bytes = bytes_used.saturating_add(candidate.bytes());
            let fits_budget = gas <= budget.max_gas && bytes <= budget.max_bytes;

            let slots = sizer.push(candidate);
            if !fits_budget || sizer.used_shares() > max_shares {
                sizer.undo(candidate, slots);
                // Later sequences of this signer would leave a gap.
                gapped.insert(signer);
                skipped.push(candidate.hash);
                debug!(
                    "[sq-05] skipped {} (gas {}, bytes {})",
                    hex::encode(&candidate.hash[..4]),
                    candidate.gas(),
                    candidate.bytes()
                );
                continue;
            }

            gas_used = gas;
            bytes_used = bytes;
            taken.insert(candidate.key());
            if candidate.estimate.tx.is_blob_tx() {
                with_blobs.push(Arc::clone(candidate));
            } else {
                plain.push(Arc::clone(candidate));
            }
        }

        let mut txs = plain;
        txs.extend(with_blobs);

        let params = ProtocolParams {
            max_square_size: square_size,
            ..self.params.clone()
        };
        let refs: Vec<TxRef<'_>> = txs
            .iter()
            .map(|tx| TxRef::new(&tx.raw, &tx.estimate.tx))
            .collect();
        let layout = construct(&refs, &params)?;

        info!(
            square_size = layout.size(),
            txs = txs.len(),
            skipped = skipped.len(),
            gas_used,
            "[sq-05] built square"
        );

        Ok(BuiltSquare {
            txs,
            layout,
            gas_used,
            bytes_used,
            skipped,
        })
    }
}
