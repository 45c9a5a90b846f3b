//! Consensus-facing proposal service.
//!
//! Wraps admission, square building and proposal validation behind the four
//! calls a consensus engine makes. Building and validation are CPU-bound and
//! run on the blocking pool under a wall-clock deadline.

use crate::config::NodeConfig;
use crate::error::{ProposalError, Result};
use crate::metrics::Metrics;
use crate::ports::{BlockContext, StateMachine, TxResult};
use crate::proposal::{InvalidReason, PreparedProposal, Proposal, Verdict};
use crate::state::{HeightPhase, HeightRound, HeightTracker};
use crate::validator::ProposalValidator;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_types::{tx_hash, Hash};
use sq_02_commitment::commit;
use sq_04_mempool::{AdmissionController, AdmitResult, PooledTx};
use sq_05_square_builder::{construct, BlockBudget, BuildError, BuiltSquare, SquareBuilder};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// Outcome of finalizing a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeResponse {
    /// Finalized height
    pub height: u64,
    /// Per-transaction results, in block order
    pub results: Vec<TxResult>,
    /// Summed gas reported by the state machine
    pub gas_used: u64,
    /// Included transactions removed from the pool
    pub removed: usize,
    /// Pool entries that expired at this height
    pub expired: usize,
}

/// Runs `work` on the blocking pool, giving up after `deadline`.
///
/// On timeout the work keeps running to completion in the background; it
/// must not hold anything the caller needs.
pub async fn run_bounded<T, F>(deadline: Duration, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    match tokio::time::timeout(deadline, tokio::task::spawn_blocking(work)).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(ProposalError::Worker(join.to_string())),
        Err(_) => Err(ProposalError::Timeout {
            deadline_ms: deadline.as_millis() as u64,
        }),
    }
}

/// The proposal service.
pub struct ProposalService {
    config: NodeConfig,
    admission: AdmissionController,
    builder: SquareBuilder,
    validator: ProposalValidator,
    state_machine: Arc<dyn StateMachine>,
    heights: Arc<HeightTracker>,
    round: Mutex<HeightRound>,
    metrics: Arc<Metrics>,
}

impl ProposalService {
    /// Create a new proposal service
    ///
    /// # Errors
    /// `Params` if the protocol parameters are inconsistent.
    pub fn new(config: NodeConfig, state_machine: Arc<dyn StateMachine>) -> Result<Self> {
        config.params.validate()?;

        info!("[sq-06] Initializing Proposal Service");
        info!(
            "  Square: {}..={}",
            config.params.min_square_size, config.params.max_square_size
        );
        info!("  Block gas: {}", config.params.max_block_gas);
        info!(
            "  Deadlines: prepare {}ms, process {}ms",
            config.prepare_deadline_ms, config.process_deadline_ms
        );

        let admission = AdmissionController::new(config.params.clone(), config.mempool.clone());
        Ok(Self {
            builder: SquareBuilder::new(config.params.clone()),
            validator: ProposalValidator::new(config.params.clone()),
            admission,
            state_machine,
            heights: Arc::new(HeightTracker::new(0)),
            round: Mutex::new(HeightRound::new(0)),
            metrics: Arc::new(Metrics::new()),
            config,
        })
    }

    /// Node configuration
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Shared metrics
    pub fn metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// The admission controller (and through it the pool)
    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    /// Newest height seen
    pub fn current_height(&self) -> u64 {
        self.heights.current()
    }

    /// Phase of the current height
    pub fn phase(&self) -> HeightPhase {
        self.round.lock().phase()
    }

    /// Compares protocol parameters with a peer's fingerprint.
    ///
    /// # Errors
    /// A fatal `Params(ConfigMismatch)` on disagreement.
    pub fn ensure_compatible(&self, remote: &Hash) -> Result<()> {
        Ok(self.config.params.ensure_compatible(remote)?)
    }

    /// CheckTx: admits a transaction at the current height.
    pub fn check_tx(&self, raw: &[u8]) -> AdmitResult {
        let result = self.admission.admit(raw, self.heights.current());
        self.metrics.record_check_tx(result.is_ok());
        result
    }

    /// PrepareProposal over candidates supplied by the consensus engine.
    ///
    /// Candidates failing stateless admission checks are dropped. On deadline
    /// or build failure the empty square is proposed instead.
    #[instrument(skip_all, fields(height = height, candidates = candidate_txs.len()))]
    pub async fn prepare_proposal(
        &self,
        candidate_txs: Vec<Vec<u8>>,
        max_bytes: u64,
        height: u64,
    ) -> Result<PreparedProposal> {
        self.enter_height(height)?;

        let admission = self.admission.clone();
        let builder = self.builder.clone();
        let budget = BlockBudget::from_params(&self.config.params).with_max_bytes(max_bytes);
        self.prepare_with(height, move || {
            let pooled: Vec<Arc<PooledTx>> = candidate_txs
                .into_iter()
                .enumerate()
                .filter_map(|(arrival, raw)| match admission.check(&raw) {
                    Ok(estimate) => Some(Arc::new(PooledTx::new(
                        raw,
                        estimate,
                        arrival as u64,
                        height,
                    ))),
                    Err(e) => {
                        debug!("[sq-06] dropping candidate {}: {}", arrival, e);
                        None
                    }
                })
                .collect();
            builder.build(&pooled, &budget)
        })
        .await
    }

    /// PrepareProposal over the pending pool. The pool is not modified.
    #[instrument(skip_all, fields(height = height))]
    pub async fn prepare_from_pool(&self, height: u64) -> Result<PreparedProposal> {
        self.enter_height(height)?;

        let pool = self.admission.pool();
        let builder = self.builder.clone();
        let budget = BlockBudget::from_params(&self.config.params);
        self.prepare_with(height, move || builder.build_from_pool(&pool, &budget))
            .await
    }

    /// ProcessProposal: reconstructs and votes.
    ///
    /// Never fails; every problem becomes an `Invalid` verdict.
    #[instrument(skip_all, fields(height = proposal.height, txs = proposal.txs.len()))]
    pub async fn process_proposal(&self, proposal: Proposal) -> Verdict {
        let height = proposal.height;
        if self.heights.is_stale(height) {
            let reason = InvalidReason::Stale {
                height,
                current: self.heights.current(),
            };
            info!("[sq-06] {}", reason);
            self.metrics.record_verdict(false);
            return Verdict::Invalid(reason);
        }
        self.heights.advance(height);

        if let Err(e) = self.begin_validation(height) {
            warn!("[sq-06] {}", e);
            self.metrics.record_verdict(false);
            return Verdict::Invalid(InvalidReason::Aborted(e.to_string()));
        }

        let cancel = self.heights.cancel_flag(height);
        let worker_cancel = cancel.clone();
        let validator = self.validator.clone();
        let deadline = self.config.process_deadline();
        let verdict = match run_bounded(deadline, move || {
            Ok(validator.validate_with(&proposal, &worker_cancel))
        })
        .await
        {
            Ok(verdict) => verdict,
            Err(ProposalError::Timeout { deadline_ms }) => {
                cancel.cancel();
                self.metrics.record_timeout();
                warn!("[sq-06] validation at height {} timed out", height);
                Verdict::Invalid(InvalidReason::Timeout { deadline_ms })
            }
            Err(e) => {
                error!("[sq-06] validation at height {} aborted: {}", height, e);
                Verdict::Invalid(InvalidReason::Aborted(e.to_string()))
            }
        };

        self.end_validation(height, &verdict);
        self.metrics.record_verdict(verdict.is_valid());
        verdict
    }

    /// FinalizeBlock: executes via the state machine and prunes the pool.
    ///
    /// # Errors
    /// `StateMachine` if execution fails or returns the wrong number of
    /// results; the pool is left untouched in that case.
    #[instrument(skip_all, fields(height = height, txs = txs.len()))]
    pub async fn finalize_block(
        &self,
        txs: Vec<Vec<u8>>,
        height: u64,
        time: u64,
        prev_hash: Hash,
    ) -> Result<FinalizeResponse> {
        let block = BlockContext {
            height,
            time,
            prev_hash,
        };
        let results = self.state_machine.execute_block(&block, &txs).await?;
        if results.len() != txs.len() {
            return Err(ProposalError::StateMachine(format!(
                "{} results for {} transactions",
                results.len(),
                txs.len()
            )));
        }

        let hashes: Vec<Hash> = txs.iter().map(|raw| tx_hash(raw)).collect();
        let removed = self.admission.remove_committed(&hashes).len();
        let expired = self.admission.evict_expired(height).len();

        let next = height.saturating_add(1);
        self.heights.advance(next);
        *self.round.lock() = HeightRound::new(next);
        self.metrics.record_finalized();

        let gas_used = results.iter().map(|r| r.gas_used).sum();
        let failed = results.iter().filter(|r| !r.is_ok()).count();
        info!(
            "[sq-06] finalized height {}: {} txs ({} failed), gas {}, removed {}, expired {}",
            height,
            txs.len(),
            failed,
            gas_used,
            removed,
            expired
        );

        Ok(FinalizeResponse {
            height,
            results,
            gas_used,
            removed,
            expired,
        })
    }

    /// The minimal proposal: no transactions, smallest square.
    pub fn empty_proposal(&self, height: u64) -> Result<PreparedProposal> {
        let layout = construct(&[], &self.config.params)?;
        let data_root = commit(&layout.square)?;
        Ok(PreparedProposal {
            height,
            txs: Vec::new(),
            dimension: layout.size(),
            data_root,
            gas_used: 0,
            block_bytes: 0,
        })
    }

    fn enter_height(&self, height: u64) -> Result<()> {
        if self.heights.is_stale(height) {
            return Err(ProposalError::Stale {
                height,
                current: self.heights.current(),
            });
        }
        self.heights.advance(height);
        Ok(())
    }

    async fn prepare_with<F>(&self, height: u64, build: F) -> Result<PreparedProposal>
    where
        F: FnOnce() -> std::result::Result<BuiltSquare, BuildError> + Send + 'static,
    {
        let deadline = self.config.prepare_deadline();
        let outcome = run_bounded(deadline, move || {
            let built = build()?;
            let data_root = commit(&built.layout.square)?;
            Ok(PreparedProposal {
                height,
                txs: built.raw_txs(),
                dimension: built.size(),
                data_root,
                gas_used: built.gas_used,
                block_bytes: built.bytes_used,
            })
        })
        .await;

        match outcome {
            Ok(prepared) => {
                self.metrics.record_prepared(prepared.dimension, false);
                info!(
                    "[sq-06] prepared height {}: {} txs, {}x{} square, root {}",
                    height,
                    prepared.txs.len(),
                    prepared.dimension,
                    prepared.dimension,
                    prepared.data_root
                );
                Ok(prepared)
            }
            Err(e) => {
                if matches!(e, ProposalError::Timeout { .. }) {
                    self.metrics.record_timeout();
                }
                warn!(
                    "[sq-06] prepare at height {} failed ({}), proposing empty square",
                    height, e
                );
                let empty = self.empty_proposal(height)?;
                self.metrics.record_prepared(empty.dimension, true);
                Ok(empty)
            }
        }
    }

    fn begin_validation(&self, height: u64) -> Result<()> {
        let mut round = self.round.lock();
        if round.height() != height {
            *round = HeightRound::new(height);
        }
        round.transition(HeightPhase::ProposalReceived)?;
        round.transition(HeightPhase::Validating)
    }

    fn end_validation(&self, height: u64, verdict: &Verdict) {
        let mut round = self.round.lock();
        // A newer height already replaced this round.
        if round.height() != height {
            return;
        }
        let next = if verdict.is_valid() {
            HeightPhase::Accepted
        } else {
            HeightPhase::Rejected
        };
        if let Err(e) = round.transition(next) {
            warn!("[sq-06] {}", e);
        }
    }
}
