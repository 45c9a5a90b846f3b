//! # Proposal Subsystem
//!
//! **Subsystem ID:** 6
//!
//! ## Purpose
//!
//! The consensus-facing edge of the node: CheckTx, PrepareProposal,
//! ProcessProposal and FinalizeBlock, plus the validator that reconstructs a
//! proposal's square and compares it against the proposer's claims.
//!
//! ## Per-Height Flow
//!
//! ```text
//! Idle ──proposal──→ ProposalReceived ──→ Validating ──→ Accepted | Rejected
//!   ↑                                                          │
//!   └──────────────────── FinalizeBlock (next height) ─────────┘
//! ```
//!
//! ## Bounded Work
//!
//! | Call | Deadline | On expiry |
//! |------|----------|-----------|
//! | PrepareProposal | `prepare_deadline_ms` | Empty minimal square |
//! | ProcessProposal | `process_deadline_ms` | `Invalid(Timeout)` |
//!
//! A proposal for a height older than the newest one seen is `Invalid(Stale)`;
//! in-flight validation notices a newer height through its `CancelFlag`.
//!
//! ## Module Structure
//!
//! - `validator`: ProposalValidator
//! - `service`: ProposalService and `run_bounded`
//! - `state`: HeightPhase, HeightRound, HeightTracker, CancelFlag
//! - `proposal`: Proposal, PreparedProposal, Verdict, InvalidReason
//! - `ports/`: the StateMachine port
//! - `adapters/`: EstimatingStateMachine
//! - `config`, `metrics`, `error`

pub mod adapters;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod proposal;
pub mod service;
pub mod state;
pub mod validator;

pub use adapters::EstimatingStateMachine;
pub use config::NodeConfig;
pub use error::{ProposalError, Result};
pub use metrics::Metrics;
pub use ports::{BlockContext, StateMachine, TxResult, CODE_OK};
pub use proposal::{InvalidReason, PreparedProposal, Proposal, Verdict};
pub use service::{run_bounded, FinalizeResponse, ProposalService};
pub use state::{CancelFlag, HeightPhase, HeightRound, HeightTracker};
pub use validator::ProposalValidator;
