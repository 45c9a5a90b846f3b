//! Per-height validation state and cancellation.
//!
//! A [`HeightRound`] lives for one height only; moving to another height
//! replaces it wholesale. [`HeightTracker`] records the newest height seen so
//! that work for an older height can notice it was superseded.

use crate::error::{ProposalError, Result};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Phase of proposal handling within one height.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HeightPhase {
    /// Nothing received yet
    Idle,
    /// A proposal arrived
    ProposalReceived,
    /// Reconstruction in progress
    Validating,
    /// Voted for
    Accepted,
    /// Refused
    Rejected,
}

impl HeightPhase {
    /// Whether `next` may follow `self`.
    ///
    /// A decided round may receive another proposal at the same height
    /// (a later consensus round).
    pub fn can_transition_to(self, next: HeightPhase) -> bool {
        use HeightPhase::*;
        matches!(
            (self, next),
            (Idle, ProposalReceived)
                | (ProposalReceived, Validating)
                | (ProposalReceived, Rejected)
                | (Validating, Accepted)
                | (Validating, Rejected)
                | (Accepted, ProposalReceived)
                | (Rejected, ProposalReceived)
                | (Accepted, Idle)
                | (Rejected, Idle)
        )
    }

    /// True once a verdict was reached.
    pub fn is_decided(self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

/// State of one height.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeightRound {
    height: u64,
    phase: HeightPhase,
}

impl HeightRound {
    /// A fresh, idle round.
    pub fn new(height: u64) -> Self {
        Self {
            height,
            phase: HeightPhase::Idle,
        }
    }

    /// Height of this round.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Current phase.
    pub fn phase(&self) -> HeightPhase {
        self.phase
    }

    /// Moves to `next`.
    ///
    /// # Errors
    /// `InvalidTransition` if `next` may not follow the current phase.
    pub fn transition(&mut self, next: HeightPhase) -> Result<()> {
        if !self.phase.can_transition_to(next) {
            return Err(ProposalError::InvalidTransition {
                height: self.height,
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }
}

/// The newest height this node has been asked about.
#[derive(Debug, Default)]
pub struct HeightTracker {
    current: AtomicU64,
}

impl HeightTracker {
    /// Starts at `height`.
    pub fn new(height: u64) -> Self {
        Self {
            current: AtomicU64::new(height),
        }
    }

    /// Newest height seen.
    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    /// Records `height`; never moves backwards. Returns the previous value.
    pub fn advance(&self, height: u64) -> u64 {
        self.current.fetch_max(height, Ordering::AcqRel)
    }

    /// True if a newer height than `height` has been seen.
    pub fn is_stale(&self, height: u64) -> bool {
        height < self.current()
    }

    /// A flag that trips when this tracker moves past `height`.
    pub fn cancel_flag(self: &Arc<Self>, height: u64) -> CancelFlag {
        CancelFlag {
            height,
            tracker: Some(Arc::clone(self)),
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Cooperative cancellation for one height's validation.
///
/// Checked between validation steps; tripping it never interrupts a step
/// midway, so no shared state is left half-written.
#[derive(Clone, Debug)]
pub struct CancelFlag {
    height: u64,
    tracker: Option<Arc<HeightTracker>>,
    aborted: Arc<AtomicBool>,
}

impl CancelFlag {
    /// A flag that never trips on its own.
    pub fn never() -> Self {
        Self {
            height: 0,
            tracker: None,
            aborted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Height the guarded work is for.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Trips the flag explicitly (deadline expired).
    pub fn cancel(&self) {
        self.aborted.store(true, Ordering::Release);
    }

    /// Newest height, if it has moved past ours.
    pub fn superseded_by(&self) -> Option<u64> {
        let current = self.tracker.as_ref()?.current();
        (current > self.height).then_some(current)
    }

    /// True if the work should stop.
    pub fn is_cancelled(&self) -> bool {
        self.aborted.load(Ordering::Acquire) || self.superseded_by().is_some()
    }
}
