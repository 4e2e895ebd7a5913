//! Published estimator state and position change notification.
//!
//! The estimator thread is the only writer. Readers take a full
//! [`EstimatorState`] copy under a read lock that is held only for the copy,
//! so a snapshot never mixes values from two different samples.
//!
//! Change notification is a revision counter bumped whenever the published
//! position differs from the previous one, and on every reset. A
//! [`PositionWatcher`] compares against the revision it last observed.

use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::estimator::EstimatorState;

/// State shared between the estimator thread and its readers.
#[derive(Debug)]
pub struct SharedEstimate {
    state: RwLock<EstimatorState>,
    /// Bumped on position change and on reset.
    revision: AtomicU64,
    /// Bumped on reset only.
    reset_epoch: AtomicU64,
}

/// Thread-safe handle to the shared estimate.
pub type SharedEstimateHandle = Arc<SharedEstimate>;

/// Result of a successful [`PositionWatcher::poll`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionUpdate {
    /// State at the time of the poll.
    pub state: EstimatorState,
    /// Revision the state was read at.
    pub revision: u64,
    /// True when at least one reset happened since the previous poll.
    pub reset: bool,
}

impl SharedEstimate {
    pub fn new(initial: EstimatorState) -> Self {
        Self {
            state: RwLock::new(initial),
            revision: AtomicU64::new(0),
            reset_epoch: AtomicU64::new(0),
        }
    }

    /// Consistent copy of the latest published state.
    pub fn snapshot(&self) -> EstimatorState {
        *self.state.read()
    }

    /// Current position revision.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Number of resets published so far.
    pub fn reset_epoch(&self) -> u64 {
        self.reset_epoch.load(Ordering::Acquire)
    }

    /// Publish the state after a sample.
    ///
    /// Returns true if the position changed and the revision was bumped.
    pub fn publish(&self, state: EstimatorState) -> bool {
        let mut guard = self.state.write();
        let moved = guard.position != state.position;
        *guard = state;
        if moved {
            self.revision.fetch_add(1, Ordering::Release);
        }
        moved
    }

    /// Publish the state after a reset. Always bumps the revision.
    pub fn publish_reset(&self, state: EstimatorState) {
        let mut guard = self.state.write();
        *guard = state;
        self.reset_epoch.fetch_add(1, Ordering::Release);
        self.revision.fetch_add(1, Ordering::Release);
    }

    /// Watcher that starts out having seen the current revision.
    pub fn watcher(self: &Arc<Self>) -> PositionWatcher {
        PositionWatcher {
            seen_revision: self.revision(),
            seen_epoch: self.reset_epoch(),
            shared: Arc::clone(self),
        }
    }
}

/// Consumer-side change detector for the published position.
///
/// Never misses a change; may report a change when the position ends up
/// where it was at the previous poll.
#[derive(Debug, Clone)]
pub struct PositionWatcher {
    shared: SharedEstimateHandle,
    seen_revision: u64,
    seen_epoch: u64,
}

impl PositionWatcher {
    /// True if the position changed since the last [`poll`](Self::poll).
    pub fn has_changed(&self) -> bool {
        self.shared.revision() != self.seen_revision
    }

    /// Mark the current revision as observed and return the state if it
    /// changed since the previous poll.
    pub fn poll(&mut self) -> Option<PositionUpdate> {
        let revision = self.shared.revision();
        if revision == self.seen_revision {
            return None;
        }
        let epoch = self.shared.reset_epoch();
        let state = self.shared.snapshot();

        let reset = epoch != self.seen_epoch;
        self.seen_revision = revision;
        self.seen_epoch = epoch;

        Some(PositionUpdate {
            state,
            revision,
            reset,
        })
    }

    /// Latest published state regardless of revision.
    pub fn snapshot(&self) -> EstimatorState {
        self.shared.snapshot()
    }
}
