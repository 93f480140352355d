//! Transaction coordinator for ID allocation and lifecycle metrics
//!
//! The database lock serializes writers, so the coordinator does no
//! conflict detection of its own. It hands out monotonically increasing
//! transaction IDs and counts how transactions end.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

/// Transaction coordinator for one database
///
/// # Memory Ordering
///
/// The metric counters use Relaxed ordering. They are observational only
/// and do not synchronize any other memory operations.
#[derive(Debug)]
pub struct TransactionCoordinator {
    /// Last allocated transaction ID
    next_txn_id: AtomicU64,
    /// Active transaction count
    active_count: AtomicU64,
    /// Total transactions started
    total_started: AtomicU64,
    /// Total transactions committed
    total_committed: AtomicU64,
    /// Total transactions aborted
    total_aborted: AtomicU64,
}

impl TransactionCoordinator {
    /// Create a coordinator with no history
    pub fn new() -> Self {
        Self {
            next_txn_id: AtomicU64::new(0),
            active_count: AtomicU64::new(0),
            total_started: AtomicU64::new(0),
            total_committed: AtomicU64::new(0),
            total_aborted: AtomicU64::new(0),
        }
    }

    /// Allocate an ID for a new transaction and record its start
    pub fn start_transaction(&self, writable: bool) -> u64 {
        let txn_id = self.next_txn_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.record_start();
        debug!(target: "containerdb::txn", txn_id, writable, "Transaction started");
        txn_id
    }

    /// Record transaction start
    pub fn record_start(&self) {
        self.active_count.fetch_add(1, Ordering::Relaxed);
        self.total_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record transaction commit
    ///
    /// Decrements active count (saturating at 0) and increments committed count.
    pub fn record_commit(&self) {
        self.finish();
        self.total_committed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record transaction abort
    ///
    /// Decrements active count (saturating at 0) and increments aborted count.
    pub fn record_abort(&self, txn_id: u64, reason: &str) {
        self.finish();
        self.total_aborted.fetch_add(1, Ordering::Relaxed);
        warn!(target: "containerdb::txn", txn_id, reason, "Transaction aborted");
    }

    fn finish(&self) {
        let _ = self
            .active_count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |x| {
                Some(x.saturating_sub(1))
            });
    }

    /// Get transaction metrics
    pub fn metrics(&self) -> TransactionMetrics {
        let started = self.total_started.load(Ordering::Relaxed);
        let committed = self.total_committed.load(Ordering::Relaxed);

        TransactionMetrics {
            active_count: self.active_count.load(Ordering::Relaxed),
            total_started: started,
            total_committed: committed,
            total_aborted: self.total_aborted.load(Ordering::Relaxed),
            commit_rate: if started > 0 {
                committed as f64 / started as f64
            } else {
                0.0
            },
        }
    }

    /// Get current active transaction count
    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }
}

impl Default for TransactionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of transaction statistics
#[derive(Debug, Clone)]
pub struct TransactionMetrics {
    /// Number of currently active transactions
    pub active_count: u64,
    /// Total number of transactions started
    pub total_started: u64,
    /// Total number of transactions committed
    pub total_committed: u64,
    /// Total number of transactions aborted
    pub total_aborted: u64,
    /// Commit success rate (committed / started)
    pub commit_rate: f64,
}

impl TransactionMetrics {
    /// Total transactions that completed (committed + aborted)
    pub fn total_completed(&self) -> u64 {
        self.total_committed + self.total_aborted
    }

    /// Abort rate (aborted / started)
    pub fn abort_rate(&self) -> f64 {
        if self.total_started > 0 {
            self.total_aborted as f64 / self.total_started as f64
        } else {
            0.0
        }
    }
}
