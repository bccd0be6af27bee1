//! Per-report mutation locks.
//!
//! Every state transition on a report happens under that report's lock, so
//! two concurrent resolve attempts serialize: exactly one commits, the other
//! re-reads the status and observes the resolved state. The lock registry is
//! distinct from the hub's subscriber registry.

use civica_types::ReportId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

/// Keyed registry of per-report async mutexes.
pub struct ReportLocks {
    inner: Mutex<HashMap<ReportId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ReportLocks {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the lock for one report, creating it on first use.
    ///
    /// The registry mutex is released before awaiting, so contention on one
    /// report never blocks lookups for another.
    pub async fn acquire(&self, id: ReportId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut registry = self.inner.lock().expect("lock registry poisoned");
            registry
                .entry(id)
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Drop lock entries nobody currently holds or awaits.
    pub fn prune(&self) {
        let mut registry = self.inner.lock().expect("lock registry poisoned");
        registry.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of tracked lock entries.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("lock registry poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ReportLocks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_report_serializes() {
        let locks = Arc::new(ReportLocks::new());
        let guard = locks.acquire(ReportId(1)).await;

        let locks2 = locks.clone();
        let contender = tokio::spawn(async move {
            let _g = locks2.acquire(ReportId(1)).await;
        });

        // The contender cannot finish while the guard is held.
        tokio::task::yield_now().await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }

    #[tokio::test]
    async fn different_reports_do_not_contend() {
        let locks = ReportLocks::new();
        let _a = locks.acquire(ReportId(1)).await;
        // Acquiring a different report completes immediately.
        let _b = locks.acquire(ReportId(2)).await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn prune_keeps_held_locks() {
        let locks = ReportLocks::new();
        let guard = locks.acquire(ReportId(1)).await;
        let _unheld = locks.acquire(ReportId(2)).await;
        drop(_unheld);

        locks.prune();
        assert_eq!(locks.len(), 1);
        drop(guard);

        locks.prune();
        assert!(locks.is_empty());
    }
}
