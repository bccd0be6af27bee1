//! In-memory report store.

use crate::report::ReportStore;
use crate::StoreError;
use civica_types::{Report, ReportId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

/// HashMap-backed store. Ids start at 1.
pub struct MemoryStore {
    reports: RwLock<HashMap<ReportId, Report>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            reports: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportStore for MemoryStore {
    fn allocate_id(&self) -> ReportId {
        ReportId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn get(&self, id: ReportId) -> Result<Option<Report>, StoreError> {
        let reports = self.reports.read().expect("report map poisoned");
        Ok(reports.get(&id).cloned())
    }

    fn put(&self, report: Report) -> Result<(), StoreError> {
        let mut reports = self.reports.write().expect("report map poisoned");
        reports.insert(report.id, report);
        Ok(())
    }

    fn open_reports(&self) -> Result<Vec<Report>, StoreError> {
        let reports = self.reports.read().expect("report map poisoned");
        Ok(reports
            .values()
            .filter(|r| r.status.is_open())
            .cloned()
            .collect())
    }

    fn all_reports(&self) -> Result<Vec<Report>, StoreError> {
        let reports = self.reports.read().expect("report map poisoned");
        Ok(reports.values().cloned().collect())
    }

    fn report_count(&self) -> Result<u64, StoreError> {
        let reports = self.reports.read().expect("report map poisoned");
        Ok(reports.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civica_types::{Coordinate, ReportDraft, ReportStatus, Timestamp};

    fn draft() -> ReportDraft {
        ReportDraft {
            title: "t".into(),
            description: "d".into(),
            category: "pothole".into(),
            location: Coordinate::new(22.7512, 75.8754).unwrap(),
            reporter_id: "c".into(),
            evidence_images: Vec::new(),
            follow_up_of: None,
        }
    }

    #[test]
    fn ids_are_sequential_from_one() {
        let store = MemoryStore::new();
        assert_eq!(store.allocate_id(), ReportId(1));
        assert_eq!(store.allocate_id(), ReportId(2));
    }

    #[test]
    fn put_get_roundtrip() {
        let store = MemoryStore::new();
        let id = store.allocate_id();
        let report = Report::from_draft(id, draft(), Timestamp::new(100));
        store.put(report).unwrap();

        let loaded = store.get(id).unwrap().unwrap();
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.title, "t");
        assert_eq!(store.report_count().unwrap(), 1);
    }

    #[test]
    fn get_missing_returns_none() {
        let store = MemoryStore::new();
        assert!(store.get(ReportId(99)).unwrap().is_none());
    }

    #[test]
    fn open_reports_excludes_terminal_statuses() {
        let store = MemoryStore::new();

        let open = Report::from_draft(store.allocate_id(), draft(), Timestamp::new(1));
        let mut resolved = Report::from_draft(store.allocate_id(), draft(), Timestamp::new(2));
        resolved.status = ReportStatus::Resolved;
        let mut deleted = Report::from_draft(store.allocate_id(), draft(), Timestamp::new(3));
        deleted.status = ReportStatus::Deleted;

        store.put(open.clone()).unwrap();
        store.put(resolved).unwrap();
        store.put(deleted).unwrap();

        let pool = store.open_reports().unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id, open.id);
        assert_eq!(store.report_count().unwrap(), 3);
    }

    #[test]
    fn put_overwrites_existing() {
        let store = MemoryStore::new();
        let id = store.allocate_id();
        let mut report = Report::from_draft(id, draft(), Timestamp::new(1));
        store.put(report.clone()).unwrap();

        report.status = ReportStatus::Acknowledged;
        store.put(report).unwrap();

        let loaded = store.get(id).unwrap().unwrap();
        assert_eq!(loaded.status, ReportStatus::Acknowledged);
        assert_eq!(store.report_count().unwrap(), 1);
    }
}
