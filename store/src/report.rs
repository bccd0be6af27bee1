//! Report storage trait.

use crate::StoreError;
use civica_types::{Report, ReportId};

/// Trait for storing reports.
///
/// Implementations must make each method individually atomic; cross-call
/// atomicity (read-modify-write of one report) is provided by the caller's
/// per-report serialization.
pub trait ReportStore: Send + Sync {
    /// Allocate the next report id.
    fn allocate_id(&self) -> ReportId;

    /// Fetch a report by id.
    fn get(&self, id: ReportId) -> Result<Option<Report>, StoreError>;

    /// Insert or overwrite a report.
    fn put(&self, report: Report) -> Result<(), StoreError>;

    /// All reports that are still open (duplicate-candidate pool).
    fn open_reports(&self) -> Result<Vec<Report>, StoreError>;

    /// All reports, any status.
    fn all_reports(&self) -> Result<Vec<Report>, StoreError>;

    /// Total number of stored reports.
    fn report_count(&self) -> Result<u64, StoreError>;
}
