//! Report submission pipeline.
//!
//! Runs synchronously before persistence: a positive duplicate decision
//! rejects the submission with a pointer to the existing report, and the
//! caller decides whether to redirect the citizen there.

use crate::error::NodeError;
use crate::metrics::EngineMetrics;
use civica_dedup::DuplicateResolver;
use civica_store::ReportStore;
use civica_types::{Report, ReportDraft, ReportId, Timestamp};
use std::sync::Arc;
use tracing::info;

/// The outcome of a submission. A duplicate is a decision point for the
/// caller, not an error.
#[derive(Clone, Debug)]
pub enum SubmitOutcome {
    Created(Report),
    Duplicate {
        existing: ReportId,
        distance_meters: f64,
    },
}

/// Accepts citizen submissions after the duplicate gate.
pub struct SubmissionPipeline {
    store: Arc<dyn ReportStore>,
    resolver: DuplicateResolver,
    metrics: Arc<EngineMetrics>,
}

impl SubmissionPipeline {
    pub fn new(
        store: Arc<dyn ReportStore>,
        resolver: DuplicateResolver,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            store,
            resolver,
            metrics,
        }
    }

    /// Submit a new report.
    ///
    /// The candidate pool is every open report; resolved and deleted reports
    /// never block a submission, which is what makes a re-report of a closed
    /// issue possible at the same location.
    pub fn submit(&self, draft: ReportDraft) -> Result<SubmitOutcome, NodeError> {
        if let Some(target) = draft.follow_up_of {
            if self.store.get(target)?.is_none() {
                return Err(NodeError::FollowUpNotFound(target));
            }
        }

        let pool = self.store.open_reports()?;
        if let Some(existing) = self.resolver.find_duplicate(&draft, &pool) {
            self.metrics.duplicates_detected.inc();
            info!(
                existing = %existing.id,
                distance_meters = existing.distance_meters,
                "submission rejected as duplicate"
            );
            return Ok(SubmitOutcome::Duplicate {
                existing: existing.id,
                distance_meters: existing.distance_meters,
            });
        }

        let id = self.store.allocate_id();
        let report = Report::from_draft(id, draft, Timestamp::now());
        self.store.put(report.clone())?;

        self.metrics.reports_submitted.inc();
        self.metrics.open_reports.inc();
        info!(report = %id, category = %report.category, "report created");

        Ok(SubmitOutcome::Created(report))
    }
}
