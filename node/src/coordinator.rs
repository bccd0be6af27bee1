//! The resolution coordinator — multi-proof gate and atomic transitions.
//!
//! Every mutation of a report happens under that report's lock, and the
//! matching event is published before the lock is released, so subscribers
//! see each issue's events in commit order. The only network-bound await in
//! the resolve path is the identity check; it runs under an explicit
//! deadline, and nothing is persisted until after it completes, so a caller
//! abandoning the attempt mid-flight leaves no state to undo.

use crate::error::NodeError;
use crate::locks::ReportLocks;
use crate::metrics::EngineMetrics;
use civica_evidence::EvidenceValidator;
use civica_hub::StatusBroadcastHub;
use civica_identity::IdentityVerifier;
use civica_store::ReportStore;
use civica_types::{
    Comment, CoreParams, EventPayload, ReportId, ReportStatus, ResolutionAttempt,
    ResolutionRecord, StatusChange, StatusEvent, Timestamp, UpvoteAction,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Summary of a committed resolution, returned to the caller.
#[derive(Clone, Debug)]
pub struct ResolutionOutcome {
    pub report_id: ReportId,
    pub distance_meters: f64,
    pub identity_verified: bool,
    pub sequence: u64,
}

/// Result of an upvote toggle.
#[derive(Clone, Debug)]
pub struct UpvoteOutcome {
    pub total_upvotes: usize,
    pub action: UpvoteAction,
}

/// Orchestrates the resolve gate and the simpler admin transitions.
pub struct ResolutionCoordinator {
    store: Arc<dyn ReportStore>,
    evidence: EvidenceValidator,
    identity: Arc<dyn IdentityVerifier>,
    hub: Arc<StatusBroadcastHub>,
    locks: ReportLocks,
    params: CoreParams,
    metrics: Arc<EngineMetrics>,
}

impl ResolutionCoordinator {
    pub fn new(
        store: Arc<dyn ReportStore>,
        evidence: EvidenceValidator,
        identity: Arc<dyn IdentityVerifier>,
        hub: Arc<StatusBroadcastHub>,
        params: CoreParams,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            store,
            evidence,
            identity,
            hub,
            locks: ReportLocks::new(),
            params,
            metrics,
        }
    }

    /// Resolve a report against the multi-proof gate.
    ///
    /// Order of proofs: evidence location first (pure, cheap), then the
    /// liveness check (remote, bounded by the configured timeout), then the
    /// commit. Two concurrent attempts on the same report serialize on its
    /// lock; the loser re-reads the status and gets
    /// [`NodeError::AlreadyResolved`].
    pub async fn resolve(
        &self,
        attempt: ResolutionAttempt,
    ) -> Result<ResolutionOutcome, NodeError> {
        let id = attempt.report_id;
        let _guard = self.locks.acquire(id).await;

        let mut report = self.store.get(id)?.ok_or(NodeError::NotFound(id))?;
        match report.status {
            ReportStatus::Resolved => return Err(NodeError::AlreadyResolved(id)),
            ReportStatus::Deleted => return Err(NodeError::ReportDeleted(id)),
            _ => {}
        }

        let check = match self.evidence.validate(&attempt.evidence_bytes, report.location) {
            Ok(check) => check,
            Err(err) => {
                self.metrics.resolutions_rejected.inc();
                return Err(err.into());
            }
        };

        let deadline = Duration::from_secs(self.params.identity_verification_timeout_secs);
        let verdict = match tokio::time::timeout(
            deadline,
            self.identity.verify_human(&attempt.selfie_bytes),
        )
        .await
        {
            Err(_) => {
                self.metrics.resolutions_rejected.inc();
                return Err(NodeError::VerificationTimeout {
                    timeout_secs: self.params.identity_verification_timeout_secs,
                });
            }
            Ok(Err(err)) => {
                self.metrics.resolutions_rejected.inc();
                return Err(err.into());
            }
            Ok(Ok(verdict)) => verdict,
        };

        let identity_verified = verdict.is_human;
        if !identity_verified {
            if self.params.identity_verification_required {
                self.metrics.resolutions_rejected.inc();
                warn!(report = %id, admin = %attempt.admin_id, "resolution blocked: capture not verified as human");
                return Err(NodeError::IdentityRejected {
                    detail: verdict.detail,
                });
            }
            warn!(
                report = %id,
                admin = %attempt.admin_id,
                "capture not verified as human, resolution allowed by configuration"
            );
        }

        let now = Timestamp::now();
        report.status = ReportStatus::Resolved;
        report.status_history.push(StatusChange {
            status: ReportStatus::Resolved,
            changed_by: attempt.admin_id.clone(),
            changed_at: now,
            notes: attempt.notes.clone(),
        });
        report.resolution = Some(ResolutionRecord {
            evidence_image: attempt.evidence_image.clone(),
            evidence_coordinate: check.coordinate,
            distance_meters: check.distance_meters,
            admin_selfie: attempt.admin_selfie,
            identity_verified,
            resolved_by: attempt.admin_id.clone(),
            resolved_at: now,
            notes: attempt.notes,
        });
        self.store.put(report)?;

        let event = self.publish(
            id,
            EventPayload::Resolution {
                distance_meters: check.distance_meters,
                evidence_image: attempt.evidence_image,
                identity_verified,
                resolved_by: attempt.admin_id.clone(),
            },
        );

        self.metrics.resolutions_committed.inc();
        self.metrics.open_reports.dec();
        info!(
            report = %id,
            admin = %attempt.admin_id,
            distance_meters = check.distance_meters,
            identity_verified,
            "report resolved"
        );

        Ok(ResolutionOutcome {
            report_id: id,
            distance_meters: check.distance_meters,
            identity_verified,
            sequence: event.sequence,
        })
    }

    /// Admin status update along the forward-only ladder
    /// (`Reported → Acknowledged → InProgress`).
    ///
    /// Returns `Ok(None)` when the report already has the target status.
    /// Resolution and deletion are never reachable here.
    pub async fn update_status(
        &self,
        id: ReportId,
        new_status: ReportStatus,
        changed_by: &str,
        notes: Option<String>,
    ) -> Result<Option<StatusEvent>, NodeError> {
        let _guard = self.locks.acquire(id).await;

        let mut report = self.store.get(id)?.ok_or(NodeError::NotFound(id))?;
        if report.status == new_status {
            return Ok(None);
        }
        match report.status {
            ReportStatus::Resolved => return Err(NodeError::AlreadyResolved(id)),
            ReportStatus::Deleted => return Err(NodeError::ReportDeleted(id)),
            _ => {}
        }
        if !report.status.can_advance_to(new_status) {
            return Err(NodeError::InvalidTransition {
                from: report.status,
                to: new_status,
            });
        }

        let old_status = report.status;
        let now = Timestamp::now();
        report.status = new_status;
        report.status_history.push(StatusChange {
            status: new_status,
            changed_by: changed_by.to_string(),
            changed_at: now,
            notes: notes.clone(),
        });
        self.store.put(report)?;

        let event = self.publish(
            id,
            EventPayload::Status {
                old_status,
                new_status,
                changed_by: changed_by.to_string(),
                notes,
            },
        );
        info!(report = %id, %old_status, %new_status, by = changed_by, "status updated");
        Ok(Some(event))
    }

    /// Soft-delete a report. Reporter only, open reports only; a deleted
    /// report is never resurrected. Deleting twice is a no-op.
    pub async fn delete(&self, id: ReportId, requester: &str) -> Result<(), NodeError> {
        let _guard = self.locks.acquire(id).await;

        let mut report = self.store.get(id)?.ok_or(NodeError::NotFound(id))?;
        if report.reporter_id != requester {
            return Err(NodeError::NotReporter {
                report: id,
                user: requester.to_string(),
            });
        }
        match report.status {
            ReportStatus::Deleted => return Ok(()),
            ReportStatus::Resolved => return Err(NodeError::AlreadyResolved(id)),
            _ => {}
        }

        let old_status = report.status;
        report.status = ReportStatus::Deleted;
        report.status_history.push(StatusChange {
            status: ReportStatus::Deleted,
            changed_by: requester.to_string(),
            changed_at: Timestamp::now(),
            notes: None,
        });
        self.store.put(report)?;

        self.publish(
            id,
            EventPayload::Status {
                old_status,
                new_status: ReportStatus::Deleted,
                changed_by: requester.to_string(),
                notes: None,
            },
        );
        self.metrics.open_reports.dec();
        info!(report = %id, by = requester, "report soft-deleted");
        Ok(())
    }

    /// Toggle a user's upvote. Idempotent per user per direction.
    pub async fn toggle_upvote(
        &self,
        id: ReportId,
        user_id: &str,
    ) -> Result<UpvoteOutcome, NodeError> {
        let _guard = self.locks.acquire(id).await;

        let mut report = self.store.get(id)?.ok_or(NodeError::NotFound(id))?;
        if report.status == ReportStatus::Deleted {
            return Err(NodeError::ReportDeleted(id));
        }

        let action = if report.upvoters.remove(user_id) {
            UpvoteAction::Removed
        } else {
            report.upvoters.insert(user_id.to_string());
            UpvoteAction::Added
        };
        let total_upvotes = report.upvotes();
        self.store.put(report)?;

        self.publish(
            id,
            EventPayload::Upvote {
                total_upvotes,
                user_id: user_id.to_string(),
                action,
            },
        );

        Ok(UpvoteOutcome {
            total_upvotes,
            action,
        })
    }

    /// Attach a comment and notify the issue's viewers.
    pub async fn add_comment(
        &self,
        id: ReportId,
        author_id: &str,
        body: String,
    ) -> Result<Comment, NodeError> {
        let _guard = self.locks.acquire(id).await;

        let mut report = self.store.get(id)?.ok_or(NodeError::NotFound(id))?;
        if report.status == ReportStatus::Deleted {
            return Err(NodeError::ReportDeleted(id));
        }

        let comment = Comment {
            id: report.comments.iter().map(|c| c.id).max().unwrap_or(0) + 1,
            author_id: author_id.to_string(),
            body,
            created_at: Timestamp::now(),
        };
        report.comments.push(comment.clone());
        self.store.put(report)?;

        self.publish(
            id,
            EventPayload::Comment {
                comment_id: comment.id,
                author_id: author_id.to_string(),
            },
        );

        Ok(comment)
    }

    fn publish(&self, id: ReportId, payload: EventPayload) -> StatusEvent {
        let event = self.hub.publish(id, payload);
        self.metrics.events_published.inc();
        event
    }
}
