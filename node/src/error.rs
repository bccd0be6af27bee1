use civica_evidence::EvidenceError;
use civica_identity::IdentityError;
use civica_store::StoreError;
use civica_types::{ReportId, ReportStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("report {0} not found")]
    NotFound(ReportId),

    /// The concurrency-loser outcome: another attempt already committed.
    /// Terminal for this attempt, not alarming.
    #[error("report {0} is already resolved")]
    AlreadyResolved(ReportId),

    #[error("report {0} was deleted by its reporter")]
    ReportDeleted(ReportId),

    #[error(transparent)]
    Evidence(#[from] EvidenceError),

    #[error("identity verification timed out after {timeout_secs}s")]
    VerificationTimeout { timeout_secs: u64 },

    #[error("identity verification unavailable: {0}")]
    VerificationUnavailable(String),

    /// Definitive non-human classifier verdict while the gate is required.
    #[error("identity verification rejected the capture")]
    IdentityRejected { detail: Option<String> },

    #[error("cannot move report from {from} to {to}")]
    InvalidTransition {
        from: ReportStatus,
        to: ReportStatus,
    },

    #[error("user {user} is not the reporter of {report}")]
    NotReporter { report: ReportId, user: String },

    #[error("follow-up target {0} does not exist")]
    FollowUpNotFound(ReportId),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<IdentityError> for NodeError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::Unavailable(detail) => Self::VerificationUnavailable(detail),
        }
    }
}
