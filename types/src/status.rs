//! Report status ladder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle status of a report.
///
/// Transitions are monotonic forward: the admin ladder runs
/// `Reported → Acknowledged → InProgress`, `Resolved` is reachable only
/// through the resolution gate, and `Deleted` only through the reporter's
/// soft delete. Both `Resolved` and `Deleted` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Submitted by a citizen; no staff action yet.
    Reported,
    /// A staff member has seen the report.
    Acknowledged,
    /// Work on the issue has started.
    InProgress,
    /// Closed with geo-verified evidence.
    Resolved,
    /// Soft-deleted by the reporting citizen.
    Deleted,
}

impl ReportStatus {
    /// Whether the report is still actionable (duplicate candidate,
    /// resolvable, status-updatable).
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Reported | Self::Acknowledged | Self::InProgress)
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Deleted)
    }

    /// Position on the open ladder; terminal states have none.
    fn ladder_rank(&self) -> Option<u8> {
        match self {
            Self::Reported => Some(0),
            Self::Acknowledged => Some(1),
            Self::InProgress => Some(2),
            Self::Resolved | Self::Deleted => None,
        }
    }

    /// Whether an admin status update may move a report from `self` to `next`.
    ///
    /// Only strictly-forward moves on the open ladder qualify. Resolution and
    /// deletion have dedicated paths and are never valid here.
    pub fn can_advance_to(&self, next: ReportStatus) -> bool {
        match (self.ladder_rank(), next.ladder_rank()) {
            (Some(from), Some(to)) => to > from,
            _ => false,
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Reported => "reported",
            Self::Acknowledged => "acknowledged",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Deleted => "deleted",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_moves_allowed() {
        assert!(ReportStatus::Reported.can_advance_to(ReportStatus::Acknowledged));
        assert!(ReportStatus::Reported.can_advance_to(ReportStatus::InProgress));
        assert!(ReportStatus::Acknowledged.can_advance_to(ReportStatus::InProgress));
    }

    #[test]
    fn backward_moves_rejected() {
        assert!(!ReportStatus::InProgress.can_advance_to(ReportStatus::Acknowledged));
        assert!(!ReportStatus::Acknowledged.can_advance_to(ReportStatus::Reported));
    }

    #[test]
    fn self_transition_rejected() {
        assert!(!ReportStatus::Reported.can_advance_to(ReportStatus::Reported));
    }

    #[test]
    fn terminal_states_never_advance() {
        for next in [
            ReportStatus::Reported,
            ReportStatus::Acknowledged,
            ReportStatus::InProgress,
            ReportStatus::Resolved,
            ReportStatus::Deleted,
        ] {
            assert!(!ReportStatus::Resolved.can_advance_to(next));
            assert!(!ReportStatus::Deleted.can_advance_to(next));
        }
    }

    #[test]
    fn resolution_and_deletion_not_reachable_via_ladder() {
        assert!(!ReportStatus::InProgress.can_advance_to(ReportStatus::Resolved));
        assert!(!ReportStatus::Reported.can_advance_to(ReportStatus::Deleted));
    }

    #[test]
    fn open_and_terminal_partition() {
        assert!(ReportStatus::Reported.is_open());
        assert!(ReportStatus::InProgress.is_open());
        assert!(!ReportStatus::Resolved.is_open());
        assert!(ReportStatus::Deleted.is_terminal());
        assert!(!ReportStatus::Acknowledged.is_terminal());
    }
}
