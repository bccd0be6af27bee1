//! Reports and the records attached to them.

use crate::coordinate::Coordinate;
use crate::status::ReportStatus;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identifier of a report, allocated by the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReportId(pub u64);

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r-{}", self.0)
    }
}

/// Reference to an externally-stored image (the storage service owns the bytes).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef(pub String);

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A citizen-submitted civic issue report.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: Coordinate,
    pub status: ReportStatus,
    pub created_at: Timestamp,
    pub reporter_id: String,
    /// Users who have upvoted; the upvote count is the set size, which keeps
    /// toggling idempotent per user.
    pub upvoters: HashSet<String>,
    pub comments: Vec<Comment>,
    pub evidence_images: Vec<ImageRef>,
    pub status_history: Vec<StatusChange>,
    /// Back-reference set when this report re-raises a previously closed one.
    pub follow_up_of: Option<ReportId>,
    /// Present iff `status == Resolved`.
    pub resolution: Option<ResolutionRecord>,
}

impl Report {
    /// Build a fresh report from a submission draft.
    pub fn from_draft(id: ReportId, draft: ReportDraft, now: Timestamp) -> Self {
        let initial = StatusChange {
            status: ReportStatus::Reported,
            changed_by: draft.reporter_id.clone(),
            changed_at: now,
            notes: None,
        };
        Self {
            id,
            title: draft.title,
            description: draft.description,
            category: draft.category,
            location: draft.location,
            status: ReportStatus::Reported,
            created_at: now,
            reporter_id: draft.reporter_id,
            upvoters: HashSet::new(),
            comments: Vec::new(),
            evidence_images: draft.evidence_images,
            status_history: vec![initial],
            follow_up_of: draft.follow_up_of,
            resolution: None,
        }
    }

    /// Current upvote count.
    pub fn upvotes(&self) -> usize {
        self.upvoters.len()
    }
}

/// Input to report submission; the store allocates the id.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReportDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub location: Coordinate,
    pub reporter_id: String,
    #[serde(default)]
    pub evidence_images: Vec<ImageRef>,
    #[serde(default)]
    pub follow_up_of: Option<ReportId>,
}

/// One entry in a report's status history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ReportStatus,
    pub changed_by: String,
    pub changed_at: Timestamp,
    pub notes: Option<String>,
}

/// A comment left on a report.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub author_id: String,
    pub body: String,
    pub created_at: Timestamp,
}

/// An in-flight resolve operation. Transient: folded into the report's
/// [`ResolutionRecord`] on success, discarded on failure.
#[derive(Clone, Debug)]
pub struct ResolutionAttempt {
    pub report_id: ReportId,
    pub evidence_image: ImageRef,
    /// Raw bytes of the evidence photo; metadata extraction reads these.
    pub evidence_bytes: Vec<u8>,
    pub admin_selfie: ImageRef,
    pub selfie_bytes: Vec<u8>,
    pub admin_id: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// The durable outcome of a successful resolution, kept on the report.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolutionRecord {
    pub evidence_image: ImageRef,
    pub evidence_coordinate: Coordinate,
    pub distance_meters: f64,
    pub admin_selfie: ImageRef,
    pub identity_verified: bool,
    pub resolved_by: String,
    pub resolved_at: Timestamp,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ReportDraft {
        ReportDraft {
            title: "Broken streetlight".into(),
            description: "Pole 47 is dark".into(),
            category: "streetlight".into(),
            location: Coordinate::new(22.7512, 75.8754).unwrap(),
            reporter_id: "citizen-1".into(),
            evidence_images: vec![ImageRef("img/1.jpg".into())],
            follow_up_of: None,
        }
    }

    #[test]
    fn from_draft_starts_reported() {
        let r = Report::from_draft(ReportId(1), draft(), Timestamp::new(1_000));
        assert_eq!(r.status, ReportStatus::Reported);
        assert_eq!(r.upvotes(), 0);
        assert_eq!(r.status_history.len(), 1);
        assert!(r.resolution.is_none());
    }

    #[test]
    fn upvote_count_tracks_distinct_users() {
        let mut r = Report::from_draft(ReportId(1), draft(), Timestamp::new(1_000));
        r.upvoters.insert("a".into());
        r.upvoters.insert("b".into());
        r.upvoters.insert("a".into());
        assert_eq!(r.upvotes(), 2);
    }

    #[test]
    fn report_id_display() {
        assert_eq!(ReportId(42).to_string(), "r-42");
    }
}
