//! Status events fanned out to live subscribers.
//!
//! Wire shape: `{"type": ..., "report_id": ..., "payload": {...}, "sequence": ...}`.
//! `report_id` and `sequence` are always present so clients can de-duplicate
//! at-least-once delivery.

use crate::report::{ImageRef, ReportId};
use crate::status::ReportStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of a [`StatusEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    StatusUpdate,
    ResolutionUpdate,
    UpvoteUpdate,
    CommentNew,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StatusUpdate => "status_update",
            Self::ResolutionUpdate => "resolution_update",
            Self::UpvoteUpdate => "upvote_update",
            Self::CommentNew => "comment_new",
        };
        write!(f, "{s}")
    }
}

/// Direction of an upvote toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpvoteAction {
    Added,
    Removed,
}

/// Typed payload of a [`StatusEvent`]. The variants carry disjoint field
/// sets, so the untagged representation round-trips unambiguously.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventPayload {
    Status {
        old_status: ReportStatus,
        new_status: ReportStatus,
        changed_by: String,
        notes: Option<String>,
    },
    Resolution {
        distance_meters: f64,
        evidence_image: ImageRef,
        identity_verified: bool,
        resolved_by: String,
    },
    Upvote {
        total_upvotes: usize,
        user_id: String,
        action: UpvoteAction,
    },
    Comment {
        comment_id: u64,
        author_id: String,
    },
}

impl EventPayload {
    /// The event kind this payload belongs to.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Status { .. } => EventKind::StatusUpdate,
            Self::Resolution { .. } => EventKind::ResolutionUpdate,
            Self::Upvote { .. } => EventKind::UpvoteUpdate,
            Self::Comment { .. } => EventKind::CommentNew,
        }
    }
}

/// One committed state change, created once per commit and delivered
/// at-least-once to each live subscriber.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub report_id: ReportId,
    pub payload: EventPayload,
    pub sequence: u64,
}

impl StatusEvent {
    /// Build an event; the kind is derived from the payload so the two can
    /// never disagree.
    pub fn new(report_id: ReportId, payload: EventPayload, sequence: u64) -> Self {
        Self {
            kind: payload.kind(),
            report_id,
            payload,
            sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_has_type_report_id_sequence() {
        let event = StatusEvent::new(
            ReportId(7),
            EventPayload::Status {
                old_status: ReportStatus::Reported,
                new_status: ReportStatus::Acknowledged,
                changed_by: "admin-1".into(),
                notes: None,
            },
            3,
        );

        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "status_update");
        assert_eq!(json["report_id"], 7);
        assert_eq!(json["sequence"], 3);
        assert_eq!(json["payload"]["new_status"], "acknowledged");
    }

    #[test]
    fn kind_derived_from_payload() {
        let event = StatusEvent::new(
            ReportId(1),
            EventPayload::Upvote {
                total_upvotes: 4,
                user_id: "u".into(),
                action: UpvoteAction::Added,
            },
            1,
        );
        assert_eq!(event.kind, EventKind::UpvoteUpdate);
    }

    #[test]
    fn resolution_payload_round_trips() {
        let event = StatusEvent::new(
            ReportId(9),
            EventPayload::Resolution {
                distance_meters: 12.5,
                evidence_image: ImageRef("img/after.jpg".into()),
                identity_verified: true,
                resolved_by: "admin-2".into(),
            },
            10,
        );

        let json = serde_json::to_string(&event).unwrap();
        let back: StatusEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind, EventKind::ResolutionUpdate);
        match back.payload {
            EventPayload::Resolution {
                distance_meters, ..
            } => assert_eq!(distance_meters, 12.5),
            other => panic!("unexpected payload: {other:?}"),
        }
    }
}
