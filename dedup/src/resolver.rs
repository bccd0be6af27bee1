//! Candidate ranking for duplicate detection.

use crate::scorer::SimilarityScorer;
use civica_geo::distance_meters;
use civica_types::{Report, ReportDraft, ReportId, Timestamp};
use std::sync::Arc;
use tracing::{debug, warn};

/// A positive duplicate decision, with enough detail for the caller to
/// redirect the citizen to the existing report.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DuplicateMatch {
    pub id: ReportId,
    pub distance_meters: f64,
}

/// Decides whether a new report matches an existing open report nearby.
///
/// Runs synchronously before a report is persisted. Candidates must be open
/// (not Resolved, not Deleted), within the duplicate radius, and score at or
/// above the confidence threshold. The closest qualifying candidate wins;
/// equal distances are broken by earliest creation time.
pub struct DuplicateResolver {
    radius_meters: f64,
    confidence_threshold: f64,
    scorer: Arc<dyn SimilarityScorer>,
}

impl DuplicateResolver {
    pub fn new(
        radius_meters: f64,
        confidence_threshold: f64,
        scorer: Arc<dyn SimilarityScorer>,
    ) -> Self {
        Self {
            radius_meters,
            confidence_threshold,
            scorer,
        }
    }

    /// Find the best duplicate candidate for `draft`, if any.
    ///
    /// Scorer failure degrades to distance-only matching: every in-radius
    /// candidate is treated as fully similar. This keeps submissions flowing
    /// when the classifier is down, at the cost of stricter-than-usual
    /// duplicate flagging.
    pub fn find_duplicate(&self, draft: &ReportDraft, pool: &[Report]) -> Option<DuplicateMatch> {
        let mut best: Option<(f64, Timestamp, ReportId)> = None;
        let mut degraded = false;

        for candidate in pool.iter().filter(|r| r.status.is_open()) {
            let distance = distance_meters(draft.location, candidate.location);
            if distance > self.radius_meters {
                continue;
            }

            let score = match self.scorer.score(draft, candidate) {
                Ok(score) => score,
                Err(err) => {
                    if !degraded {
                        warn!(
                            scorer = self.scorer.name(),
                            error = %err,
                            "similarity scorer unavailable, degrading to distance-only matching"
                        );
                        degraded = true;
                    }
                    1.0
                }
            };

            if score < self.confidence_threshold {
                continue;
            }

            let better = match &best {
                None => true,
                Some((best_distance, best_created, _)) => {
                    distance < *best_distance
                        || (distance == *best_distance && candidate.created_at < *best_created)
                }
            };
            if better {
                best = Some((distance, candidate.created_at, candidate.id));
            }
        }

        best.map(|(distance, _, id)| {
            debug!(report = %id, distance_meters = distance, "duplicate candidate selected");
            DuplicateMatch {
                id,
                distance_meters: distance,
            }
        })
    }
}
