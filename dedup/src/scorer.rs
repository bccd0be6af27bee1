//! Pluggable similarity scoring.
//!
//! The engine does not specify HOW two reports are judged similar — only that
//! a score in `[0, 1]` comes back. Different deployments can plug in
//! different scorers behind the same trait.

use civica_types::{Report, ReportDraft};
use thiserror::Error;

/// The scorer could not produce a result (remote classifier down, timed out).
/// Callers degrade to distance-only matching rather than failing the
/// submission.
#[derive(Debug, Error)]
#[error("similarity scorer unavailable: {0}")]
pub struct ScorerUnavailable(pub String);

/// A pluggable text/category similarity scorer.
///
/// Implementations might include:
/// - Category equality (the built-in default)
/// - An embedding-based text classifier behind an HTTP endpoint
/// - A keyword/tag overlap heuristic
pub trait SimilarityScorer: Send + Sync {
    /// Human-readable name of this scorer.
    fn name(&self) -> &str;

    /// Score how likely `draft` and `candidate` describe the same underlying
    /// issue. Returns a confidence in `[0.0, 1.0]`.
    fn score(&self, draft: &ReportDraft, candidate: &Report) -> Result<f64, ScorerUnavailable>;
}

/// Built-in scorer: full confidence when the categories match
/// (case-insensitive, whitespace-trimmed), zero otherwise.
pub struct CategoryScorer;

impl SimilarityScorer for CategoryScorer {
    fn name(&self) -> &str {
        "category"
    }

    fn score(&self, draft: &ReportDraft, candidate: &Report) -> Result<f64, ScorerUnavailable> {
        let same = draft
            .category
            .trim()
            .eq_ignore_ascii_case(candidate.category.trim());
        Ok(if same { 1.0 } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civica_types::{Coordinate, ImageRef, ReportId, Timestamp};

    fn draft(category: &str) -> ReportDraft {
        ReportDraft {
            title: "t".into(),
            description: "d".into(),
            category: category.into(),
            location: Coordinate::new(0.0, 0.0).unwrap(),
            reporter_id: "c".into(),
            evidence_images: vec![ImageRef("i".into())],
            follow_up_of: None,
        }
    }

    fn report(category: &str) -> Report {
        Report::from_draft(ReportId(1), draft(category), Timestamp::new(0))
    }

    #[test]
    fn matching_category_scores_one() {
        let s = CategoryScorer.score(&draft("pothole"), &report("pothole")).unwrap();
        assert_eq!(s, 1.0);
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        let s = CategoryScorer
            .score(&draft("  Pothole "), &report("POTHOLE"))
            .unwrap();
        assert_eq!(s, 1.0);
    }

    #[test]
    fn different_category_scores_zero() {
        let s = CategoryScorer.score(&draft("pothole"), &report("garbage")).unwrap();
        assert_eq!(s, 0.0);
    }
}
