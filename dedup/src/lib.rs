//! Duplicate detection for incoming reports.
//!
//! A new submission is checked against every open report within the duplicate
//! radius. Similarity between the draft and a candidate is delegated to a
//! pluggable scorer; the resolver itself only ranks qualifying candidates.

pub mod resolver;
pub mod scorer;

pub use resolver::{DuplicateMatch, DuplicateResolver};
pub use scorer::{CategoryScorer, ScorerUnavailable, SimilarityScorer};
