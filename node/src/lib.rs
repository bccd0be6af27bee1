//! Report intake and the resolution coordinator.
//!
//! This crate ties the leaf subsystems together:
//! - submissions run through the duplicate gate before anything is persisted;
//! - admin status updates walk the forward-only ladder;
//! - the resolve path gates the `Open → Resolved` transition behind evidence
//!   validation and the liveness check, commits atomically per report, and
//!   hands the committed change to the broadcast hub.

pub mod coordinator;
pub mod error;
pub mod locks;
pub mod metrics;
pub mod submission;

pub use coordinator::{ResolutionCoordinator, ResolutionOutcome, UpvoteOutcome};
pub use error::NodeError;
pub use locks::ReportLocks;
pub use metrics::EngineMetrics;
pub use submission::{SubmissionPipeline, SubmitOutcome};
