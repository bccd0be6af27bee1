//! Fundamental types for the Civica engine.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: coordinates, reports and their status ladder, status events,
//! engine parameters, and timestamps.

pub mod coordinate;
pub mod event;
pub mod params;
pub mod report;
pub mod status;
pub mod time;

pub use coordinate::{Coordinate, InvalidCoordinate};
pub use event::{EventKind, EventPayload, StatusEvent, UpvoteAction};
pub use params::CoreParams;
pub use report::{
    Comment, ImageRef, Report, ReportDraft, ReportId, ResolutionAttempt, ResolutionRecord,
    StatusChange,
};
pub use status::ReportStatus;
pub use time::Timestamp;
