//! Engine parameters — the tunable knobs of the verification protocol.

use serde::{Deserialize, Serialize};

/// All parameters consumed by the core.
///
/// The duplicate and resolution radii default to the same 30 m but are
/// independently tunable.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoreParams {
    /// Maximum distance (meters) between two reports for them to be
    /// considered the same underlying issue.
    #[serde(default = "default_duplicate_radius")]
    pub duplicate_radius_meters: f64,

    /// Maximum distance (meters) between resolution evidence and the
    /// reported location.
    #[serde(default = "default_resolution_radius")]
    pub resolution_radius_meters: f64,

    /// Deadline for the remote identity classifier call.
    #[serde(default = "default_identity_timeout")]
    pub identity_verification_timeout_secs: u64,

    /// Whether a definitive non-human classifier result blocks resolution.
    /// When false the result is logged and recorded but does not block.
    #[serde(default = "default_true")]
    pub identity_verification_required: bool,

    /// Minimum similarity score for a nearby report to count as a duplicate.
    #[serde(default = "default_similarity_threshold")]
    pub similarity_confidence_threshold: f64,

    /// Per-subscriber event channel capacity; overflow drops the oldest
    /// events and the subscriber resyncs.
    #[serde(default = "default_channel_capacity")]
    pub event_channel_capacity: usize,

    /// Polling interval (seconds) advertised to clients whose push channel
    /// is unavailable.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_duplicate_radius() -> f64 {
    30.0
}

fn default_resolution_radius() -> f64 {
    30.0
}

fn default_identity_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_similarity_threshold() -> f64 {
    0.5
}

fn default_channel_capacity() -> usize {
    64
}

fn default_poll_interval() -> u64 {
    30
}

impl CoreParams {
    /// The intended production configuration.
    pub fn civic_defaults() -> Self {
        Self {
            duplicate_radius_meters: default_duplicate_radius(),
            resolution_radius_meters: default_resolution_radius(),
            identity_verification_timeout_secs: default_identity_timeout(),
            identity_verification_required: true,
            similarity_confidence_threshold: default_similarity_threshold(),
            event_channel_capacity: default_channel_capacity(),
            poll_interval_secs: default_poll_interval(),
        }
    }
}

impl Default for CoreParams {
    fn default() -> Self {
        Self::civic_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_constants() {
        let p = CoreParams::default();
        assert_eq!(p.duplicate_radius_meters, 30.0);
        assert_eq!(p.resolution_radius_meters, 30.0);
        assert_eq!(p.identity_verification_timeout_secs, 10);
        assert!(p.identity_verification_required);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let p: CoreParams =
            serde_json::from_str(r#"{"resolution_radius_meters": 50.0}"#).unwrap();
        assert_eq!(p.resolution_radius_meters, 50.0);
        assert_eq!(p.duplicate_radius_meters, 30.0);
    }
}
