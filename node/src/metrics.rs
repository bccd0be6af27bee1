//! Prometheus metrics for the engine.
//!
//! The [`EngineMetrics`] struct owns a dedicated [`Registry`] that the
//! gateway's `/metrics` endpoint encodes into the text exposition format.

use prometheus::{
    register_int_counter_with_registry, register_int_gauge_with_registry, IntCounter, IntGauge,
    Opts, Registry,
};

/// Central collection of engine-level Prometheus metrics.
pub struct EngineMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    /// Reports accepted through the submission pipeline.
    pub reports_submitted: IntCounter,
    /// Submissions rejected as duplicates of an existing open report.
    pub duplicates_detected: IntCounter,
    /// Resolutions committed (evidence + identity gate passed).
    pub resolutions_committed: IntCounter,
    /// Resolve attempts rejected at any gate.
    pub resolutions_rejected: IntCounter,
    /// Status events handed to the broadcast hub.
    pub events_published: IntCounter,

    /// Reports currently open.
    pub open_reports: IntGauge,
}

impl EngineMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let reports_submitted = register_int_counter_with_registry!(
            Opts::new("civica_reports_submitted_total", "Reports accepted"),
            registry
        )
        .expect("failed to register reports_submitted counter");

        let duplicates_detected = register_int_counter_with_registry!(
            Opts::new(
                "civica_duplicates_detected_total",
                "Submissions rejected as duplicates"
            ),
            registry
        )
        .expect("failed to register duplicates_detected counter");

        let resolutions_committed = register_int_counter_with_registry!(
            Opts::new(
                "civica_resolutions_committed_total",
                "Resolutions committed"
            ),
            registry
        )
        .expect("failed to register resolutions_committed counter");

        let resolutions_rejected = register_int_counter_with_registry!(
            Opts::new(
                "civica_resolutions_rejected_total",
                "Resolve attempts rejected at a gate"
            ),
            registry
        )
        .expect("failed to register resolutions_rejected counter");

        let events_published = register_int_counter_with_registry!(
            Opts::new(
                "civica_events_published_total",
                "Status events handed to the hub"
            ),
            registry
        )
        .expect("failed to register events_published counter");

        let open_reports = register_int_gauge_with_registry!(
            Opts::new("civica_open_reports", "Reports currently open"),
            registry
        )
        .expect("failed to register open_reports gauge");

        Self {
            registry,
            reports_submitted,
            duplicates_detected,
            resolutions_committed,
            resolutions_rejected,
            events_published,
            open_reports,
        }
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_increment() {
        let m = EngineMetrics::new();
        assert_eq!(m.reports_submitted.get(), 0);
        m.reports_submitted.inc();
        assert_eq!(m.reports_submitted.get(), 1);
    }

    #[test]
    fn registry_gathers_all_families() {
        let m = EngineMetrics::new();
        m.duplicates_detected.inc();
        let families = m.registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "civica_duplicates_detected_total"));
    }
}
