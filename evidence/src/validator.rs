//! The evidence radius check.

use crate::extract::MetadataExtractor;
use civica_geo::distance_meters;
use civica_types::Coordinate;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Why an evidence photo was rejected. Both variants are user-facing and
/// retryable by re-capturing; the distance is carried so the client can
/// render actionable guidance.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EvidenceError {
    #[error("evidence image carries no embedded location metadata")]
    MissingLocation,

    #[error("evidence taken {distance_meters:.2}m from the report, maximum allowed {max_meters:.0}m")]
    OutOfRadius {
        distance_meters: f64,
        max_meters: f64,
    },
}

/// A passed evidence check, kept for the audit trail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EvidenceCheck {
    pub coordinate: Coordinate,
    pub distance_meters: f64,
}

/// Validates a resolution photo against the original report location.
///
/// Pure and synchronous: extract the embedded coordinate, measure, accept
/// iff the distance is within the radius (boundary inclusive). No storage,
/// no side effects.
pub struct EvidenceValidator {
    radius_meters: f64,
    extractor: Arc<dyn MetadataExtractor>,
}

impl EvidenceValidator {
    pub fn new(radius_meters: f64, extractor: Arc<dyn MetadataExtractor>) -> Self {
        Self {
            radius_meters,
            extractor,
        }
    }

    /// Validate evidence bytes against the report's location.
    pub fn validate(
        &self,
        image: &[u8],
        original: Coordinate,
    ) -> Result<EvidenceCheck, EvidenceError> {
        let coordinate = self
            .extractor
            .extract_coordinate(image)
            .ok_or(EvidenceError::MissingLocation)?;

        let distance = distance_meters(coordinate, original);
        debug!(
            evidence = %coordinate,
            original = %original,
            distance_meters = distance,
            "evidence location check"
        );

        if distance <= self.radius_meters {
            Ok(EvidenceCheck {
                coordinate,
                distance_meters: distance,
            })
        } else {
            Err(EvidenceError::OutOfRadius {
                distance_meters: distance,
                max_meters: self.radius_meters,
            })
        }
    }
}
