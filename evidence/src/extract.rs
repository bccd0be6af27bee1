//! Embedded-location extraction boundary.
//!
//! EXIF (or equivalent) parsing lives outside the engine; the validator only
//! needs "the coordinate embedded in these bytes, if any".

use civica_types::Coordinate;
use serde::Deserialize;

/// Narrow interface to the image-metadata collaborator.
pub trait MetadataExtractor: Send + Sync {
    /// Extract the embedded capture coordinate from raw image bytes.
    ///
    /// Returns `None` when the image carries no usable location. A (0, 0)
    /// coordinate must also be reported as `None` — it is the default many
    /// devices write when the fix failed.
    fn extract_coordinate(&self, image: &[u8]) -> Option<Coordinate>;
}

/// Deterministic extractor for tests and wiring without an EXIF backend:
/// always returns the configured coordinate.
pub struct NullExtractor {
    coordinate: Option<Coordinate>,
}

impl NullExtractor {
    pub fn returning(coordinate: Coordinate) -> Self {
        Self {
            coordinate: Some(coordinate),
        }
    }

    pub fn empty() -> Self {
        Self { coordinate: None }
    }
}

impl MetadataExtractor for NullExtractor {
    fn extract_coordinate(&self, _image: &[u8]) -> Option<Coordinate> {
        self.coordinate
    }
}

/// Extractor for deployments where the upload service parses EXIF itself and
/// forwards the capture location as a JSON sidecar:
/// `{"latitude": .., "longitude": ..}`.
pub struct SidecarExtractor;

#[derive(Deserialize)]
struct Sidecar {
    latitude: f64,
    longitude: f64,
}

impl MetadataExtractor for SidecarExtractor {
    fn extract_coordinate(&self, image: &[u8]) -> Option<Coordinate> {
        let sidecar: Sidecar = serde_json::from_slice(image).ok()?;
        // (0, 0) is the default many devices write when the GPS fix failed.
        if sidecar.latitude == 0.0 && sidecar.longitude == 0.0 {
            return None;
        }
        Coordinate::new(sidecar.latitude, sidecar.longitude).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_parses_coordinates() {
        let c = SidecarExtractor
            .extract_coordinate(br#"{"latitude": 22.7512, "longitude": 75.8754}"#)
            .unwrap();
        assert_eq!(c.latitude(), 22.7512);
    }

    #[test]
    fn sidecar_rejects_null_island_and_garbage() {
        assert!(SidecarExtractor
            .extract_coordinate(br#"{"latitude": 0.0, "longitude": 0.0}"#)
            .is_none());
        assert!(SidecarExtractor.extract_coordinate(b"\xff\xd8\xff jpeg").is_none());
        assert!(SidecarExtractor
            .extract_coordinate(br#"{"latitude": 91.0, "longitude": 0.0}"#)
            .is_none());
    }
}
