//! WGS84 coordinate value type.
//!
//! Construction is the single validation point: once a [`Coordinate`] exists,
//! its latitude is within [-90, 90] and its longitude within [-180, 180].
//! Downstream geo math is therefore total.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A coordinate outside the valid WGS84 ranges.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
#[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// An immutable, validated WGS84 coordinate (decimal degrees).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Validate and construct a coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        if !(-90.0..=90.0).contains(&latitude)
            || !(-180.0..=180.0).contains(&longitude)
            || latitude.is_nan()
            || longitude.is_nan()
        {
            return Err(InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Unvalidated mirror used to funnel deserialization through [`Coordinate::new`].
#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = InvalidCoordinate;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_coordinate_constructs() {
        let c = Coordinate::new(22.7512, 75.8754).unwrap();
        assert_eq!(c.latitude(), 22.7512);
        assert_eq!(c.longitude(), 75.8754);
    }

    #[test]
    fn extremes_are_valid() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn out_of_range_latitude_rejected() {
        let err = Coordinate::new(90.0001, 0.0).unwrap_err();
        assert_eq!(err.latitude, 90.0001);
    }

    #[test]
    fn out_of_range_longitude_rejected() {
        assert!(Coordinate::new(0.0, -180.0001).is_err());
    }

    #[test]
    fn nan_rejected() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<Coordinate, _> =
            serde_json::from_str(r#"{"latitude": 22.75, "longitude": 75.87}"#);
        assert!(ok.is_ok());

        let bad: Result<Coordinate, _> =
            serde_json::from_str(r#"{"latitude": 91.0, "longitude": 0.0}"#);
        assert!(bad.is_err());
    }
}
