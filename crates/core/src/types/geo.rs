//! Geographic coordinates.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`GeoPoint`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeoPointError {
    /// Latitude is not a finite number in `-90..=90`.
    #[error("latitude must be between -90 and 90, got {0}")]
    Latitude(f64),
    /// Longitude is not a finite number in `-180..=180`.
    #[error("longitude must be between -180 and 180, got {0}")]
    Longitude(f64),
}

/// A WGS 84 latitude/longitude pair in degrees.
///
/// ```
/// use blood_connect_core::GeoPoint;
///
/// let venue = GeoPoint::new(12.97, 77.59).unwrap();
/// assert!((venue.lat() - 12.97).abs() < f64::EPSILON);
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// assert!(GeoPoint::new(0.0, f64::NAN).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = GeoPointError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        Self::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    /// Build a point from degrees.
    ///
    /// # Errors
    ///
    /// Returns an error if either coordinate is out of range or not finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoPointError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoPointError::Latitude(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(GeoPointError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    #[must_use]
    pub const fn lat(&self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lng(&self) -> f64 {
        self.lng
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_inclusive() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
        assert_eq!(
            GeoPoint::new(-90.5, 0.0),
            Err(GeoPointError::Latitude(-90.5))
        );
        assert_eq!(
            GeoPoint::new(0.0, 180.5),
            Err(GeoPointError::Longitude(180.5))
        );
    }

    #[test]
    fn test_deserialize_validates() {
        let point: GeoPoint = serde_json::from_str(r#"{"lat": 32.9, "lng": -96.8}"#).unwrap();
        assert!((point.lng() + 96.8).abs() < f64::EPSILON);
        assert!(serde_json::from_str::<GeoPoint>(r#"{"lat": 100, "lng": 0}"#).is_err());
    }
}
