//! Geographic coordinates and great-circle distance

pub mod distance;

pub use distance::haversine_nm;

use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude) in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    /// Create new coordinates
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(crate::error::Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    /// Great-circle distance to another point in nautical miles
    pub fn distance_to(&self, other: Coordinates) -> f64 {
        haversine_nm(*self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_in_range() {
        assert!(Coordinates::new(40.0, -74.0).validate().is_ok());
        assert!(Coordinates::new(90.0, 180.0).validate().is_ok());
        assert!(Coordinates::new(-90.0, -180.0).validate().is_ok());
    }

    #[test]
    fn test_validate_out_of_range() {
        let err = Coordinates::new(91.0, 0.0).validate().unwrap_err();
        assert!(err.to_string().contains("Latitude 91"));

        let err = Coordinates::new(0.0, -180.5).validate().unwrap_err();
        assert!(err.to_string().contains("Longitude -180.5"));
    }

    #[test]
    fn test_validate_rejects_nan() {
        assert!(Coordinates::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_distance_to() {
        let jfk = Coordinates::new(40.6413, -73.7781);
        let lga = Coordinates::new(40.7769, -73.8740);
        assert_eq!(jfk.distance_to(lga), lga.distance_to(jfk));
        assert!((jfk.distance_to(lga) - 9.2).abs() < 0.1);
    }
}
