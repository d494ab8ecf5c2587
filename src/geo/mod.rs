mod math;

pub use math::{
    circle_polygon, clamp_radius, distance_km, zoom_for_distance, DEFAULT_RING_POINTS,
    EARTH_RADIUS_KM, MAX_RADIUS_M, MIN_RADIUS_M, RADIUS_STEP_M,
};

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("latitude {0} out of range [-90, 90]")]
    InvalidLatitude(f64),
    #[error("longitude {0} out of range [-180, 180]")]
    InvalidLongitude(f64),
}

/// A geodetic position in degrees, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, utoipa::ToSchema)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::InvalidLatitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude.to_radians()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_domain_boundaries() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            Coordinate::new(90.5, 0.0),
            Err(GeoError::InvalidLatitude(90.5))
        );
        assert_eq!(
            Coordinate::new(0.0, -180.5),
            Err(GeoError::InvalidLongitude(-180.5))
        );
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }
}
