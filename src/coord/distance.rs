//! Great-circle distance
//!
//! Haversine distance on a spherical Earth, in nautical miles.

use crate::constants::geo::EARTH_RADIUS_NM;
use crate::coord::Coordinates;

/// Calculate the distance between two points in nautical miles (Haversine formula)
///
/// # Arguments
/// * `p1` - First point
/// * `p2` - Second point
///
/// # Returns
/// Distance in nautical miles. NaN components propagate to a NaN result.
pub fn haversine_nm(p1: Coordinates, p2: Coordinates) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let delta_lat = (p2.lat - p1.lat).to_radians();
    let delta_lng = (p2.lng - p1.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_NM * c
}
