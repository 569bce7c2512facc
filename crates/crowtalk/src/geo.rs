//! Great-circle distance helper.
//!
//! Distances are used only for relative ranking of catalog items, never for
//! absolute measurement, so a spherical-earth approximation is sufficient.

use crate::model::Location;

/// Mean earth radius in meters (spherical approximation).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two points, in meters.
///
/// Accuracy is within about 0.5% of the true geodesic distance, which is
/// acceptable for ordering recordings by proximity.
#[must_use]
pub fn haversine_meters(a: Location, b: Location) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    EARTH_RADIUS_M * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}
