//! Spherical Web Mercator, the projection behind ArcGIS wkid 3857/102100/102113
//! and the OpenStreetMap tile scheme.

use std::f64::consts::PI;

use crate::bounds::LatLng;

/// Sphere radius used by spherical Mercator, in meters.
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Latitude at which the projected world becomes a square.
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Half the projected world width, in meters.
pub const HALF_WORLD: f64 = PI * EARTH_RADIUS;

/// Projected meters to geographic degrees.
///
/// Exact inverse; `y` values of any magnitude map strictly inside ±90°.
pub fn web_mercator_to_lat_lng(x: f64, y: f64) -> LatLng {
    let lng = (x / EARTH_RADIUS) * (180.0 / PI);
    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0) * (180.0 / PI);
    LatLng::new(lat, lng)
}

/// Geographic degrees to projected meters. Latitude is clamped to
/// `MAX_LATITUDE` since the projection is singular at the poles.
pub fn lat_lng_to_web_mercator(lat_lng: &LatLng) -> (f64, f64) {
    let d = PI / 180.0;
    let lat = lat_lng.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let sin_lat = (lat * d).sin();
    (
        EARTH_RADIUS * lat_lng.lng * d,
        EARTH_RADIUS * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / 2.0,
    )
}
