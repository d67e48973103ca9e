use crate::models::{BoundingBox, Coordinate};

/// Earth's radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Length of one degree of latitude, treated as constant
const LAT_DEGREE_KM: f64 = 110.574;

/// Length of one degree of longitude at the equator
const LON_DEGREE_KM_AT_EQUATOR: f64 = 111.320;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// Out-of-range coordinates are not rejected.
#[inline]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two coordinates in kilometers
#[inline]
pub fn distance_between(from: Coordinate, to: Coordinate) -> f64 {
    distance_km(from.latitude, from.longitude, to.latitude, to.longitude)
}

/// Calculate a bounding box around a center point
///
/// Cheap square envelope used to pre-filter at the store; exact circular
/// filtering happens afterwards with [`distance_km`].
/// 1° latitude ≈ 110.574km, 1° longitude ≈ 111.320km * cos(latitude)
///
/// The longitude span blows up as `lat` approaches ±90°.
pub fn bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / LAT_DEGREE_KM;
    let lon_delta = radius_km / (LON_DEGREE_KM_AT_EQUATOR * lat.to_radians().cos());

    BoundingBox {
        min_lat: lat - lat_delta,
        max_lat: lat + lat_delta,
        min_lon: lon - lon_delta,
        max_lon: lon + lon_delta,
    }
}

/// Bounding box around a coordinate
#[inline]
pub fn bounding_box_around(center: Coordinate, radius_km: f64) -> BoundingBox {
    bounding_box(center.latitude, center.longitude, radius_km)
}
