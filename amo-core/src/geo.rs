//! Great-circle distance between two coordinates
//!
//! Haversine over a spherical Earth. Good to well under a percent at
//! city delivery ranges, which is all the fee tiers need.

/// Mean Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance in kilometers between two points given in decimal degrees
///
/// Inputs are expected to be finite; callers holding an unselected or
/// un-geocoded address must skip fee computation instead of calling
/// this with placeholder coordinates.
pub fn distance_km(origin_lat: f64, origin_lng: f64, dest_lat: f64, dest_lng: f64) -> f64 {
    let d_lat = (dest_lat - origin_lat).to_radians();
    let d_lng = (dest_lng - origin_lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + origin_lat.to_radians().cos() * dest_lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
