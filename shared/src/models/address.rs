//! Delivery address and delivery partner models

use crate::money::lenient_f64;
use serde::{Deserialize, Serialize};

/// A saved delivery address
///
/// Immutable once fetched; the checkout flow selects one, it never
/// edits it in place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryAddress {
    pub id: i64,
    /// Latitude in decimal degrees (lenient: backend may send a string)
    #[serde(deserialize_with = "lenient_f64", default)]
    pub latitude: f64,
    /// Longitude in decimal degrees
    #[serde(deserialize_with = "lenient_f64", default)]
    pub longitude: f64,
    /// Free-text descriptor ("Home", street address, ...)
    #[serde(default)]
    pub address: String,
}

impl DeliveryAddress {
    /// Coordinates as a pair, if both are present and finite
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        (self.latitude.is_finite()
            && self.longitude.is_finite()
            && (self.latitude, self.longitude) != (0.0, 0.0))
            .then_some((self.latitude, self.longitude))
    }
}

/// Delivery partner assigned to an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeliveryPerson {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_address_string_coordinates() {
        let addr: DeliveryAddress = serde_json::from_value(json!({
            "id": 3,
            "latitude": "28.6139",
            "longitude": 77.2090,
            "address": "Connaught Place"
        }))
        .unwrap();
        assert_eq!(addr.coordinates(), Some((28.6139, 77.209)));
    }

    #[test]
    fn test_address_missing_coordinates() {
        // A zeroed pair means the backend never geocoded the address
        let addr: DeliveryAddress =
            serde_json::from_value(json!({"id": 4, "address": "No pin"})).unwrap();
        assert_eq!(addr.coordinates(), None);
    }
}
