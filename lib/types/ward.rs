use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::types::GeoPoint;

/// A registered ward with its centroid coordinates.
///
/// Coordinates are decimal strings as the contract stores them; `centroid`
/// parses them on demand and records with unparseable values simply have no
/// centroid.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct WardInfo {
    pub ward: u32,
    pub latitude: String,
    pub longitude: String,
    pub is_active: bool,
}

impl WardInfo {
    pub fn centroid(&self) -> Option<GeoPoint> {
        let latitude = self.latitude.trim().parse().ok()?;
        let longitude = self.longitude.trim().parse().ok()?;
        Some(GeoPoint {
            latitude,
            longitude,
        })
    }
}

/// Councillor registration for a ward.
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
pub struct WardCouncillor {
    pub ward: u32,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_parses_decimal_strings() {
        let ward = WardInfo {
            ward: 3,
            latitude: " 10.5 ".to_string(),
            longitude: "-0.25".to_string(),
            is_active: true,
        };
        let point = ward.centroid().unwrap();
        assert!((point.latitude - 10.5).abs() < f64::EPSILON);
        assert!((point.longitude + 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn centroid_is_none_for_bad_coordinates() {
        let ward = WardInfo {
            ward: 3,
            latitude: "ten".to_string(),
            longitude: "0".to_string(),
            is_active: true,
        };
        assert!(ward.centroid().is_none());
    }
}
