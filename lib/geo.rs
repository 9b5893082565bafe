//! Nearest-ward lookup.
//!
//! Ward centroids are close enough together that a flat-plane scan is
//! adequate; distances are compared squared, so no square roots.

use crate::types::{GeoPoint, WardInfo};

pub fn squared_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = a.latitude - b.latitude;
    let dlon = a.longitude - b.longitude;
    dlat * dlat + dlon * dlon
}

/// The active ward whose centroid is closest to `point`.
///
/// Ties resolve to the first ward encountered. Inactive wards and wards
/// with unparseable coordinates are skipped. Returns `None` when nothing
/// qualifies.
pub fn nearest_ward(point: GeoPoint, wards: &[WardInfo]) -> Option<u32> {
    let mut best: Option<(u32, f64)> = None;
    for ward in wards.iter().filter(|ward| ward.is_active) {
        let Some(centroid) = ward.centroid() else {
            continue;
        };
        let distance = squared_distance(point, centroid);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((ward.ward, distance)),
        }
    }
    best.map(|(ward, _)| ward)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ward(number: u32, lat: &str, lon: &str, active: bool) -> WardInfo {
        WardInfo {
            ward: number,
            latitude: lat.to_string(),
            longitude: lon.to_string(),
            is_active: active,
        }
    }

    #[test]
    fn picks_the_closest_centroid() {
        let wards = vec![
            ward(1, "0", "0", true),
            ward(2, "10", "10", true),
        ];
        let nearest = nearest_ward(GeoPoint::new(1.0, 1.0), &wards);
        assert_eq!(nearest, Some(1));
    }

    #[test]
    fn ties_resolve_to_the_first_ward() {
        let wards = vec![
            ward(8, "1", "0", true),
            ward(9, "-1", "0", true),
        ];
        let nearest = nearest_ward(GeoPoint::new(0.0, 0.0), &wards);
        assert_eq!(nearest, Some(8));
    }

    #[test]
    fn empty_or_all_inactive_yields_none() {
        assert_eq!(nearest_ward(GeoPoint::new(0.0, 0.0), &[]), None);
        let wards = vec![ward(1, "0", "0", false)];
        assert_eq!(nearest_ward(GeoPoint::new(0.0, 0.0), &wards), None);
    }

    #[test]
    fn inactive_wards_never_win() {
        let wards = vec![
            ward(1, "0", "0", false),
            ward(2, "10", "10", true),
        ];
        let nearest = nearest_ward(GeoPoint::new(1.0, 1.0), &wards);
        assert_eq!(nearest, Some(2));
    }

    #[test]
    fn unparseable_centroids_are_skipped() {
        let wards = vec![
            ward(1, "garbage", "0", true),
            ward(2, "5", "5", true),
        ];
        let nearest = nearest_ward(GeoPoint::new(0.0, 0.0), &wards);
        assert_eq!(nearest, Some(2));
    }
}
