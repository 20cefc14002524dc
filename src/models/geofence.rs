use sqlx::FromRow;
use uuid::Uuid;

use crate::geo_utils;

/// A circular zone configured by a company admin (risk areas, loading bays).
#[derive(Debug, Clone, FromRow)]
pub struct Geofence {
    pub geofence_id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub radius_m: f64,
    pub kind: String, // 'danger' | 'warning'
    pub active: bool,
}

impl Geofence {
    /// A position is inside the zone iff its great-circle distance to the
    /// center is under the radius.
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        geo_utils::haversine_distance_m(self.lat, self.lng, lat, lng) < self.radius_m
    }

    pub fn severity(&self) -> i16 {
        if self.kind == "danger" {
            2
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(radius_m: f64, kind: &str) -> Geofence {
        Geofence {
            geofence_id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: "Zona de Explosivos A".to_string(),
            lat: -23.6550,
            lng: -70.4020,
            radius_m,
            kind: kind.to_string(),
            active: true,
        }
    }

    #[test]
    fn contains_center_and_nearby_point() {
        let gf = zone(200.0, "danger");
        assert!(gf.contains(gf.lat, gf.lng));
        // ~111m north of the center
        assert!(gf.contains(gf.lat + 0.001, gf.lng));
    }

    #[test]
    fn excludes_point_beyond_radius() {
        let gf = zone(200.0, "warning");
        // ~1.1km north of the center
        assert!(!gf.contains(gf.lat + 0.01, gf.lng));
    }

    #[test]
    fn severity_follows_zone_kind() {
        assert_eq!(zone(200.0, "danger").severity(), 2);
        assert_eq!(zone(200.0, "warning").severity(), 1);
    }
}
