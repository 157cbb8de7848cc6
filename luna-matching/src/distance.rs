use luna_shared::types::User;

/// Haversine distance in km between two lat/lng points.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const R: f64 = 6371.0; // Earth radius in km
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    R * c
}

/// Distance in km between two users, or `None` when either has no shared
/// location. Respects `share_location`: a user who opted out is treated as
/// having no location.
pub fn distance_between(a: &User, b: &User) -> Option<f64> {
    let loc_a = a.location.filter(|_| a.share_location)?;
    let loc_b = b.location.filter(|_| b.share_location)?;
    Some(haversine_km(loc_a.lat, loc_a.lon, loc_b.lat, loc_b.lon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use luna_shared::types::{Gender, GeoPoint};

    fn located_user(id: i64, point: Option<GeoPoint>, share: bool) -> User {
        User {
            id,
            username: format!("user{id}"),
            name: format!("User {id}"),
            email: format!("user{id}@example.com"),
            age: 25,
            gender: Gender::Male,
            bio: String::new(),
            photo_urls: vec![],
            is_verified: false,
            is_premium: false,
            is_blocked: false,
            ban_reason: None,
            is_age_verified: false,
            age_verification_request_id: None,
            last_login: 0,
            share_location: share,
            location: point,
            city: None,
        }
    }

    #[test]
    fn zero_distance_for_same_point() {
        assert!(haversine_km(55.7558, 37.6176, 55.7558, 37.6176) < 0.01);
    }

    #[test]
    fn moscow_to_saint_petersburg_is_about_630_km() {
        let km = haversine_km(55.7558, 37.6176, 59.9343, 30.3351);
        assert!(km > 600.0 && km < 660.0, "got {km}");
    }

    #[test]
    fn missing_or_withheld_location_yields_none() {
        let point = GeoPoint { lat: 55.7558, lon: 37.6176 };
        let a = located_user(1, Some(point), true);
        let b = located_user(2, None, true);
        let c = located_user(3, Some(point), false);

        assert!(distance_between(&a, &b).is_none());
        assert!(distance_between(&a, &c).is_none());
        assert!(distance_between(&a, &a).is_some());
    }
}
