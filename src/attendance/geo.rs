use crate::attendance::error::AttendanceError;
use crate::attendance::sites::OfficeSite;

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Office tag recorded when no registered site encloses the point.
pub const OUTSIDE_OFFICE: &str = "Outside Office";

/// A validated WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AttendanceError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AttendanceError::InvalidLocation(format!(
                "latitude {} out of range [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AttendanceError::InvalidLocation(format!(
                "longitude {} out of range [-180, 180]",
                longitude
            )));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Parses the `"lat,lon"` string the client sends with every punch.
    pub fn parse(raw: &str) -> Result<Self, AttendanceError> {
        let mut parts = raw.split(',');

        let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(AttendanceError::InvalidLocationFormat(format!(
                "expected \"lat,lon\", got {:?}",
                raw
            )));
        };

        let latitude: f64 = lat.trim().parse().map_err(|_| {
            AttendanceError::InvalidLocationFormat(format!("latitude {:?} is not numeric", lat))
        })?;
        let longitude: f64 = lon.trim().parse().map_err(|_| {
            AttendanceError::InvalidLocationFormat(format!("longitude {:?} is not numeric", lon))
        })?;

        Self::new(latitude, longitude)
    }

    fn of_site(site: &OfficeSite) -> Self {
        Self {
            latitude: site.latitude,
            longitude: site.longitude,
        }
    }
}

/// Great-circle surface distance between two points, in meters.
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let phi_a = a.latitude.to_radians();
    let phi_b = b.latitude.to_radians();
    let d_phi = (b.latitude - a.latitude).to_radians();
    let d_lambda = (b.longitude - a.longitude).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi_a.cos() * phi_b.cos() * (d_lambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_METERS * h.sqrt().asin()
}

/// Returns the first site whose radius encloses the point. Sites may
/// overlap; list order is the tie-break, so repeated calls with the same
/// input always name the same site.
pub fn match_site<'a>(point: &GeoPoint, sites: &'a [OfficeSite]) -> Option<&'a OfficeSite> {
    sites
        .iter()
        .find(|site| haversine_distance(point, &GeoPoint::of_site(site)) <= site.radius_meters)
}

/// Office tag for a matched (or unmatched) punch location.
pub fn office_tag(point: &GeoPoint, sites: &[OfficeSite]) -> String {
    match match_site(point, sites) {
        Some(site) => site.name.clone(),
        None => OUTSIDE_OFFICE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::sites::DEFAULT_SITES;

    fn site(name: &str, lat: f64, lon: f64, radius: f64) -> OfficeSite {
        OfficeSite {
            name: name.to_string(),
            latitude: lat,
            longitude: lon,
            radius_meters: radius,
        }
    }

    #[test]
    fn point_at_site_center_is_inside() {
        let point = GeoPoint::new(12.94198577, 80.21012198).unwrap();
        let matched = match_site(&point, &DEFAULT_SITES).unwrap();
        assert_eq!(matched.name, "Pallikaranai");
    }

    #[test]
    fn far_away_point_is_outside() {
        // Roughly 5 km north of the Pallikaranai office.
        let point = GeoPoint::new(12.98698577, 80.21012198).unwrap();
        assert!(match_site(&point, &DEFAULT_SITES).is_none());
        assert_eq!(office_tag(&point, &DEFAULT_SITES), OUTSIDE_OFFICE);
    }

    #[test]
    fn distance_matches_known_reference() {
        // Chennai Central to Chennai Airport is about 15 km as the crow flies.
        let central = GeoPoint::new(13.0827, 80.2757).unwrap();
        let airport = GeoPoint::new(12.9941, 80.1709).unwrap();
        let d = haversine_distance(&central, &airport);
        assert!((14_500.0..15_500.0).contains(&d), "got {}", d);
    }

    #[test]
    fn distance_is_symmetric_and_zero_at_same_point() {
        let a = GeoPoint::new(12.94198577, 80.21012198).unwrap();
        let b = GeoPoint::new(13.0827, 80.2757).unwrap();
        assert!((haversine_distance(&a, &b) - haversine_distance(&b, &a)).abs() < 1e-6);
        assert!(haversine_distance(&a, &a).abs() < 1e-6);
    }

    #[test]
    fn containment_follows_distance() {
        let center = GeoPoint::new(12.94198577, 80.21012198).unwrap();
        let sites = vec![site("HQ", center.latitude, center.longitude, 200.0)];

        // ~111 m per 0.001 degrees of latitude.
        let inside = GeoPoint::new(center.latitude + 0.001, center.longitude).unwrap();
        let outside = GeoPoint::new(center.latitude + 0.01, center.longitude).unwrap();

        assert!(haversine_distance(&inside, &center) <= 200.0);
        assert!(match_site(&inside, &sites).is_some());

        assert!(haversine_distance(&outside, &center) > 200.0);
        assert!(match_site(&outside, &sites).is_none());
    }

    #[test]
    fn overlapping_sites_resolve_to_first_in_list() {
        let sites = vec![
            site("First", 12.94, 80.21, 500.0),
            site("Second", 12.94, 80.21, 500.0),
        ];
        let point = GeoPoint::new(12.94, 80.21).unwrap();

        for _ in 0..3 {
            assert_eq!(match_site(&point, &sites).unwrap().name, "First");
        }
    }

    #[test]
    fn parse_accepts_spaced_pairs() {
        let point = GeoPoint::parse("12.94198577, 80.21012198").unwrap();
        assert!((point.latitude - 12.94198577).abs() < 1e-9);
        assert!((point.longitude - 80.21012198).abs() < 1e-9);
    }

    #[test]
    fn parse_rejects_malformed_payloads() {
        for raw in ["", "12.94", "12.94,80.21,5", "north,east", "12.94;80.21"] {
            match GeoPoint::parse(raw) {
                Err(AttendanceError::InvalidLocationFormat(_)) => {}
                other => panic!("expected InvalidLocationFormat for {:?}, got {:?}", raw, other),
            }
        }
    }

    #[test]
    fn parse_rejects_out_of_range_coordinates() {
        for raw in ["91.0,80.0", "-91.0,80.0", "12.0,181.0", "12.0,-181.0"] {
            match GeoPoint::parse(raw) {
                Err(AttendanceError::InvalidLocation(_)) => {}
                other => panic!("expected InvalidLocation for {:?}, got {:?}", raw, other),
            }
        }
    }
}
