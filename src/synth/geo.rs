//! Address and coordinate generation for the Princeton, NJ service area.

use rand::Rng;

use crate::model::{GeoPoint, RawAddress, DEFAULT_COUNTRY};

/// Service area hub latitude.
pub const HUB_LATITUDE: f64 = 40.3573;
/// Service area hub longitude.
pub const HUB_LONGITUDE: f64 = -74.6672;
/// Maximum jitter applied to each axis, in degrees (~5 km).
pub const COORDINATE_VARIATION: f64 = 0.05;

pub const CITY: &str = "Princeton";
pub const REGION: &str = "NJ";
pub const AREA_CODE: &str = "609";
pub const POSTAL_CODES: [&str; 3] = ["08540", "08542", "08541"];

const STREET_NAMES: [&str; 12] = [
    "Nassau St",
    "Witherspoon St",
    "Palmer Sq",
    "University Pl",
    "Washington Rd",
    "Harrison St",
    "Alexander St",
    "Bayard Ln",
    "Prospect Ave",
    "Elm Rd",
    "Faculty Rd",
    "College Rd",
];

/// The hub as a geo-point.
pub fn hub() -> GeoPoint {
    GeoPoint::new(HUB_LONGITUDE, HUB_LATITUDE)
}

/// Random point within the service area.
pub fn generate_point<R: Rng + ?Sized>(rng: &mut R) -> GeoPoint {
    let lat = HUB_LATITUDE + rng.random_range(-COORDINATE_VARIATION..=COORDINATE_VARIATION);
    let lon = HUB_LONGITUDE + rng.random_range(-COORDINATE_VARIATION..=COORDINATE_VARIATION);
    GeoPoint::new(lon, lat)
}

pub fn random_postal_code<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    POSTAL_CODES[rng.random_range(0..POSTAL_CODES.len())]
}

/// Random delivery address in the service area. Carries no location.
pub fn generate_address<R: Rng + ?Sized>(rng: &mut R) -> RawAddress {
    let street = STREET_NAMES[rng.random_range(0..STREET_NAMES.len())];
    RawAddress {
        line1: format!("{} {}", rng.random_range(1..=999), street),
        city: CITY.to_string(),
        region: REGION.to_string(),
        postal_code: random_postal_code(rng).to_string(),
        country_code: Some(DEFAULT_COUNTRY.to_string()),
        location: None,
    }
}

/// Parse a free-text `"line1, City, ST 08542"` address.
///
/// Text with fewer than three comma-separated parts is replaced with a
/// generated address; a missing region or postal code is filled in.
pub fn parse_address<R: Rng + ?Sized>(text: &str, rng: &mut R) -> RawAddress {
    let parts: Vec<&str> = text.split(", ").collect();
    if parts.len() < 3 {
        return generate_address(rng);
    }

    let mut state_zip = parts[2].split_whitespace();
    let region = state_zip.next().unwrap_or(REGION).to_string();
    let postal_code = match state_zip.next() {
        Some(zip) => zip.to_string(),
        None => random_postal_code(rng).to_string(),
    };

    RawAddress {
        line1: parts[0].to_string(),
        city: parts[1].to_string(),
        region,
        postal_code,
        country_code: Some(DEFAULT_COUNTRY.to_string()),
        location: None,
    }
}

/// Random phone number in the service area's area code.
pub fn generate_phone_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("+1{}{}", AREA_CODE, rng.random_range(1_000_000..=9_999_999))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_points_stay_within_variation() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let point = generate_point(&mut rng);
            assert!(point.is_valid());
            assert!((point.latitude() - HUB_LATITUDE).abs() <= COORDINATE_VARIATION + 1e-9);
            assert!((point.longitude() - HUB_LONGITUDE).abs() <= COORDINATE_VARIATION + 1e-9);
        }
    }

    #[test]
    fn test_generated_address_shape() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            let address = generate_address(&mut rng);
            let (number, street) = address.line1.split_once(' ').unwrap();
            let number: u32 = number.parse().unwrap();
            assert!((1..=999).contains(&number));
            assert!(STREET_NAMES.contains(&street));
            assert_eq!(address.city, CITY);
            assert_eq!(address.region, REGION);
            assert!(POSTAL_CODES.contains(&address.postal_code.as_str()));
            assert_eq!(address.country_code.as_deref(), Some("US"));
        }
    }

    #[test]
    fn test_parse_full_address() {
        let mut rng = StdRng::seed_from_u64(1);
        let address = parse_address("11 Witherspoon St, Princeton, NJ 08542", &mut rng);
        assert_eq!(address.line1, "11 Witherspoon St");
        assert_eq!(address.city, "Princeton");
        assert_eq!(address.region, "NJ");
        assert_eq!(address.postal_code, "08542");
    }

    #[test]
    fn test_parse_address_without_zip() {
        let mut rng = StdRng::seed_from_u64(2);
        let address = parse_address("4 Hulfish St, Princeton, NJ", &mut rng);
        assert_eq!(address.region, "NJ");
        assert!(POSTAL_CODES.contains(&address.postal_code.as_str()));
    }

    #[test]
    fn test_parse_short_address_falls_back() {
        let mut rng = StdRng::seed_from_u64(3);
        let address = parse_address("somewhere downtown", &mut rng);
        assert_eq!(address.city, CITY);
        assert!(!address.line1.is_empty());
    }

    #[test]
    fn test_phone_number_format() {
        let mut rng = StdRng::seed_from_u64(4);
        let phone = generate_phone_number(&mut rng);
        assert!(phone.starts_with("+1609"));
        assert_eq!(phone.len(), 12);
        assert!(phone[1..].chars().all(|c| c.is_ascii_digit()));
    }
}
