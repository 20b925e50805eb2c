//! GPS resolution
//!
//! Strategies are tried strictly in order and the first one producing a
//! valid coordinate wins:
//!
//! 1. Vendor location blocks (`Apple.Location.Latitude`, ...)
//! 2. XMP location block (`xmp.Location.Latitude`)
//! 3. Standard EXIF `GPSLatitude`/`GPSLongitude` at root, signed by their refs
//! 4. Generic GPS containers (`GPS`, `gps`, `GPSInfo`, ...)
//! 5. GeoJSON-style `[lon, lat]` coordinate arrays
//!
//! `(0, 0)` is treated as a placeholder and rejected, except when it comes
//! from explicit standard EXIF tags (strategy 3).

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::normalize::parse_float_prefix;
use crate::resolver::resolve_in;
use crate::tag_bag::{RawValue, TagBag, TagMap, TagValue};

/// Vendors checked for a `Location` block, Apple first.
pub const LOCATION_VENDORS: &[&str] = &[
    "Apple", "Samsung", "Huawei", "Google", "Xiaomi", "OnePlus", "Oppo", "Vivo", "Motorola", "Honor",
    "Sony",
];

/// Root keys of generic GPS containers, followed by `exif.GPS`.
pub const GPS_CONTAINER_PATHS: &[&[&str]] = &[
    &["GPS"],
    &["gps"],
    &["GPSInfo"],
    &["GPS Info"],
    &["exif", "GPS"],
];

const LATITUDE_KEYS: &[&str] = &["GPSLatitude", "Latitude", "latitude", "lat", "Lat"];
const LONGITUDE_KEYS: &[&str] = &["GPSLongitude", "Longitude", "longitude", "lon", "lng", "Lon"];
const LATITUDE_REF_KEYS: &[&str] = &["GPSLatitudeRef", "LatitudeRef", "latitudeRef", "LatRef"];
const LONGITUDE_REF_KEYS: &[&str] = &["GPSLongitudeRef", "LongitudeRef", "longitudeRef", "LonRef"];

/// A validated latitude/longitude pair in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Validate a candidate pair. `allow_origin` admits `(0, 0)`.
    pub fn new(latitude: f64, longitude: f64, allow_origin: bool) -> Option<Self> {
        let in_range = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        let is_origin = latitude == 0.0 && longitude == 0.0;
        if in_range && (allow_origin || !is_origin) {
            Some(Self { latitude, longitude })
        } else {
            None
        }
    }

    /// e.g. `40° 26' 46.30" N, 79° 58' 56.00" W`
    pub fn to_dms_string(&self) -> String {
        fn part(value: f64, pos: char, neg: char) -> String {
            let hemisphere = if value < 0.0 { neg } else { pos };
            let abs = value.abs();
            let degrees = abs.trunc();
            let minutes_full = (abs - degrees) * 60.0;
            let minutes = minutes_full.trunc();
            let seconds = (minutes_full - minutes) * 60.0;
            format!("{}° {}' {:.2}\" {}", degrees, minutes, seconds, hemisphere)
        }
        format!(
            "{}, {}",
            part(self.latitude, 'N', 'S'),
            part(self.longitude, 'E', 'W')
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GpsStrategy {
    VendorLocation,
    XmpLocation,
    StandardExif,
    NestedContainer,
    CoordinateArray,
}

impl GpsStrategy {
    pub const ALL: [GpsStrategy; 5] = [
        GpsStrategy::VendorLocation,
        GpsStrategy::XmpLocation,
        GpsStrategy::StandardExif,
        GpsStrategy::NestedContainer,
        GpsStrategy::CoordinateArray,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GpsStrategy::VendorLocation => "vendor_location",
            GpsStrategy::XmpLocation => "xmp_location",
            GpsStrategy::StandardExif => "standard_exif",
            GpsStrategy::NestedContainer => "nested_container",
            GpsStrategy::CoordinateArray => "coordinate_array",
        }
    }

    fn allows_origin(&self) -> bool {
        matches!(self, GpsStrategy::StandardExif)
    }
}

impl fmt::Display for GpsStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate pair that failed the validity gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RejectedCandidate {
    pub strategy: GpsStrategy,
    pub latitude: f64,
    pub longitude: f64,
}

/// Outcome of the strategy chain, with the rejections seen along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpsResolution {
    pub coordinate: Option<GeoCoordinate>,
    pub strategy: Option<GpsStrategy>,
    pub rejected: Vec<RejectedCandidate>,
}

pub fn resolve_gps(bag: &TagBag) -> Option<GeoCoordinate> {
    resolve_gps_detailed(bag).coordinate
}

pub fn resolve_gps_detailed(bag: &TagBag) -> GpsResolution {
    let mut resolution = GpsResolution::default();
    for strategy in GpsStrategy::ALL {
        for (latitude, longitude) in candidates(bag, strategy) {
            match GeoCoordinate::new(latitude, longitude, strategy.allows_origin()) {
                Some(coordinate) => {
                    resolution.coordinate = Some(coordinate);
                    resolution.strategy = Some(strategy);
                    return resolution;
                }
                None => resolution.rejected.push(RejectedCandidate { strategy, latitude, longitude }),
            }
        }
    }
    resolution
}

/// Candidate pairs a strategy yields, in the order it checks them.
fn candidates(bag: &TagBag, strategy: GpsStrategy) -> Vec<(f64, f64)> {
    match strategy {
        GpsStrategy::VendorLocation => LOCATION_VENDORS
            .iter()
            .flat_map(|&vendor| {
                let lower = vendor.to_lowercase();
                [
                    location_block(bag, &[vendor, "Location"]),
                    location_block(bag, &[lower.as_str(), "Location"]),
                    location_block(bag, &["makerNotes", vendor, "Location"]),
                ]
            })
            .flatten()
            .collect(),
        GpsStrategy::XmpLocation => location_block(bag, &["xmp", "Location"]).into_iter().collect(),
        GpsStrategy::StandardExif => standard_exif(bag).into_iter().collect(),
        GpsStrategy::NestedContainer => GPS_CONTAINER_PATHS
            .iter()
            .filter_map(|path| bag.map_at(path))
            .filter_map(nested_container)
            .collect(),
        GpsStrategy::CoordinateArray => coordinate_arrays(bag),
    }
}

fn location_block(bag: &TagBag, path: &[&str]) -> Option<(f64, f64)> {
    let block = bag.map_at(path)?;
    let latitude = resolve_in(block, &["Latitude"]).and_then(|v| float_value(&v))?;
    let longitude = resolve_in(block, &["Longitude"]).and_then(|v| float_value(&v))?;
    Some((latitude, longitude))
}

fn standard_exif(bag: &TagBag) -> Option<(f64, f64)> {
    let root = bag.root();
    let latitude = resolve_in(root, &["GPSLatitude"]).and_then(|v| convert_coordinate(&v))?;
    let longitude = resolve_in(root, &["GPSLongitude"]).and_then(|v| convert_coordinate(&v))?;
    let lat_ref = resolve_in(root, &["GPSLatitudeRef"]).map(|v| v.to_string());
    let lon_ref = resolve_in(root, &["GPSLongitudeRef"]).map(|v| v.to_string());
    Some((
        apply_hemisphere(latitude, lat_ref.as_deref(), 'S'),
        apply_hemisphere(longitude, lon_ref.as_deref(), 'W'),
    ))
}

fn nested_container(container: &TagMap) -> Option<(f64, f64)> {
    let latitude = resolve_in(container, LATITUDE_KEYS).and_then(|v| convert_coordinate(&v))?;
    let longitude = resolve_in(container, LONGITUDE_KEYS).and_then(|v| convert_coordinate(&v))?;
    let lat_ref = resolve_in(container, LATITUDE_REF_KEYS)
        .map(|v| v.to_string())
        .unwrap_or_else(|| "N".to_string());
    let lon_ref = resolve_in(container, LONGITUDE_REF_KEYS)
        .map(|v| v.to_string())
        .unwrap_or_else(|| "E".to_string());
    Some((
        apply_hemisphere(latitude, Some(&lat_ref), 'S'),
        apply_hemisphere(longitude, Some(&lon_ref), 'W'),
    ))
}

/// `location.coordinates`, then bare `coordinates`.
fn coordinate_arrays(bag: &TagBag) -> Vec<(f64, f64)> {
    [bag.walk(&["location", "coordinates"]), bag.get("coordinates")]
        .into_iter()
        .flatten()
        .filter_map(coordinate_array)
        .collect()
}

/// GeoJSON order: index 0 is longitude, index 1 latitude.
fn coordinate_array(node: &TagValue) -> Option<(f64, f64)> {
    match RawValue::locate_typed(node)? {
        RawValue::Array(items) if items.len() >= 2 => {
            let longitude = float_value(&items[0])?;
            let latitude = float_value(&items[1])?;
            Some((latitude, longitude))
        }
        _ => None,
    }
}

fn float_value(raw: &RawValue) -> Option<f64> {
    match raw {
        RawValue::Number(n) => Some(*n),
        RawValue::Text(s) => parse_float_prefix(s),
        RawValue::Array(_) => None,
    }
}

/// First letter of a ref (`"S"`, `"South latitude"`) in upper case.
fn hemisphere_letter(reference: &str) -> Option<char> {
    reference
        .trim()
        .trim_matches('"')
        .trim()
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
}

/// A ref matching `negative` forces a negative sign regardless of the raw
/// sign; any other ref leaves the value untouched.
pub fn apply_hemisphere(value: f64, reference: Option<&str>, negative: char) -> f64 {
    match reference.and_then(hemisphere_letter) {
        Some(letter) if letter == negative => -value.abs(),
        _ => value,
    }
}

// ============================================================================
// Coordinate conversion
// ============================================================================

/// Convert a number, DMS array or formatted string to decimal degrees.
pub fn convert_coordinate(raw: &RawValue) -> Option<f64> {
    let value = match raw {
        RawValue::Number(n) => Some(*n),
        RawValue::Array(items) => {
            let parts = items.iter().map(component_value).collect::<Option<Vec<f64>>>()?;
            weigh(&parts)
        }
        RawValue::Text(s) => convert_str(s),
    }?;
    value.is_finite().then_some(value)
}

/// One DMS array element: a number, a numeric string, or a `[num, den]`
/// rational.
fn component_value(raw: &RawValue) -> Option<f64> {
    match raw {
        RawValue::Number(n) => Some(*n),
        RawValue::Text(s) => parse_rational(s),
        RawValue::Array(pair) => match pair.as_slice() {
            [RawValue::Number(num), RawValue::Number(den)] if *den != 0.0 => Some(num / den),
            [single] => component_value(single),
            _ => None,
        },
    }
}

fn parse_rational(s: &str) -> Option<f64> {
    let s = s.trim();
    match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => s.parse().ok(),
    }
}

/// `|d| + m/60 + s/3600` over however many parts are present, carrying the
/// sign of the degrees.
fn weigh(parts: &[f64]) -> Option<f64> {
    let (degrees, rest) = parts.split_first()?;
    let magnitude = rest
        .iter()
        .take(2)
        .zip([60.0_f64, 3600.0])
        .fold(degrees.abs(), |acc, (part, scale)| acc + part / scale);
    if degrees.is_sign_negative() {
        Some(-magnitude)
    } else {
        Some(magnitude)
    }
}

fn convert_str(s: &str) -> Option<f64> {
    let s = s.trim().trim_matches('"').trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<f64>() {
        return Some(v);
    }

    let value = parse_dms_pattern(s)
        .or_else(|| parse_comma_decimal(s))
        .or_else(|| parse_rational_list(s))
        .or_else(|| parse_number_groups(s))?;

    match trailing_hemisphere(s) {
        Some('S') | Some('W') => Some(-value.abs()),
        _ => Some(value),
    }
}

fn trailing_hemisphere(s: &str) -> Option<char> {
    s.trim_end()
        .chars()
        .last()
        .filter(|c| matches!(c, 'N' | 'S' | 'E' | 'W'))
}

static DMS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"^(-?\d+(?:\.\d+)?)\s*(?:°|º|deg)\s*"#,
        r#"(\d+(?:\.\d+)?)\s*(?:'|′|’)\s*"#,
        r#"(\d+(?:\.\d+)?)\s*(?:"|″|''|”)?\s*[NSEW]?$"#,
    ))
    .expect("DMS regex should compile")
});

static COMMA_DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d+),(\d+)\s*[NSEW]?$").expect("comma decimal regex should compile")
});

static NON_NUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\d.]+").expect("separator regex should compile"));

/// `D° M' S"` and `D deg M' S"`, optionally followed by a hemisphere letter.
fn parse_dms_pattern(s: &str) -> Option<f64> {
    let caps = DMS_PATTERN.captures(s)?;
    let parts = (1..=3)
        .map(|i| caps.get(i)?.as_str().parse().ok())
        .collect::<Option<Vec<f64>>>()?;
    weigh(&parts)
}

/// `-12,5` style decimals, optionally followed by a hemisphere letter.
fn parse_comma_decimal(s: &str) -> Option<f64> {
    let caps = COMMA_DECIMAL.captures(s)?;
    format!("{}.{}", &caps[1], &caps[2]).parse().ok()
}

/// `40/1, 26/1, 4620/100`
fn parse_rational_list(s: &str) -> Option<f64> {
    if !s.contains('/') {
        return None;
    }
    let parts = s
        .split(',')
        .map(parse_rational)
        .collect::<Option<Vec<f64>>>()?;
    weigh(&parts)
}

/// Last resort: every numeric run in order, weighted as DMS.
fn parse_number_groups(s: &str) -> Option<f64> {
    let groups: Vec<f64> = NON_NUMERIC
        .split(s)
        .filter(|g| !g.is_empty() && *g != ".")
        .filter_map(|g| g.parse().ok())
        .collect();
    let value = weigh(&groups)?;
    if s.trim_start().starts_with('-') {
        Some(-value)
    } else {
        Some(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmsStyle {
    /// `40° 26' 46.2"`
    Symbol,
    /// `40 deg 26' 46.2"`
    Deg,
}

pub fn format_dms(degrees: f64, minutes: f64, seconds: f64, style: DmsStyle) -> String {
    match style {
        DmsStyle::Symbol => format!("{}° {}' {}\"", degrees, minutes, seconds),
        DmsStyle::Deg => format!("{} deg {}' {}\"", degrees, minutes, seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: serde_json::Value) -> TagBag {
        TagBag::from_json(&value).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_convert_arrays() {
        let dms = RawValue::Array(vec![
            RawValue::Number(40.0),
            RawValue::Number(26.0),
            RawValue::Number(46.2),
        ]);
        assert!(close(convert_coordinate(&dms).unwrap(), 40.0 + 26.0 / 60.0 + 46.2 / 3600.0));

        let dm = RawValue::Array(vec![RawValue::Number(40.0), RawValue::Number(30.0)]);
        assert!(close(convert_coordinate(&dm).unwrap(), 40.5));

        let rationals = RawValue::Array(vec![
            RawValue::Array(vec![RawValue::Number(40.0), RawValue::Number(1.0)]),
            RawValue::Array(vec![RawValue::Number(30.0), RawValue::Number(1.0)]),
            RawValue::Array(vec![RawValue::Number(3600.0), RawValue::Number(100.0)]),
        ]);
        assert!(close(convert_coordinate(&rationals).unwrap(), 40.51));

        assert_eq!(convert_coordinate(&RawValue::Array(vec![])), None);
        assert_eq!(
            convert_coordinate(&RawValue::Array(vec![RawValue::Text("north".into())])),
            None
        );
    }

    #[test]
    fn test_convert_strings() {
        let t = |s: &str| convert_coordinate(&RawValue::Text(s.to_string()));
        assert_eq!(t("51.5074"), Some(51.5074));
        assert!(close(t("40° 26' 46\"").unwrap(), 40.0 + 26.0 / 60.0 + 46.0 / 3600.0));
        assert!(close(t("40 deg 26' 46\"").unwrap(), 40.0 + 26.0 / 60.0 + 46.0 / 3600.0));
        assert_eq!(t("12,5"), Some(12.5));
        assert_eq!(t("12,5 S"), Some(-12.5));
        assert_eq!(t("-7,25"), Some(-7.25));
        assert!(close(t("40 deg 30 min 0 sec").unwrap(), 40.5));
        assert!(close(t("40/1, 30/1, 0/1").unwrap(), 40.5));
        assert!(close(t("40,30.0N").unwrap(), 40.5));
        assert!(close(t("73° 58' 0\" W").unwrap(), -(73.0 + 58.0 / 60.0)));
        assert_eq!(t("nowhere"), None);
        assert_eq!(t(""), None);
    }

    #[test]
    fn test_dms_round_trip() {
        for (d, m, s) in [(40.0, 26.0, 46.2), (0.0, 0.0, 1.5), (179.0, 59.0, 59.99), (33.0, 52.0, 4.0)] {
            let expected = d + m / 60.0 + s / 3600.0;
            for style in [DmsStyle::Symbol, DmsStyle::Deg] {
                let text = format_dms(d, m, s, style);
                let got = convert_coordinate(&RawValue::Text(text.clone())).unwrap();
                assert!(close(got, expected), "{} -> {}", text, got);
            }
        }
    }

    #[test]
    fn test_hemisphere_is_absolute() {
        assert_eq!(apply_hemisphere(33.8, Some("S"), 'S'), -33.8);
        assert_eq!(apply_hemisphere(-33.8, Some("S"), 'S'), -33.8);
        assert_eq!(apply_hemisphere(-33.8, Some("N"), 'S'), -33.8);
        assert_eq!(apply_hemisphere(151.2, Some("West longitude"), 'W'), -151.2);
        assert_eq!(apply_hemisphere(151.2, None, 'W'), 151.2);
    }

    #[test]
    fn test_standard_exif_south_west() {
        for sign in [1.0, -1.0] {
            let b = bag(json!({
                "GPSLatitude": [sign * 33.0, 52.0, 4.0],
                "GPSLatitudeRef": "S",
                "GPSLongitude": [sign * 151.0, 12.0, 36.0],
                "GPSLongitudeRef": {"value": ["W"], "description": "West longitude"}
            }));
            let gps = resolve_gps(&b).unwrap();
            assert!(close(gps.latitude, -(33.0 + 52.0 / 60.0 + 4.0 / 3600.0)), "{:?}", gps);
            assert!(close(gps.longitude, -151.21), "{:?}", gps);
        }
    }

    #[test]
    fn test_signed_degrees_carry_whole_magnitude() {
        let array = RawValue::Array(vec![
            RawValue::Number(-33.0),
            RawValue::Number(52.0),
            RawValue::Number(4.0),
        ]);
        let text = RawValue::Text("-33° 52' 4\"".to_string());
        let expected = -(33.0 + 52.0 / 60.0 + 4.0 / 3600.0);
        assert!(close(convert_coordinate(&array).unwrap(), expected));
        assert!(close(convert_coordinate(&text).unwrap(), expected));
        assert!(close(
            convert_coordinate(&RawValue::Text("-40/1, 30/1, 0/1".into())).unwrap(),
            -40.5
        ));
    }

    #[test]
    fn test_origin_accepted_from_standard_tags() {
        let b = bag(json!({"GPSLatitude": [0, 0, 0], "GPSLongitude": [0, 0, 0]}));
        let res = resolve_gps_detailed(&b);
        assert_eq!(res.coordinate, Some(GeoCoordinate { latitude: 0.0, longitude: 0.0 }));
        assert_eq!(res.strategy, Some(GpsStrategy::StandardExif));
    }

    #[test]
    fn test_origin_rejected_elsewhere() {
        let b = bag(json!({"location": {"coordinates": [0, 0]}}));
        let res = resolve_gps_detailed(&b);
        assert_eq!(res.coordinate, None);
        assert_eq!(res.rejected.len(), 1);
        assert_eq!(res.rejected[0].strategy, GpsStrategy::CoordinateArray);

        let b = bag(json!({"Apple": {"Location": {"Latitude": "0", "Longitude": "0"}}}));
        assert_eq!(resolve_gps(&b), None);
    }

    #[test]
    fn test_vendor_block_beats_standard_tags() {
        let b = bag(json!({
            "makerNotes": {"Samsung": {"Location": {"Latitude": "37.5665", "Longitude": "126.978"}}},
            "GPSLatitude": [10, 0, 0],
            "GPSLongitude": [20, 0, 0]
        }));
        let res = resolve_gps_detailed(&b);
        assert_eq!(res.strategy, Some(GpsStrategy::VendorLocation));
        assert_eq!(res.coordinate, Some(GeoCoordinate { latitude: 37.5665, longitude: 126.978 }));
    }

    #[test]
    fn test_sony_location_block() {
        let b = bag(json!({"makerNotes": {"Sony": {"Location": {"Latitude": 35.6586, "Longitude": 139.7454}}}}));
        let res = resolve_gps_detailed(&b);
        assert_eq!(res.strategy, Some(GpsStrategy::VendorLocation));
        assert_eq!(res.coordinate, Some(GeoCoordinate { latitude: 35.6586, longitude: 139.7454 }));
    }

    #[test]
    fn test_xmp_location() {
        let b = bag(json!({"xmp": {"Location": {"Latitude": {"value": "48.8584", "description": "48.8584"}, "Longitude": 2.2945}}}));
        assert_eq!(resolve_gps(&b), Some(GeoCoordinate { latitude: 48.8584, longitude: 2.2945 }));
    }

    #[test]
    fn test_nested_container_defaults_refs() {
        let b = bag(json!({"gps": {"Latitude": -33.8688, "Longitude": 151.2093}}));
        let res = resolve_gps_detailed(&b);
        assert_eq!(res.strategy, Some(GpsStrategy::NestedContainer));
        assert_eq!(res.coordinate, Some(GeoCoordinate { latitude: -33.8688, longitude: 151.2093 }));

        let b = bag(json!({"exif": {"GPS": {"GPSLatitude": "35° 39' 31\"", "GPSLatitudeRef": "N", "lng": "139,7", "LonRef": "W"}}}));
        let gps = resolve_gps(&b).unwrap();
        assert!(gps.latitude > 35.6 && gps.latitude < 35.7);
        assert!(close(gps.longitude, -139.7));
    }

    #[test]
    fn test_coordinate_array_order() {
        let b = bag(json!({"coordinates": ["2.3522", "48.8566"]}));
        assert_eq!(resolve_gps(&b), Some(GeoCoordinate { latitude: 48.8566, longitude: 2.3522 }));
    }

    #[test]
    fn test_bare_coordinates_after_invalid_location_array() {
        let b = bag(json!({
            "location": {"coordinates": [200.0, 95.0]},
            "coordinates": [2.3522, 48.8566]
        }));
        let res = resolve_gps_detailed(&b);
        assert_eq!(res.coordinate, Some(GeoCoordinate { latitude: 48.8566, longitude: 2.3522 }));
        assert_eq!(res.rejected.len(), 1);
        assert_eq!(res.rejected[0].strategy, GpsStrategy::CoordinateArray);
    }

    #[test]
    fn test_out_of_range_falls_through() {
        let b = bag(json!({
            "GPSLatitude": 95.0,
            "GPSLongitude": 10.0,
            "coordinates": [10.0, 45.0]
        }));
        let res = resolve_gps_detailed(&b);
        assert_eq!(res.strategy, Some(GpsStrategy::CoordinateArray));
        assert_eq!(res.rejected[0].strategy, GpsStrategy::StandardExif);
    }

    #[test]
    fn test_dms_display() {
        let c = GeoCoordinate { latitude: -33.5, longitude: 151.25 };
        assert_eq!(c.to_dms_string(), "33° 30' 0.00\" S, 151° 15' 0.00\" E");
    }
}
