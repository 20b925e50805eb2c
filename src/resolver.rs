//! Field resolver
//!
//! Searches a [`TagBag`] for the first value matching any of a field's
//! candidate keys. Locations come from [`SEARCH_TABLE`], tried strictly in
//! order: root, then known sub-namespaces, then deep vendor paths. The first
//! hit anywhere wins, even if a deeper location holds a "better" value.

use crate::tag_bag::{RawValue, TagBag, TagMap};

/// Search tier of a location. Table order already encodes priority; the
/// tier is kept for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Root,
    Namespace,
    DeepPath,
}

#[derive(Debug, Clone, Copy)]
pub struct SearchLocation {
    pub tier: Tier,
    pub path: &'static [&'static str],
}

const fn root() -> SearchLocation {
    SearchLocation { tier: Tier::Root, path: &[] }
}

const fn ns(path: &'static [&'static str]) -> SearchLocation {
    SearchLocation { tier: Tier::Namespace, path }
}

const fn deep(path: &'static [&'static str]) -> SearchLocation {
    SearchLocation { tier: Tier::DeepPath, path }
}

/// Every location the resolver visits, in priority order.
pub const SEARCH_TABLE: &[SearchLocation] = &[
    root(),
    // Standard namespaces
    ns(&["xmp"]),
    ns(&["exif"]),
    ns(&["gps"]),
    ns(&["ifd0"]),
    ns(&["ifd1"]),
    ns(&["iptc"]),
    ns(&["interop"]),
    ns(&["makerNotes"]),
    // Manufacturer namespaces
    ns(&["apple"]),
    ns(&["samsung"]),
    ns(&["huawei"]),
    ns(&["google"]),
    ns(&["xiaomi"]),
    ns(&["sony"]),
    ns(&["oppo"]),
    ns(&["vivo"]),
    ns(&["oneplus"]),
    ns(&["motorola"]),
    ns(&["canon"]),
    ns(&["nikon"]),
    ns(&["fujifilm"]),
    ns(&["olympus"]),
    ns(&["panasonic"]),
    // Vendor-specific deep paths
    deep(&["makerNotes", "Apple"]),
    deep(&["makerNotes", "Apple", "GPS"]),
    deep(&["makerNotes", "Samsung"]),
    deep(&["makerNotes", "Samsung", "GPS"]),
    deep(&["makerNotes", "Huawei"]),
    deep(&["makerNotes", "Huawei", "GPS"]),
    deep(&["makerNotes", "Google"]),
    deep(&["makerNotes", "Xiaomi"]),
    deep(&["makerNotes", "Sony"]),
    deep(&["xmp", "exif"]),
    deep(&["xmp", "tiff"]),
    deep(&["xmp", "aux"]),
    deep(&["exif", "GPS"]),
    deep(&["exif", "MakerNote"]),
];

/// Scan one map for the candidate keys in order.
pub fn resolve_in(map: &TagMap, keys: &[&str]) -> Option<RawValue> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find_map(RawValue::locate)
}

/// Resolve a field across the whole search table.
pub fn resolve(bag: &TagBag, keys: &[&str]) -> Option<RawValue> {
    resolve_located(bag, keys).map(|(_, value)| value)
}

/// Resolve and report where the value was found.
pub fn resolve_located(bag: &TagBag, keys: &[&str]) -> Option<(&'static SearchLocation, RawValue)> {
    SEARCH_TABLE.iter().find_map(|location| {
        let map = bag.map_at(location.path)?;
        resolve_in(map, keys).map(|value| (location, value))
    })
}

/// Candidate keys per logical field, highest priority first.
pub mod fields {
    pub const DATE_TIME: &[&str] = &[
        "DateTimeOriginal",
        "DateTime",
        "CreateDate",
        "DateCreated",
        "DateTimeDigitized",
        "ModifyDate",
    ];
    pub const MAKE: &[&str] = &["Make", "make", "Manufacturer"];
    pub const MODEL: &[&str] = &["Model", "model", "CameraModelName"];
    pub const EXPOSURE: &[&str] = &["ExposureTime", "exposureTime", "ShutterSpeed"];
    pub const F_NUMBER: &[&str] = &["FNumber", "fNumber", "ApertureValue", "Aperture"];
    pub const ISO: &[&str] = &[
        "ISOSpeedRatings",
        "ISO",
        "PhotographicSensitivity",
        "ISOSpeed",
        "RecommendedExposureIndex",
    ];
    pub const FOCAL_LENGTH: &[&str] = &["FocalLength", "focalLength", "FocalLengthIn35mmFilm"];
    pub const SOFTWARE: &[&str] = &["Software", "ProcessingSoftware", "CreatorTool"];
    pub const ORIENTATION: &[&str] = &["Orientation", "orientation"];
    pub const WIDTH: &[&str] = &[
        "PixelXDimension",
        "ImageWidth",
        "ExifImageWidth",
        "Image Width",
    ];
    pub const HEIGHT: &[&str] = &[
        "PixelYDimension",
        "ImageHeight",
        "ImageLength",
        "ExifImageHeight",
        "Image Height",
    ];
    pub const WHITE_BALANCE: &[&str] = &["WhiteBalance", "whiteBalance"];
    pub const FLASH: &[&str] = &["Flash", "flash"];
    pub const LENS: &[&str] = &["LensModel", "Lens", "LensID", "LensType"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: serde_json::Value) -> TagBag {
        TagBag::from_json(&value).unwrap()
    }

    #[test]
    fn test_table_tiers_are_ordered() {
        assert_eq!(SEARCH_TABLE[0].tier, Tier::Root);
        assert!(SEARCH_TABLE.windows(2).all(|w| w[0].tier <= w[1].tier));
    }

    #[test]
    fn test_root_wins_over_namespace() {
        let b = bag(json!({
            "Make": "Root",
            "exif": {"Make": "Namespaced"}
        }));
        assert_eq!(resolve(&b, fields::MAKE), Some(RawValue::Text("Root".into())));
    }

    #[test]
    fn test_key_order_within_location() {
        let b = bag(json!({"ISO": 200, "ISOSpeedRatings": 100}));
        assert_eq!(resolve(&b, fields::ISO), Some(RawValue::Number(100.0)));
    }

    #[test]
    fn test_namespace_priority() {
        let b = bag(json!({
            "exif": {"Software": "from-exif"},
            "xmp": {"CreatorTool": "from-xmp"}
        }));
        // xmp is scanned before exif, with the whole key list
        assert_eq!(resolve(&b, fields::SOFTWARE), Some(RawValue::Text("from-xmp".into())));
    }

    #[test]
    fn test_deep_path() {
        let b = bag(json!({
            "makerNotes": {"Huawei": {"GPS": {"Flash": "fired"}}}
        }));
        let (location, value) = resolve_located(&b, fields::FLASH).unwrap();
        assert_eq!(location.tier, Tier::DeepPath);
        assert_eq!(location.path, &["makerNotes", "Huawei", "GPS"]);
        assert_eq!(value, RawValue::Text("fired".into()));
    }

    #[test]
    fn test_described_entries() {
        let b = bag(json!({
            "exif": {
                "FNumber": {"value": [18, 10], "description": "f/1.8"},
                "ISOSpeedRatings": {"value": 50}
            }
        }));
        assert_eq!(resolve(&b, fields::F_NUMBER), Some(RawValue::Text("f/1.8".into())));
        assert_eq!(resolve(&b, fields::ISO), Some(RawValue::Number(50.0)));
    }

    #[test]
    fn test_nested_map_is_not_a_hit() {
        let b = bag(json!({"Make": {"Vendor": "x"}, "exif": {"Make": "Canon"}}));
        assert_eq!(resolve(&b, fields::MAKE), Some(RawValue::Text("Canon".into())));
    }

    #[test]
    fn test_blank_root_entry_is_skipped() {
        let b = bag(json!({
            "Make": {"value": "", "description": ""},
            "exif": {"Make": "Canon"}
        }));
        assert_eq!(resolve(&b, fields::MAKE), Some(RawValue::Text("Canon".into())));
    }

    #[test]
    fn test_absent() {
        assert_eq!(resolve(&TagBag::empty(), fields::MAKE), None);
    }
}
