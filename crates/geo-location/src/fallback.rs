//! Static table of well-known places
//!
//! Consulted when the geocoder is unavailable or fails. Keys are normalized
//! names (see [`normalize_name`]).

use geo_plan::BoundingBox;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// `[west, south, east, north]` per normalized name
const WELL_KNOWN: &[(&str, [f64; 4])] = &[
    ("amazon rainforest", [-74.0, -10.0, -50.0, 2.0]),
    ("aral sea", [58.0, 43.4, 61.9, 46.9]),
    ("beijing", [115.42, 39.44, 117.51, 41.06]),
    ("borneo", [108.6, -4.2, 119.3, 7.4]),
    ("california", [-124.48, 32.53, -114.13, 42.01]),
    ("congo basin", [12.0, -5.0, 30.0, 5.0]),
    ("delhi", [76.84, 28.4, 77.35, 28.88]),
    ("great barrier reef", [142.5, -24.5, 153.0, -10.5]),
    ("lagos", [3.1, 6.39, 3.7, 6.7]),
    ("lake chad", [13.0, 12.3, 15.3, 14.5]),
    ("lake mead", [-114.85, 35.95, -114.05, 36.5]),
    ("london", [-0.51, 51.28, 0.33, 51.69]),
    ("mumbai", [72.77, 18.89, 72.99, 19.27]),
    ("nairobi", [36.65, -1.45, 37.1, -1.16]),
    ("new york", [-74.26, 40.48, -73.7, 40.92]),
    ("nile delta", [29.5, 30.0, 32.5, 31.6]),
    ("paris", [2.22, 48.81, 2.47, 48.9]),
    ("sahara", [-17.0, 15.0, 35.0, 33.0]),
    ("sao paulo", [-46.83, -24.01, -46.36, -23.36]),
    ("tokyo", [139.56, 35.52, 139.92, 35.82]),
];

static TABLE: Lazy<BTreeMap<&'static str, BoundingBox>> = Lazy::new(|| {
    WELL_KNOWN
        .iter()
        .filter_map(|(name, coords)| BoundingBox::try_from(*coords).ok().map(|b| (*name, b)))
        .collect()
});

/// Canonical lookup form: trimmed, lowercase, single spaces
#[must_use]
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Look up a normalized name
#[must_use]
pub fn lookup(normalized: &str) -> Option<BoundingBox> {
    TABLE.get(normalized).copied()
}

/// Every name the table knows, sorted
#[must_use]
pub fn known_names() -> Vec<String> {
    TABLE.keys().map(|name| (*name).to_string()).collect()
}
