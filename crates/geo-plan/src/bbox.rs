//! Geographic bounding boxes
//!
//! Provides [`BoundingBox`], an axis-aligned `[west, south, east, north]`
//! rectangle in WGS84 degrees whose invariants are enforced at construction.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Minimum longitude in degrees
pub const MIN_LON: f64 = -180.0;
/// Maximum longitude in degrees
pub const MAX_LON: f64 = 180.0;
/// Minimum latitude in degrees
pub const MIN_LAT: f64 = -90.0;
/// Maximum latitude in degrees
pub const MAX_LAT: f64 = 90.0;

/// Axis-aligned bounding box in degrees
///
/// Invariants: `-180 ≤ west < east ≤ 180` and `-90 ≤ south < north ≤ 90`.
/// Serialized as a `[west, south, east, north]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 4]", try_from = "[f64; 4]")]
pub struct BoundingBox {
    west: f64,
    south: f64,
    east: f64,
    north: f64,
}

impl BoundingBox {
    /// Create a validated bounding box
    ///
    /// # Errors
    /// Returns [`BoundsError`] if any coordinate is non-finite, out of the
    /// global range, or the box is empty/inverted.
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Result<Self, BoundsError> {
        for value in [west, south, east, north] {
            if !value.is_finite() {
                return Err(BoundsError::NonFinite);
            }
        }
        for lon in [west, east] {
            if !(MIN_LON..=MAX_LON).contains(&lon) {
                return Err(BoundsError::LongitudeOutOfRange(lon));
            }
        }
        for lat in [south, north] {
            if !(MIN_LAT..=MAX_LAT).contains(&lat) {
                return Err(BoundsError::LatitudeOutOfRange(lat));
            }
        }
        if west >= east {
            return Err(BoundsError::WestNotBeforeEast { west, east });
        }
        if south >= north {
            return Err(BoundsError::SouthNotBeforeNorth { south, north });
        }

        Ok(Self {
            west,
            south,
            east,
            north,
        })
    }

    /// Whole-globe bounding box
    #[inline]
    #[must_use]
    pub const fn global() -> Self {
        Self {
            west: MIN_LON,
            south: MIN_LAT,
            east: MAX_LON,
            north: MAX_LAT,
        }
    }

    /// Western edge (min longitude)
    #[inline]
    #[must_use]
    pub const fn west(&self) -> f64 {
        self.west
    }

    /// Southern edge (min latitude)
    #[inline]
    #[must_use]
    pub const fn south(&self) -> f64 {
        self.south
    }

    /// Eastern edge (max longitude)
    #[inline]
    #[must_use]
    pub const fn east(&self) -> f64 {
        self.east
    }

    /// Northern edge (max latitude)
    #[inline]
    #[must_use]
    pub const fn north(&self) -> f64 {
        self.north
    }

    /// Width in degrees of longitude
    #[inline]
    #[must_use]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height in degrees of latitude
    #[inline]
    #[must_use]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Center point as `(lon, lat)`
    #[inline]
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        )
    }

    /// Coordinates as `[west, south, east, north]`
    #[inline]
    #[must_use]
    pub const fn to_array(&self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }

    /// Pad every side and clamp to the global coordinate range
    ///
    /// `dx`/`dy` are absolute paddings in degrees. Clamping cannot produce an
    /// inverted box because padding is non-negative.
    #[must_use]
    pub fn padded(&self, dx: f64, dy: f64) -> Self {
        let dx = dx.max(0.0);
        let dy = dy.max(0.0);
        Self {
            west: (self.west - dx).max(MIN_LON),
            south: (self.south - dy).max(MIN_LAT),
            east: (self.east + dx).min(MAX_LON),
            north: (self.north + dy).min(MAX_LAT),
        }
    }
}

impl Display for BoundingBox {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.west, self.south, self.east, self.north
        )
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        bbox.to_array()
    }
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = BoundsError;

    fn try_from([west, south, east, north]: [f64; 4]) -> Result<Self, Self::Error> {
        Self::new(west, south, east, north)
    }
}

/// Bounding box invariant violations
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum BoundsError {
    /// NaN or infinite coordinate
    #[error("coordinates must be finite numbers")]
    NonFinite,

    /// Longitude outside [-180, 180]
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),

    /// Latitude outside [-90, 90]
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    /// Empty or inverted longitude span
    #[error("west ({west}) must be less than east ({east})")]
    WestNotBeforeEast {
        /// Western edge
        west: f64,
        /// Eastern edge
        east: f64,
    },

    /// Empty or inverted latitude span
    #[error("south ({south}) must be less than north ({north})")]
    SouthNotBeforeNorth {
        /// Southern edge
        south: f64,
        /// Northern edge
        north: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bbox_valid() {
        let bbox = BoundingBox::new(-10.0, 40.0, 5.0, 50.0).unwrap();
        assert_eq!(bbox.width(), 15.0);
        assert_eq!(bbox.height(), 10.0);
        assert_eq!(bbox.center(), (-2.5, 45.0));
    }

    #[test]
    fn bbox_rejects_inverted_longitude() {
        let err = BoundingBox::new(5.0, 40.0, 5.0, 50.0).unwrap_err();
        assert!(matches!(err, BoundsError::WestNotBeforeEast { .. }));
    }

    #[test]
    fn bbox_rejects_inverted_latitude() {
        let err = BoundingBox::new(0.0, 50.0, 5.0, 40.0).unwrap_err();
        assert!(matches!(err, BoundsError::SouthNotBeforeNorth { .. }));
    }

    #[test]
    fn bbox_rejects_out_of_range() {
        assert!(matches!(
            BoundingBox::new(-181.0, 0.0, 0.0, 1.0),
            Err(BoundsError::LongitudeOutOfRange(_))
        ));
        assert!(matches!(
            BoundingBox::new(0.0, -91.0, 1.0, 1.0),
            Err(BoundsError::LatitudeOutOfRange(_))
        ));
        assert!(matches!(
            BoundingBox::new(f64::NAN, 0.0, 1.0, 1.0),
            Err(BoundsError::NonFinite)
        ));
    }

    #[test]
    fn bbox_accepts_global_extent() {
        let bbox = BoundingBox::new(-180.0, -90.0, 180.0, 90.0).unwrap();
        assert_eq!(bbox, BoundingBox::global());
    }

    #[test]
    fn bbox_padding_clamps() {
        let bbox = BoundingBox::new(170.0, 80.0, 179.0, 89.0).unwrap();
        let padded = bbox.padded(5.0, 5.0);
        assert_eq!(padded.east(), 180.0);
        assert_eq!(padded.north(), 90.0);
        assert_eq!(padded.west(), 165.0);
        assert_eq!(padded.south(), 75.0);
    }

    #[test]
    fn bbox_serde_as_array() {
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0).unwrap();
        let json = serde_json::to_string(&bbox).unwrap();
        assert_eq!(json, "[1.0,2.0,3.0,4.0]");

        let back: BoundingBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bbox);

        let invalid: Result<BoundingBox, _> = serde_json::from_str("[3.0,2.0,1.0,4.0]");
        assert!(invalid.is_err());
    }
}
