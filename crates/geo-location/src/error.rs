//! Location resolution errors

use geo_plan::BoundsError;

/// Location resolution errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LocationError {
    /// Neither the geocoder nor the fallback table knows the name
    #[error("location '{name}' not found; known locations: {}", .known.join(", "))]
    LocationNotFound {
        /// Name as requested
        name: String,
        /// Every name in the fallback table, sorted
        known: Vec<String>,
    },

    /// Coordinates violate bounding box invariants
    #[error("invalid bounding box: {0}")]
    InvalidBounds(#[from] BoundsError),

    /// Negative or non-finite expansion percentage
    #[error("padding percent must be a non-negative finite number, got {0}")]
    InvalidPadding(f64),

    /// Blank place name
    #[error("location name must not be empty")]
    EmptyName,
}

impl LocationError {
    /// Check if error is a lookup miss (as opposed to bad input)
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, LocationError::LocationNotFound { .. })
    }
}
