//! Geo Location - area-of-interest resolution
//!
//! Turns a plan [`Location`](geo_plan::Location) into a validated
//! [`BoundingBox`](geo_plan::BoundingBox):
//!
//! - Explicit boxes are revalidated and returned without any remote call
//! - Names are normalized, then looked up in an in-process memo, a remote
//!   [`Geocoder`], and finally a static fallback table
//!
//! # Example
//!
//! ```rust,ignore
//! use geo_location::{expand_bbox, LocationResolver};
//! use geo_plan::Location;
//!
//! let resolver = LocationResolver::new();
//! let bbox = resolver.resolve(&Location::Named("Lake Chad".into())).await?;
//! let context = expand_bbox(&bbox, 10.0)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod fallback;
mod geocoder;
mod resolver;

pub use error::LocationError;
pub use fallback::{known_names, normalize_name};
pub use geocoder::{GeocodeError, Geocoder, GeocoderConfig, NominatimGeocoder};
pub use resolver::{expand_bbox, LocationResolver, DEFAULT_MEMO_CAPACITY};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
