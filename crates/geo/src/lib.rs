//! Geographic primitives for pinpix photo searches.
//!
//! This crate provides:
//! - `Coordinate` with the open-range validation photo searches require
//! - `BoundingBox` derivation around a coordinate, clamped to valid ranges
//! - The comma separated `bbox` query form expected by the search provider
//!
//! # Example
//!
//! ```
//! use pinpix_geo::{BoundingBox, Coordinate};
//!
//! let san_francisco = Coordinate::new(37.7749, -122.4194);
//! assert!(san_francisco.is_valid());
//!
//! let bbox = BoundingBox::around(&san_francisco);
//! assert_eq!(bbox.to_query(), "-123.4194,36.7749,-121.4194,38.7749");
//! ```

mod bbox;
mod error;

pub use bbox::{BoundingBox, SEARCH_BBOX_HALF_HEIGHT, SEARCH_BBOX_HALF_WIDTH};
pub use error::{GeoError, GeoErrorCode, Result};

/// Valid latitude range. Both ends are excluded from searches.
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Valid longitude range. Both ends are excluded from searches.
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// A geographic coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, strictly between -90 and 90
    pub latitude: f64,
    /// Longitude in degrees, strictly between -180 and 180
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    ///
    /// No validation happens here; call [`Coordinate::validate`] or
    /// [`Coordinate::is_valid`] before using it for a search.
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Parses a coordinate from decimal strings, as pins are often stored.
    ///
    /// Only the numeric form is checked; range validation is separate.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self> {
        let lat = latitude.trim().parse::<f64>().map_err(|_| {
            GeoError::InvalidCoordinate(format!("latitude is not a number: {latitude:?}"))
        })?;
        let lon = longitude.trim().parse::<f64>().map_err(|_| {
            GeoError::InvalidCoordinate(format!("longitude is not a number: {longitude:?}"))
        })?;
        Ok(Self::new(lat, lon))
    }

    /// Returns true if the coordinate lies strictly inside the valid ranges.
    ///
    /// The poles and the antimeridian are rejected, and so is NaN.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.latitude > LATITUDE_RANGE.0
            && self.latitude < LATITUDE_RANGE.1
            && self.longitude > LONGITUDE_RANGE.0
            && self.longitude < LONGITUDE_RANGE.1
    }

    /// Like [`Coordinate::is_valid`] but reports which component is out of range.
    pub fn validate(&self) -> Result<()> {
        if !(self.latitude > LATITUDE_RANGE.0 && self.latitude < LATITUDE_RANGE.1) {
            return Err(GeoError::InvalidCoordinate(format!(
                "latitude {} outside ({}, {})",
                self.latitude, LATITUDE_RANGE.0, LATITUDE_RANGE.1
            )));
        }
        if !(self.longitude > LONGITUDE_RANGE.0 && self.longitude < LONGITUDE_RANGE.1) {
            return Err(GeoError::InvalidCoordinate(format!(
                "longitude {} outside ({}, {})",
                self.longitude, LONGITUDE_RANGE.0, LONGITUDE_RANGE.1
            )));
        }
        Ok(())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// Validates a coordinate given as strings.
///
/// Non-numeric input is invalid, as is anything on or outside the range bounds.
pub fn validate_str(latitude: &str, longitude: &str) -> bool {
    Coordinate::parse(latitude, longitude).is_ok_and(|c| c.is_valid())
}
