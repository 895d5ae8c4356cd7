//! Search bounding boxes.
//!
//! A bounding box is a fixed-size window around a coordinate, with each edge
//! clamped so the box never leaves the valid latitude/longitude ranges.

use crate::{Coordinate, GeoError, Result, LATITUDE_RANGE, LONGITUDE_RANGE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half of the bounding box width in degrees of longitude.
pub const SEARCH_BBOX_HALF_WIDTH: f64 = 1.0;

/// Half of the bounding box height in degrees of latitude.
pub const SEARCH_BBOX_HALF_HEIGHT: f64 = 1.0;

/// A rectangular geographic region.
///
/// For any valid [`Coordinate`], `min_lon <= max_lon` and `min_lat <= max_lat`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western edge
    pub min_lon: f64,
    /// Southern edge
    pub min_lat: f64,
    /// Eastern edge
    pub max_lon: f64,
    /// Northern edge
    pub max_lat: f64,
}

impl BoundingBox {
    /// Builds the default search box around a coordinate.
    ///
    /// # Example
    /// ```
    /// use pinpix_geo::{BoundingBox, Coordinate};
    ///
    /// let bbox = BoundingBox::around(&Coordinate::new(89.5, 179.5));
    /// assert_eq!(bbox.max_lat, 90.0);
    /// assert_eq!(bbox.max_lon, 180.0);
    /// ```
    pub fn around(center: &Coordinate) -> Self {
        Self::clamped(center, SEARCH_BBOX_HALF_WIDTH, SEARCH_BBOX_HALF_HEIGHT)
    }

    /// Builds a search box with custom half extents (in degrees).
    pub fn around_with(center: &Coordinate, half_width: f64, half_height: f64) -> Result<Self> {
        if !(half_width.is_finite() && half_width >= 0.0) {
            return Err(GeoError::InvalidBoundingBox(format!(
                "half width must be finite and non-negative, got {half_width}"
            )));
        }
        if !(half_height.is_finite() && half_height >= 0.0) {
            return Err(GeoError::InvalidBoundingBox(format!(
                "half height must be finite and non-negative, got {half_height}"
            )));
        }
        Ok(Self::clamped(center, half_width, half_height))
    }

    fn clamped(center: &Coordinate, half_width: f64, half_height: f64) -> Self {
        Self {
            min_lon: (center.longitude - half_width).max(LONGITUDE_RANGE.0),
            min_lat: (center.latitude - half_height).max(LATITUDE_RANGE.0),
            max_lon: (center.longitude + half_width).min(LONGITUDE_RANGE.1),
            max_lat: (center.latitude + half_height).min(LATITUDE_RANGE.1),
        }
    }

    /// Returns the box as a `(min_lon, min_lat, max_lon, max_lat)` tuple.
    #[inline]
    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.min_lon, self.min_lat, self.max_lon, self.max_lat)
    }

    /// Returns true if the coordinate lies inside the box (edges included).
    pub fn contains(&self, coord: &Coordinate) -> bool {
        coord.longitude >= self.min_lon
            && coord.longitude <= self.max_lon
            && coord.latitude >= self.min_lat
            && coord.latitude <= self.max_lat
    }

    /// Serializes to `"minLon,minLat,maxLon,maxLat"`.
    ///
    /// Uses the shortest round-trip decimal for each bound, independent of
    /// locale, and keeps a trailing `.0` on integral values.
    pub fn to_query(&self) -> String {
        format!(
            "{},{},{},{}",
            decimal(self.min_lon),
            decimal(self.min_lat),
            decimal(self.max_lon),
            decimal(self.max_lat)
        )
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query())
    }
}

// f64's Display never emits exponents, only integral values need the suffix.
fn decimal(value: f64) -> String {
    let s = value.to_string();
    if s.contains('.') || !value.is_finite() {
        s
    } else {
        format!("{s}.0")
    }
}
