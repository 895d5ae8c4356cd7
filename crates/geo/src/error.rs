//! Error types for the geo crate.

use thiserror::Error;

/// Result type alias for geo operations.
pub type Result<T> = std::result::Result<T, GeoError>;

/// Errors that can occur during geo operations.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Coordinate is not numeric or lies outside the valid ranges
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Bounding box extents must be finite and non-negative
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),
}

/// Error code for integration with pinpix-core error handling.
/// Range: 10xxx for geo errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoErrorCode {
    /// Invalid coordinate values
    InvalidCoordinate = 10001,
    /// Invalid bounding box extents
    InvalidBoundingBox = 10002,
}

impl GeoError {
    /// Returns the error code for this error.
    pub fn code(&self) -> GeoErrorCode {
        match self {
            GeoError::InvalidCoordinate(_) => GeoErrorCode::InvalidCoordinate,
            GeoError::InvalidBoundingBox(_) => GeoErrorCode::InvalidBoundingBox,
        }
    }
}
