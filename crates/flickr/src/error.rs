//! Error types for photo searches

use pinpix_geo::GeoError;
use thiserror::Error;

/// Result type alias for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Search failures, split by who is at fault and whether repeating helps
#[derive(Error, Debug)]
pub enum SearchError {
    /// Coordinate outside the valid ranges; never sent over the network
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Page numbers start at 1
    #[error("Invalid page {0}: pages start at 1")]
    InvalidPage(u32),

    /// Connection, DNS, timeout or body read failure
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// Body is not JSON or lacks the expected fields
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Body parsed but `stat` was not "ok"
    #[error("Provider error ({}): {message}", .code.map_or_else(|| "no code".to_string(), |c| c.to_string()))]
    Provider {
        /// Provider error code, when given
        code: Option<i64>,
        /// Provider error message
        message: String,
    },

    /// Client configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persistence collaborator failed, including unknown locations
    #[error(transparent)]
    Store(#[from] pinpix_core::Error),

    /// A newer request for the same location replaced this one
    #[error("Request for location {0:?} was superseded")]
    Superseded(String),
}

/// Coarse error categories for callers that branch on the kind of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller passed a bad coordinate or page
    InvalidRequest,
    /// Network or HTTP status failure
    Transport,
    /// Unexpected body shape
    MalformedResponse,
    /// Provider-reported failure
    Provider,
    /// Bad configuration
    Config,
    /// Persistence failure
    Store,
    /// Replaced by a newer request
    Superseded,
}

impl SearchError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Category of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCoordinate(_) | Self::InvalidPage(_) => ErrorKind::InvalidRequest,
            Self::Transport(_) | Self::Status { .. } => ErrorKind::Transport,
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::Provider { .. } => ErrorKind::Provider,
            Self::Config(_) => ErrorKind::Config,
            Self::Store(_) => ErrorKind::Store,
            Self::Superseded(_) => ErrorKind::Superseded,
        }
    }

    /// Check if repeating the same request may succeed
    ///
    /// Advisory only: the client itself never retries.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::InvalidCoordinate(_)
            | Self::InvalidPage(_)
            | Self::MalformedResponse(_)
            | Self::Provider { .. }
            | Self::Config(_)
            | Self::Store(_)
            | Self::Superseded(_) => false,
        }
    }

    /// Check if the location has no stored pin
    #[must_use]
    pub fn is_unknown_location(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_not_found())
    }
}

impl From<GeoError> for SearchError {
    fn from(err: GeoError) -> Self {
        match err {
            GeoError::InvalidCoordinate(msg) | GeoError::InvalidBoundingBox(msg) => {
                Self::InvalidCoordinate(msg)
            }
        }
    }
}
