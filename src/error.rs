//! Error types for gaz-finder

use thiserror::Error;

/// Main error type for gaz-finder operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("Location access denied")]
    PermissionDenied,

    #[error("Location request timed out")]
    LocationTimeout,

    #[error("No route available between these points")]
    RouteNotFound,

    #[error("Routing provider error: {0}")]
    RouteProvider(String),

    #[error("Request superseded")]
    Cancelled,

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Invalid polyline: {0}")]
    Polyline(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server error: {0}")]
    Server(String),
}

impl Error {
    /// Whether the error should ever be shown to a user
    ///
    /// Supersession is an expected outcome of a newer request, not a failure.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, Error::Cancelled)
    }

    /// Fold an arbitrary location failure into one of the three location causes
    pub fn into_location_error(self) -> Self {
        match self {
            Error::PermissionDenied => Error::PermissionDenied,
            Error::LocationTimeout => Error::LocationTimeout,
            Error::LocationUnavailable(msg) => Error::LocationUnavailable(msg),
            other => Error::LocationUnavailable(other.to_string()),
        }
    }
}

/// Result type alias for gaz-finder operations
pub type Result<T> = std::result::Result<T, Error>;
