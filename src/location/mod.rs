//! User location acquisition
//!
//! This module handles:
//! - The platform location capability (`LocationPlatform`)
//! - Permission tracking and the fallback coordinate (`LocationResolver`)
//! - Concrete platforms: IP geolocation and a static coordinate
//!
//! ## Flex Point
//! Adding a new platform (GPS daemon, browser bridge, ...) only requires
//! implementing `LocationPlatform`; the resolver owns every state transition.

pub mod fixed;
pub mod ip;
pub mod resolver;

pub use resolver::LocationResolver;

use crate::constants::location::{FIX_TIMEOUT_MS, MAXIMUM_AGE_MS, PROMPT_TIMEOUT_MS};
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;

/// Permission state for location access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Not checked yet
    #[default]
    Unknown,
    /// The platform will ask the user
    Prompt,
    Granted,
    Denied,
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Prompt => write!(f, "prompt"),
            Self::Granted => write!(f, "granted"),
            Self::Denied => write!(f, "denied"),
        }
    }
}

/// Classified cause of a failed acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationErrorKind {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl LocationErrorKind {
    /// Classify a location error
    pub fn of(error: &Error) -> Self {
        match error {
            Error::PermissionDenied => Self::PermissionDenied,
            Error::LocationTimeout => Self::Timeout,
            _ => Self::PositionUnavailable,
        }
    }
}

/// Options for a position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Prefer a precise fix over a fast one
    pub high_accuracy: bool,
    /// Give up after this long
    pub timeout: Duration,
    /// Accept a cached platform fix up to this old
    pub maximum_age: Duration,
}

impl PositionOptions {
    /// Low-accuracy, short-timeout request used only to surface the permission prompt
    pub fn prompt() -> Self {
        Self {
            high_accuracy: false,
            timeout: Duration::from_millis(PROMPT_TIMEOUT_MS),
            maximum_age: Duration::from_millis(MAXIMUM_AGE_MS),
        }
    }
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_millis(FIX_TIMEOUT_MS),
            maximum_age: Duration::from_millis(MAXIMUM_AGE_MS),
        }
    }
}

/// A position reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    pub coordinate: Coordinate,
    /// Accuracy radius in meters, if the platform reports one
    pub accuracy_meters: Option<f64>,
    /// When the platform took the fix
    pub timestamp: DateTime<Utc>,
}

impl PositionFix {
    /// A fix taken now
    pub fn now(coordinate: Coordinate, accuracy_meters: Option<f64>) -> Self {
        Self {
            coordinate,
            accuracy_meters,
            timestamp: Utc::now(),
        }
    }

    /// Age of the fix relative to now
    pub fn age(&self) -> Duration {
        (Utc::now() - self.timestamp).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Stream of watched positions; dropping the receiver clears the watch
pub type PositionUpdates = mpsc::Receiver<Result<PositionFix>>;

/// Platform location capability
///
/// Implementations must be thread-safe (Send + Sync) so a watch can run on
/// a background task.
pub trait LocationPlatform: Send + Sync + 'static {
    /// Whether the platform can provide positions at all
    fn is_supported(&self) -> bool {
        true
    }

    /// Check the permission status without prompting
    ///
    /// Returns None when the platform has no permission API.
    fn query_permission(&self) -> impl Future<Output = Option<Permission>> + Send;

    /// Request the current position
    ///
    /// Errors should be `PermissionDenied`, `LocationUnavailable` or
    /// `LocationTimeout`; anything else is treated as unavailable.
    fn current_position(
        &self,
        options: PositionOptions,
    ) -> impl Future<Output = Result<PositionFix>> + Send;

    /// Begin continuous position updates
    fn watch_position(&self, options: PositionOptions) -> Result<PositionUpdates>;
}

/// The single live location state of a resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationState {
    /// Current coordinate (live fix or fallback); None before the first attempt
    pub coordinate: Option<Coordinate>,
    pub permission: Permission,
    pub loading: bool,
    /// Human-readable description of the last acquisition failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<LocationErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_meters: Option<f64>,
    /// Timestamp of the live fix; None while on the fallback coordinate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_at: Option<DateTime<Utc>>,
}

impl LocationState {
    /// State at resolver creation
    pub fn initial() -> Self {
        Self {
            coordinate: None,
            permission: Permission::Unknown,
            loading: false,
            error: None,
            error_kind: None,
            accuracy_meters: None,
            fixed_at: None,
        }
    }

    /// Whether the coordinate is the substituted fallback rather than a live fix
    pub fn is_fallback(&self) -> bool {
        self.coordinate.is_some() && self.fixed_at.is_none()
    }
}

impl Default for LocationState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = LocationState::initial();
        assert_eq!(state.permission, Permission::Unknown);
        assert!(!state.loading);
        assert!(state.coordinate.is_none());
        assert!(!state.is_fallback());
    }

    #[test]
    fn test_error_kind_classification() {
        assert_eq!(
            LocationErrorKind::of(&Error::PermissionDenied),
            LocationErrorKind::PermissionDenied
        );
        assert_eq!(
            LocationErrorKind::of(&Error::LocationTimeout),
            LocationErrorKind::Timeout
        );
        assert_eq!(
            LocationErrorKind::of(&Error::LocationUnavailable("no signal".to_string())),
            LocationErrorKind::PositionUnavailable
        );
    }

    #[test]
    fn test_prompt_options_are_cheap() {
        let prompt = PositionOptions::prompt();
        let full = PositionOptions::default();
        assert!(!prompt.high_accuracy);
        assert!(prompt.timeout < full.timeout);
    }

    #[test]
    fn test_state_serialization_skips_empty_fields() {
        let json = serde_json::to_value(LocationState::initial()).unwrap();
        assert_eq!(json["permission"], "unknown");
        assert!(json.get("error").is_none());
        assert!(json.get("fixed_at").is_none());
    }
}
