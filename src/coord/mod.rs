//! Geographic coordinates
//!
//! This module handles:
//! - The validated `Coordinate` type used everywhere internally (latitude first)
//! - The conversion to and from the longitude-first order routing providers expect
//! - Great-circle distance
//! - Encoded polyline decoding

pub mod distance;
pub mod polyline;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A geographic coordinate (latitude, longitude) in degrees
///
/// Internal code is always latitude-first. Use [`Coordinate::to_lng_lat`] and
/// [`Coordinate::from_lng_lat`] at provider boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    /// Create a coordinate without range checking
    ///
    /// Intended for literals and values that were already validated.
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Create a coordinate, rejecting out-of-range or non-finite values
    pub fn try_new(lat: f64, lng: f64) -> Result<Self> {
        let coord = Self { lat, lng };
        coord.validate()?;
        Ok(coord)
    }

    /// Validate that coordinates are within valid ranges
    ///
    /// Latitude: -90 to 90
    /// Longitude: -180 to 180
    pub fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(Error::InvalidCoordinates(format!(
                "Latitude {} is out of range [-90, 90]",
                self.lat
            )));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(Error::InvalidCoordinates(format!(
                "Longitude {} is out of range [-180, 180]",
                self.lng
            )));
        }
        Ok(())
    }

    /// Convert to the `[longitude, latitude]` pair used by routing providers
    pub fn to_lng_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    /// Build a coordinate from a provider `[longitude, latitude]` pair
    pub fn from_lng_lat(pair: [f64; 2]) -> Result<Self> {
        Self::try_new(pair[1], pair[0])
    }

    /// Format with a fixed number of decimals as `lat,lng`
    pub fn to_fixed(&self, precision: usize) -> String {
        format!("{:.*},{:.*}", precision, self.lat, precision, self.lng)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lng)
    }
}
