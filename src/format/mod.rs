//! Output formatters
//!
//! Provides trait-based output formatting for nearby-seller rankings and
//! trips to a seller.

pub mod gpx;
pub mod json;
pub mod text;
pub mod url;

use crate::config::Config;
use crate::coord::Coordinate;
use crate::error::Result;
use crate::ranking::NearbyReport;
use crate::routing::Route;
use crate::sellers::Seller;
use serde::{Deserialize, Serialize};

/// Information about an output format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Format name
    pub name: String,
    /// Format description
    pub description: String,
}

/// A resolved route from the user to a seller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub origin: Coordinate,
    pub seller: Seller,
    pub route: Route,
}

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Get the format name
    fn name(&self) -> &str;

    /// Get the format description
    fn description(&self) -> &str;

    /// Format a ranking of nearby sellers
    ///
    /// # Arguments
    /// * `report` - The ranking and the location it was computed from
    /// * `config` - Application config (for url providers, etc.)
    fn format_nearby(&self, report: &NearbyReport, config: &Config) -> Result<String>;

    /// Format a trip to a seller
    fn format_trip(&self, trip: &Trip, config: &Config) -> Result<String>;
}

/// Get a formatter by name
pub fn get_formatter(name: &str) -> Option<Box<dyn OutputFormatter>> {
    match name.to_lowercase().as_str() {
        "json" => Some(Box::new(json::JsonFormatter)),
        "text" => Some(Box::new(text::TextFormatter)),
        "gpx" => Some(Box::new(gpx::GpxFormatter)),
        "url" => Some(Box::new(url::UrlFormatter)),
        _ => None,
    }
}

/// List all available formatters
pub fn available_formats() -> Vec<FormatInfo> {
    [
        &json::JsonFormatter as &dyn OutputFormatter,
        &text::TextFormatter,
        &gpx::GpxFormatter,
        &url::UrlFormatter,
    ]
    .iter()
    .map(|f| FormatInfo {
        name: f.name().to_string(),
        description: f.description().to_string(),
    })
    .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::location::{LocationState, Permission};
    use crate::ranking::rank;
    use crate::sellers::{Catalog, FilterCriteria};

    pub const ORIGIN: Coordinate = Coordinate::new(3.85, 11.5);

    pub fn report(criteria: FilterCriteria) -> NearbyReport {
        let catalog = Catalog::builtin();
        let location = LocationState {
            coordinate: Some(ORIGIN),
            permission: Permission::Granted,
            ..LocationState::initial()
        };
        NearbyReport {
            sellers: rank(location.coordinate, catalog.sellers(), &criteria),
            location,
            criteria,
        }
    }

    pub fn trip() -> Trip {
        let catalog = Catalog::builtin();
        let seller = catalog.get("4").cloned().unwrap();
        Trip {
            origin: ORIGIN,
            route: Route {
                geometry: vec![ORIGIN, Coordinate::new(3.87, 11.49), seller.coordinate],
                distance_meters: 5230.0,
                duration_seconds: 712.0,
            },
            seller,
        }
    }
}
