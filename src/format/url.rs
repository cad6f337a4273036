//! URL output formatter

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{OutputFormatter, Trip};
use crate::ranking::NearbyReport;

/// URL formatter - outputs a map URL for the nearest seller or trip destination
pub struct UrlFormatter;

impl UrlFormatter {
    /// Format the nearest seller's URL with an optional provider override
    pub fn format_with_provider(
        &self,
        report: &NearbyReport,
        config: &Config,
        provider: Option<&str>,
    ) -> Result<String> {
        let nearest = report
            .nearest()
            .ok_or_else(|| Error::Config("No seller matches the current filters".to_string()))?;

        config.format_url(
            provider,
            nearest.seller.coordinate.lat,
            nearest.seller.coordinate.lng,
        )
    }
}

impl OutputFormatter for UrlFormatter {
    fn name(&self) -> &str {
        "url"
    }

    fn description(&self) -> &str {
        "Map URL for the nearest seller or destination"
    }

    fn format_nearby(&self, report: &NearbyReport, config: &Config) -> Result<String> {
        self.format_with_provider(report, config, None)
    }

    fn format_trip(&self, trip: &Trip, config: &Config) -> Result<String> {
        let destination = trip.seller.coordinate;
        config.format_url(None, destination.lat, destination.lng)
    }
}
