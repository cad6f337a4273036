//! JSON output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::{OutputFormatter, Trip};
use crate::ranking::NearbyReport;

/// JSON formatter - outputs the full report as pretty-printed JSON
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Full JSON report"
    }

    fn format_nearby(&self, report: &NearbyReport, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }

    fn format_trip(&self, trip: &Trip, _config: &Config) -> Result<String> {
        Ok(serde_json::to_string_pretty(trip)?)
    }
}
