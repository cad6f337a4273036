//! Human-readable text output formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::{OutputFormatter, Trip};
use crate::location::LocationState;
use crate::ranking::NearbyReport;
use crate::sellers::FilterCriteria;

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

fn describe_location(state: &LocationState) -> String {
    let Some(coordinate) = state.coordinate else {
        return "unknown location".to_string();
    };

    match (&state.error, state.is_fallback()) {
        (Some(error), _) => format!("{} (fallback: {})", coordinate, error),
        (None, true) => format!("{} (fallback)", coordinate),
        (None, false) => match state.accuracy_meters {
            Some(accuracy) if accuracy > 0.0 => format!("{} (±{:.0}m)", coordinate, accuracy),
            _ => coordinate.to_string(),
        },
    }
}

fn describe_criteria(criteria: &FilterCriteria) -> Option<String> {
    if criteria.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    if !criteria.brand.is_empty() {
        parts.push(format!("brand \"{}\"", criteria.brand));
    }
    if let Some(size) = criteria.size_class {
        parts.push(format!("size {}", size));
    }
    Some(parts.join(", "))
}

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format_nearby(&self, report: &NearbyReport, _config: &Config) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!(
            "Gas sellers near {}\n",
            describe_location(&report.location)
        ));
        if let Some(filter) = describe_criteria(&report.criteria) {
            output.push_str(&format!("Filter: {}\n", filter));
        }
        output.push('\n');

        if report.sellers.is_empty() {
            output.push_str("No sellers match the current filters\n");
            return Ok(output);
        }

        for (i, ranked) in report.sellers.iter().enumerate() {
            let seller = &ranked.seller;
            output.push_str(&format!(
                "{:>2}. {:<22} {:<8} {:<6} {:>6} FCFA  {:.1}★ ({})  {:>7.1} km\n",
                i + 1,
                seller.display_name,
                seller.brand,
                seller.size_class,
                seller.price,
                seller.rating,
                seller.review_count,
                ranked.distance_km
            ));
            output.push_str(&format!("    id {}  tel {}\n", seller.id, seller.phone));
        }

        Ok(output)
    }

    fn format_trip(&self, trip: &Trip, _config: &Config) -> Result<String> {
        let mut output = String::new();
        let seller = &trip.seller;

        output.push_str(&format!(
            "Route to {} ({})\n",
            seller.display_name, seller.brand
        ));
        output.push_str(&format!("From: {}\n", trip.origin));
        output.push_str(&format!("To:   {}\n", seller.coordinate));
        output.push_str(&format!("Distance: {} km\n", trip.route.distance_km()));
        output.push_str(&format!("Duration: {} min\n", trip.route.duration_minutes()));
        output.push_str(&format!("Path points: {}\n", trip.route.geometry.len()));
        output.push_str(&format!("\nCall: {}\n", seller.phone));

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures;
    use crate::sellers::SizeClass;

    #[test]
    fn test_text_nearby() {
        let report = fixtures::report(FilterCriteria::default());
        let output = TextFormatter
            .format_nearby(&report, &Config::default())
            .unwrap();

        assert!(output.starts_with("Gas sellers near 3.85000, 11.50000"));
        assert!(!output.contains("Filter:"));

        // Nearest first
        let yaounde = output.find("GazPlus Yaoundé").unwrap();
        let douala = output.find("SafeGaz Douala").unwrap();
        assert!(yaounde < douala);
    }

    #[test]
    fn test_text_nearby_with_filter_and_no_match() {
        let report = fixtures::report(FilterCriteria::new("bocom", Some(SizeClass::Large)));
        let output = TextFormatter
            .format_nearby(&report, &Config::default())
            .unwrap();

        assert!(output.contains("Filter: brand \"bocom\", size large"));
        assert!(output.contains("No sellers match the current filters"));
    }

    #[test]
    fn test_text_marks_fallback_location() {
        let mut report = fixtures::report(FilterCriteria::default());
        report.location.error = Some("Location access denied".to_string());

        let output = TextFormatter
            .format_nearby(&report, &Config::default())
            .unwrap();
        assert!(output.contains("(fallback: Location access denied)"));
    }

    #[test]
    fn test_text_trip() {
        let output = TextFormatter
            .format_trip(&fixtures::trip(), &Config::default())
            .unwrap();

        assert!(output.contains("Route to EcoGaz Ngoa-Ekelle (CAMGAZ)"));
        assert!(output.contains("Distance: 5.2 km"));
        assert!(output.contains("Duration: 12 min"));
    }
}
