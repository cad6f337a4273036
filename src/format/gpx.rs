//! GPX output formatter
//!
//! Rankings become waypoints; trips become a track plus start and end
//! waypoints.

use crate::config::Config;
use crate::coord::Coordinate;
use crate::error::Result;
use crate::format::{OutputFormatter, Trip};
use crate::ranking::NearbyReport;

/// GPX formatter - outputs a GPX 1.1 document
pub struct GpxFormatter;

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn open_document(gpx: &mut String, name: &str) {
    gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    gpx.push('\n');
    gpx.push_str(r#"<gpx version="1.1" creator="gaz-finder" xmlns="http://www.topografix.com/GPX/1/1">"#);
    gpx.push('\n');
    gpx.push_str("  <metadata>\n");
    gpx.push_str(&format!("    <name>{}</name>\n", escape_xml(name)));
    gpx.push_str("  </metadata>\n");
}

fn waypoint(gpx: &mut String, at: Coordinate, name: &str, desc: Option<&str>) {
    gpx.push_str(&format!(r#"  <wpt lat="{}" lon="{}">"#, at.lat, at.lng));
    gpx.push('\n');
    gpx.push_str(&format!("    <name>{}</name>\n", escape_xml(name)));
    if let Some(desc) = desc {
        gpx.push_str(&format!("    <desc>{}</desc>\n", escape_xml(desc)));
    }
    gpx.push_str("  </wpt>\n");
}

impl OutputFormatter for GpxFormatter {
    fn name(&self) -> &str {
        "gpx"
    }

    fn description(&self) -> &str {
        "GPX waypoints and route track"
    }

    fn format_nearby(&self, report: &NearbyReport, _config: &Config) -> Result<String> {
        let mut gpx = String::new();
        open_document(&mut gpx, "Nearby gas sellers");

        if let Some(here) = report.location.coordinate {
            let desc = report.location.error.as_deref();
            waypoint(&mut gpx, here, "You", desc);
        }

        for ranked in &report.sellers {
            let seller = &ranked.seller;
            let desc = format!(
                "{} {}, {} FCFA, {:.1} km",
                seller.brand, seller.size_class, seller.price, ranked.distance_km
            );
            waypoint(&mut gpx, seller.coordinate, &seller.display_name, Some(&desc));
        }

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }

    fn format_trip(&self, trip: &Trip, _config: &Config) -> Result<String> {
        let mut gpx = String::new();
        let name = format!("Route to {}", trip.seller.display_name);
        open_document(&mut gpx, &name);

        waypoint(&mut gpx, trip.origin, "Start", None);
        waypoint(&mut gpx, trip.seller.coordinate, &trip.seller.display_name, None);

        gpx.push_str("  <trk>\n");
        gpx.push_str(&format!("    <name>{}</name>\n", escape_xml(&name)));
        gpx.push_str(&format!(
            "    <desc>{} km, {} min</desc>\n",
            trip.route.distance_km(),
            trip.route.duration_minutes()
        ));
        gpx.push_str("    <trkseg>\n");
        for point in &trip.route.geometry {
            gpx.push_str(&format!(
                "      <trkpt lat=\"{}\" lon=\"{}\"/>\n",
                point.lat, point.lng
            ));
        }
        gpx.push_str("    </trkseg>\n");
        gpx.push_str("  </trk>\n");

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::fixtures;
    use crate::sellers::FilterCriteria;

    #[test]
    fn test_gpx_nearby_waypoints() {
        let report = fixtures::report(FilterCriteria::default());
        let output = GpxFormatter
            .format_nearby(&report, &Config::default())
            .unwrap();

        assert!(output.starts_with("<?xml"));
        assert!(output.trim_end().ends_with("</gpx>"));
        // "You" plus four sellers
        assert_eq!(output.matches("<wpt ").count(), 5);
        assert!(output.contains(r#"<wpt lat="3.848" lon="11.502">"#));
    }

    #[test]
    fn test_gpx_trip_track() {
        let output = GpxFormatter
            .format_trip(&fixtures::trip(), &Config::default())
            .unwrap();

        assert_eq!(output.matches("<trkpt ").count(), 3);
        assert!(output.contains(r#"<trkpt lat="3.87" lon="11.49"/>"#));
        assert!(output.contains("<desc>5.2 km, 12 min</desc>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Gaz & Co <1>"), "Gaz &amp; Co &lt;1&gt;");
    }
}
