//! Encoded polyline decoding
//!
//! Routing providers return route geometry in the Google encoded polyline
//! format: each point is a latitude/longitude delta from the previous point,
//! scaled by 10^precision, zig-zag encoded and split into 5-bit chunks
//! offset by 63 into printable ASCII.
//!
//! Note the decoded order is latitude-first, unlike the provider's request
//! coordinates.

use crate::coord::Coordinate;
use crate::error::{Error, Result};

/// Precision used by OpenRouteService and Google encoded polylines
pub const DEFAULT_PRECISION: u32 = 5;

/// Decode an encoded polyline into an ordered sequence of coordinates
///
/// # Arguments
/// * `encoded` - The encoded polyline string
/// * `precision` - Number of decimal digits encoded (5 for most providers)
pub fn decode(encoded: &str, precision: u32) -> Result<Vec<Coordinate>> {
    let factor = 10f64.powi(precision as i32);
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        lat += next_value(bytes, &mut index)?;
        if index >= bytes.len() {
            return Err(Error::Polyline(
                "truncated input: latitude without longitude".to_string(),
            ));
        }
        lng += next_value(bytes, &mut index)?;

        let point = Coordinate::try_new(lat as f64 / factor, lng as f64 / factor)
            .map_err(|e| Error::Polyline(format!("decoded point out of range: {}", e)))?;
        points.push(point);
    }

    Ok(points)
}

/// Read one zig-zag encoded signed value starting at `index`
fn next_value(bytes: &[u8], index: &mut usize) -> Result<i64> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes
            .get(*index)
            .ok_or_else(|| Error::Polyline("truncated input".to_string()))?;
        if !(63..=126).contains(&byte) {
            return Err(Error::Polyline(format!(
                "invalid character {:?} at offset {}",
                byte as char, index
            )));
        }
        *index += 1;

        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
        if shift > 60 {
            return Err(Error::Polyline("value too long".to_string()));
        }
    }

    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
