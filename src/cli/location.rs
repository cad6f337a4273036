//! Shared origin arguments
//!
//! Every command that needs the user's position goes through a
//! `LocationResolver`, so failures degrade to the configured fallback.

use crate::config::Config;
use crate::coord::Coordinate;
use crate::error::Result;
use crate::location::fixed::StaticLocationPlatform;
use crate::location::ip::IpLocationPlatform;
use crate::location::{LocationResolver, LocationState};
use clap::Args;

/// Where the user is
#[derive(Args, Debug, Clone)]
pub struct LocationArgs {
    /// Latitude
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Use current location (IP geolocation); the default without --lat/--lng
    #[arg(long, conflicts_with_all = ["lat", "lng"])]
    pub here: bool,
}

/// Resolve the user's location
///
/// Never fails on location problems: the returned state carries the
/// fallback coordinate and an error message instead.
pub async fn resolve(args: &LocationArgs, config: &Config) -> Result<LocationState> {
    let fallback = config.location.fallback();
    let options = config.location.position_options();

    let state = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) if !args.here => {
            let coordinate = Coordinate::try_new(lat, lng)?;
            LocationResolver::new(StaticLocationPlatform::new(coordinate), fallback, options)
                .initialize()
                .await
        }
        _ => {
            let platform = IpLocationPlatform::new(config.location.watch_interval());
            let state = LocationResolver::new(platform, fallback, options)
                .initialize()
                .await;
            if let (Some(coordinate), None) = (state.coordinate, &state.error) {
                eprintln!("Using IP location: {}", coordinate);
            }
            state
        }
    };

    if let (Some(error), Some(coordinate)) = (&state.error, state.coordinate) {
        eprintln!("Warning: {}; using fallback location {}", error, coordinate);
    }

    Ok(state)
}

/// The coordinate of a resolved state, falling back to the configured one
pub fn origin_of(state: &LocationState, config: &Config) -> Coordinate {
    state
        .coordinate
        .unwrap_or_else(|| config.location.fallback())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Permission;

    fn args(lat: Option<f64>, lng: Option<f64>) -> LocationArgs {
        LocationArgs {
            lat,
            lng,
            here: false,
        }
    }

    #[tokio::test]
    async fn test_explicit_coordinates_resolve_exactly() {
        let state = resolve(&args(Some(4.09), Some(9.714)), &Config::default())
            .await
            .unwrap();

        assert_eq!(state.coordinate, Some(Coordinate::new(4.09, 9.714)));
        assert_eq!(state.permission, Permission::Granted);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_out_of_range_coordinates_rejected() {
        let result = resolve(&args(Some(91.0), Some(9.714)), &Config::default()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_origin_of_falls_back() {
        let config = Config::default();
        let state = LocationState::initial();
        assert_eq!(origin_of(&state, &config), config.location.fallback());
    }
}
