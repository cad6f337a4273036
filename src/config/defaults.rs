//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants::{api, cache, geo, location, routing};

/// Fallback latitude when no live position is available
pub const DEFAULT_FALLBACK_LAT: f64 = geo::FALLBACK_LAT;

/// Fallback longitude when no live position is available
pub const DEFAULT_FALLBACK_LNG: f64 = geo::FALLBACK_LNG;

/// Request high-accuracy fixes by default
pub const DEFAULT_HIGH_ACCURACY: bool = true;

/// Default location fix timeout in milliseconds
pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = location::FIX_TIMEOUT_MS;

/// Default maximum age of a cached platform fix in milliseconds
pub const DEFAULT_MAXIMUM_AGE_MS: u64 = location::MAXIMUM_AGE_MS;

/// Default poll period for watched IP positions in seconds
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 60;

/// Default routing provider base URL
pub const DEFAULT_ROUTING_URL: &str = api::OPENROUTESERVICE_URL;

/// Default routing profile
pub const DEFAULT_ROUTING_PROFILE: &str = api::OPENROUTESERVICE_PROFILE;

/// Default routing request timeout in seconds
pub const DEFAULT_ROUTING_TIMEOUT_SECS: u64 = routing::TIMEOUT_SECS;

/// Default route cache TTL in seconds
pub const DEFAULT_CACHE_TTL_SECS: u64 = cache::ROUTE_TTL_SECS;

/// Default route cache capacity
pub const DEFAULT_CACHE_CAPACITY: usize = cache::ROUTE_CACHE_CAPACITY;

/// Default output format
pub const DEFAULT_FORMAT: &str = "text";

/// Default number of sellers listed
pub const DEFAULT_LIMIT: usize = 10;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 7878;

/// Default URL provider
pub const DEFAULT_URL_PROVIDER: &str = "google";

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "gaz-finder";
