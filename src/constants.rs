//! Centralized constants for the gaz-finder crate
//!
//! This module consolidates constants that are used across multiple modules
//! to avoid duplication and ensure consistency.

/// Geographic constants
pub mod geo {
    /// Mean Earth radius in kilometers
    pub const EARTH_RADIUS_KM: f64 = 6371.0;

    /// Fallback latitude (Yaoundé city center)
    pub const FALLBACK_LAT: f64 = 3.848;

    /// Fallback longitude (Yaoundé city center)
    pub const FALLBACK_LNG: f64 = 11.502;
}

/// External API endpoints
pub mod api {
    /// OpenRouteService base URL
    pub const OPENROUTESERVICE_URL: &str = "https://api.openrouteservice.org";

    /// Default OpenRouteService routing profile
    pub const OPENROUTESERVICE_PROFILE: &str = "driving-car";

    /// Environment variable holding the OpenRouteService key
    pub const OPENROUTESERVICE_KEY_ENV: &str = "OPENROUTESERVICE_KEY";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "http://ip-api.com/json";
}

/// Route cache settings
pub mod cache {
    /// Route cache entry lifetime in seconds (10 minutes)
    pub const ROUTE_TTL_SECS: u64 = 600;

    /// Maximum number of cached routes
    pub const ROUTE_CACHE_CAPACITY: usize = 50;

    /// Decimal digits kept when building route cache keys
    pub const ROUTE_KEY_PRECISION: usize = 6;
}

/// Location acquisition settings
pub mod location {
    /// Full-accuracy fix timeout in milliseconds
    pub const FIX_TIMEOUT_MS: u64 = 15_000;

    /// Oldest cached platform fix accepted, in milliseconds (5 minutes)
    pub const MAXIMUM_AGE_MS: u64 = 300_000;

    /// Timeout of the low-accuracy request used to surface the permission prompt
    pub const PROMPT_TIMEOUT_MS: u64 = 10_000;

    /// Nominal accuracy reported for IP-derived positions, in meters
    pub const IP_ACCURACY_METERS: f64 = 5_000.0;
}

/// Routing provider settings
pub mod routing {
    /// Provider request timeout in seconds
    pub const TIMEOUT_SECS: u64 = 10;
}
