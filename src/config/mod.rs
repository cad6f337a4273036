//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/gaz-finder/config.toml

pub mod defaults;

use crate::constants::api::OPENROUTESERVICE_KEY_ENV;
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::location::PositionOptions;
use defaults::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Default values for commands
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Location acquisition settings
    #[serde(default)]
    pub location: LocationConfig,

    /// Routing provider and cache settings
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Seller catalog settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// URL generation settings
    #[serde(default)]
    pub url: UrlConfig,
}

/// Default values for commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default output format
    #[serde(default = "default_format")]
    pub format: String,

    /// Default number of sellers listed
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Location acquisition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Latitude substituted when no live position is available
    #[serde(default = "default_fallback_lat")]
    pub fallback_lat: f64,

    /// Longitude substituted when no live position is available
    #[serde(default = "default_fallback_lng")]
    pub fallback_lng: f64,

    /// Ask the platform for a high-accuracy fix
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,

    /// Fix timeout in milliseconds
    #[serde(default = "default_location_timeout_ms")]
    pub timeout_ms: u64,

    /// Oldest cached platform fix accepted, in milliseconds
    #[serde(default = "default_maximum_age_ms")]
    pub maximum_age_ms: u64,

    /// Poll period for watched IP positions
    #[serde(default = "default_watch_interval_secs")]
    pub watch_interval_secs: u64,
}

/// Routing provider and cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Provider base URL
    #[serde(default = "default_routing_url")]
    pub base_url: String,

    /// Provider routing profile
    #[serde(default = "default_routing_profile")]
    pub profile: String,

    /// Provider API key
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_routing_timeout_secs")]
    pub timeout_secs: u64,

    /// Route cache entry lifetime in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Maximum number of cached routes
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

/// Seller catalog settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// JSON catalog file; empty means the built-in sample catalog
    #[serde(default)]
    pub path: String,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// URL generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlConfig {
    /// Default URL provider
    #[serde(default = "default_url_provider")]
    pub default: String,

    /// URL provider templates
    #[serde(default = "default_url_providers")]
    pub providers: HashMap<String, String>,
}

// Default value functions for serde
fn default_format() -> String {
    DEFAULT_FORMAT.to_string()
}
fn default_limit() -> usize {
    DEFAULT_LIMIT
}
fn default_fallback_lat() -> f64 {
    DEFAULT_FALLBACK_LAT
}
fn default_fallback_lng() -> f64 {
    DEFAULT_FALLBACK_LNG
}
fn default_high_accuracy() -> bool {
    DEFAULT_HIGH_ACCURACY
}
fn default_location_timeout_ms() -> u64 {
    DEFAULT_LOCATION_TIMEOUT_MS
}
fn default_maximum_age_ms() -> u64 {
    DEFAULT_MAXIMUM_AGE_MS
}
fn default_watch_interval_secs() -> u64 {
    DEFAULT_WATCH_INTERVAL_SECS
}
fn default_routing_url() -> String {
    DEFAULT_ROUTING_URL.to_string()
}
fn default_routing_profile() -> String {
    DEFAULT_ROUTING_PROFILE.to_string()
}
fn default_routing_timeout_secs() -> u64 {
    DEFAULT_ROUTING_TIMEOUT_SECS
}
fn default_cache_ttl_secs() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}
fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_CAPACITY
}
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_url_provider() -> String {
    DEFAULT_URL_PROVIDER.to_string()
}
fn default_url_providers() -> HashMap<String, String> {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        "https://www.google.com/maps/search/?api=1&query={lat},{lng}".to_string(),
    );
    providers.insert(
        "openstreetmap".to_string(),
        "https://www.openstreetmap.org/?mlat={lat}&mlon={lng}#map=17/{lat}/{lng}".to_string(),
    );
    providers.insert(
        "apple".to_string(),
        "https://maps.apple.com/?ll={lat},{lng}".to_string(),
    );
    providers
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            limit: default_limit(),
        }
    }
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            fallback_lat: default_fallback_lat(),
            fallback_lng: default_fallback_lng(),
            high_accuracy: default_high_accuracy(),
            timeout_ms: default_location_timeout_ms(),
            maximum_age_ms: default_maximum_age_ms(),
            watch_interval_secs: default_watch_interval_secs(),
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: default_routing_url(),
            profile: default_routing_profile(),
            api_key: String::new(),
            timeout_secs: default_routing_timeout_secs(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            default: default_url_provider(),
            providers: default_url_providers(),
        }
    }
}

impl LocationConfig {
    /// The coordinate substituted when acquisition fails
    ///
    /// An out-of-range configured value falls back to the built-in city center.
    pub fn fallback(&self) -> Coordinate {
        Coordinate::try_new(self.fallback_lat, self.fallback_lng)
            .unwrap_or(Coordinate::new(DEFAULT_FALLBACK_LAT, DEFAULT_FALLBACK_LNG))
    }

    /// Options for a full-accuracy fix
    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.high_accuracy,
            timeout: Duration::from_millis(self.timeout_ms),
            maximum_age: Duration::from_millis(self.maximum_age_ms),
        }
    }

    /// Poll period for watched positions
    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.watch_interval_secs.max(1))
    }
}

impl RoutingConfig {
    /// API key from config, or from the environment when the config key is empty
    pub fn resolved_api_key(&self) -> Option<String> {
        if !self.api_key.is_empty() {
            return Some(self.api_key.clone());
        }
        std::env::var(OPENROUTESERVICE_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
    }

    /// Provider request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Route cache entry lifetime
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file, writing defaults there if missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "format"] => Some(self.defaults.format.clone()),
            ["defaults", "limit"] => Some(self.defaults.limit.to_string()),

            ["location", "fallback_lat"] => Some(self.location.fallback_lat.to_string()),
            ["location", "fallback_lng"] => Some(self.location.fallback_lng.to_string()),
            ["location", "high_accuracy"] => Some(self.location.high_accuracy.to_string()),
            ["location", "timeout_ms"] => Some(self.location.timeout_ms.to_string()),
            ["location", "maximum_age_ms"] => Some(self.location.maximum_age_ms.to_string()),
            ["location", "watch_interval_secs"] => {
                Some(self.location.watch_interval_secs.to_string())
            }

            ["routing", "base_url"] => Some(self.routing.base_url.clone()),
            ["routing", "profile"] => Some(self.routing.profile.clone()),
            ["routing", "api_key"] => Some(self.routing.api_key.clone()),
            ["routing", "timeout_secs"] => Some(self.routing.timeout_secs.to_string()),
            ["routing", "cache_ttl_secs"] => Some(self.routing.cache_ttl_secs.to_string()),
            ["routing", "cache_capacity"] => Some(self.routing.cache_capacity.to_string()),

            ["catalog", "path"] => Some(self.catalog.path.clone()),

            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["url", "default"] => Some(self.url.default.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["defaults", "format"] => {
                self.defaults.format = value.to_string();
            }
            ["defaults", "limit"] => {
                self.defaults.limit = parse_value(key, value)?;
            }

            ["location", "fallback_lat"] => {
                let lat: f64 = parse_value(key, value)?;
                Coordinate::try_new(lat, 0.0)?;
                self.location.fallback_lat = lat;
            }
            ["location", "fallback_lng"] => {
                let lng: f64 = parse_value(key, value)?;
                Coordinate::try_new(0.0, lng)?;
                self.location.fallback_lng = lng;
            }
            ["location", "high_accuracy"] => {
                self.location.high_accuracy = parse_value(key, value)?;
            }
            ["location", "timeout_ms"] => {
                self.location.timeout_ms = parse_value(key, value)?;
            }
            ["location", "maximum_age_ms"] => {
                self.location.maximum_age_ms = parse_value(key, value)?;
            }
            ["location", "watch_interval_secs"] => {
                self.location.watch_interval_secs = parse_value(key, value)?;
            }

            ["routing", "base_url"] => {
                self.routing.base_url = value.trim_end_matches('/').to_string();
            }
            ["routing", "profile"] => {
                self.routing.profile = value.to_string();
            }
            ["routing", "api_key"] => {
                self.routing.api_key = value.to_string();
            }
            ["routing", "timeout_secs"] => {
                self.routing.timeout_secs = parse_value(key, value)?;
            }
            ["routing", "cache_ttl_secs"] => {
                self.routing.cache_ttl_secs = parse_value(key, value)?;
            }
            ["routing", "cache_capacity"] => {
                self.routing.cache_capacity = parse_value(key, value)?;
            }

            ["catalog", "path"] => {
                self.catalog.path = value.to_string();
            }

            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = parse_value(key, value)?;
            }

            ["url", "default"] => {
                self.url.default = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "defaults.format",
            "defaults.limit",
            "location.fallback_lat",
            "location.fallback_lng",
            "location.high_accuracy",
            "location.timeout_ms",
            "location.maximum_age_ms",
            "location.watch_interval_secs",
            "routing.base_url",
            "routing.profile",
            "routing.api_key",
            "routing.timeout_secs",
            "routing.cache_ttl_secs",
            "routing.cache_capacity",
            "catalog.path",
            "server.host",
            "server.port",
            "url.default",
        ]
    }

    /// Format a URL using the specified provider
    ///
    /// Replaces {lat} and {lng} placeholders with actual values
    pub fn format_url(&self, provider: Option<&str>, lat: f64, lng: f64) -> Result<String> {
        let provider_name = provider.unwrap_or(&self.url.default);

        let template = self.url.providers.get(provider_name).ok_or_else(|| {
            Error::Config(format!("Unknown URL provider: {}", provider_name))
        })?;

        Ok(template
            .replace("{lat}", &lat.to_string())
            .replace("{lng}", &lng.to_string()))
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}
