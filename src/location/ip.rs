//! IP-based location platform
//!
//! Uses ip-api.com for IP geolocation with file-based caching. There is no
//! permission concept for IP lookups, so `query_permission` reports no API.
//! The cache honors the request's `maximum_age`.

use crate::constants::api::IP_API_URL;
use crate::constants::location::IP_ACCURACY_METERS;
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use crate::location::{LocationPlatform, Permission, PositionFix, PositionOptions, PositionUpdates};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const CACHE_FILE_NAME: &str = "ip_location_cache.json";
const WATCH_CHANNEL_CAPACITY: usize = 16;

/// IP geolocation platform with caching
#[derive(Debug, Clone)]
pub struct IpLocationPlatform {
    client: reqwest::Client,
    url: String,
    cache_path: Option<PathBuf>,
    watch_interval: Duration,
}

/// ip-api.com response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    message: Option<String>,
}

/// Cached fix data
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedFix {
    fix: PositionFix,
    #[serde(default)]
    city: Option<String>,
}

impl IpLocationPlatform {
    /// Create a platform with the default cache path
    pub fn new(watch_interval: Duration) -> Self {
        let cache_path = dirs::cache_dir().map(|p| p.join("gaz-finder").join(CACHE_FILE_NAME));

        Self {
            client: reqwest::Client::new(),
            url: IP_API_URL.to_string(),
            cache_path,
            watch_interval,
        }
    }

    /// Create a platform with a specific cache path
    pub fn with_cache_path(cache_path: PathBuf, watch_interval: Duration) -> Self {
        Self {
            cache_path: Some(cache_path),
            ..Self::new(watch_interval)
        }
    }

    /// Create a platform without caching
    pub fn without_cache(watch_interval: Duration) -> Self {
        Self {
            cache_path: None,
            ..Self::new(watch_interval)
        }
    }

    /// Point the platform at a different lookup endpoint
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Fetch a fix from ip-api.com
    async fn fetch_fix(&self, timeout: Duration) -> Result<CachedFix> {
        let response = self
            .client
            .get(&self.url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::LocationTimeout
                } else {
                    Error::LocationUnavailable(format!("IP location request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(Error::LocationUnavailable(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response.json().await.map_err(|e| {
            Error::LocationUnavailable(format!("Failed to parse IP location response: {}", e))
        })?;

        if data.status != "success" {
            return Err(Error::LocationUnavailable(format!(
                "IP location lookup failed: {}",
                data.message.unwrap_or_else(|| "unknown reason".to_string())
            )));
        }

        let lat = data
            .lat
            .ok_or_else(|| Error::LocationUnavailable("No latitude in response".to_string()))?;
        let lng = data
            .lon
            .ok_or_else(|| Error::LocationUnavailable("No longitude in response".to_string()))?;
        let coordinate = Coordinate::try_new(lat, lng)
            .map_err(|e| Error::LocationUnavailable(e.to_string()))?;

        Ok(CachedFix {
            fix: PositionFix::now(coordinate, Some(IP_ACCURACY_METERS)),
            city: data.city,
        })
    }

    /// Load cached fix if younger than `maximum_age`
    fn load_cache(&self, maximum_age: Duration) -> Option<CachedFix> {
        let cache_path = self.cache_path.as_ref()?;

        if !cache_path.exists() {
            return None;
        }

        let content = fs::read_to_string(cache_path).ok()?;
        let cached: CachedFix = serde_json::from_str(&content).ok()?;

        if cached.fix.age() <= maximum_age {
            Some(cached)
        } else {
            None
        }
    }

    /// Save fix to cache
    fn save_cache(&self, cached: &CachedFix) {
        let Some(cache_path) = &self.cache_path else {
            return;
        };

        if let Some(parent) = cache_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        if let Ok(content) = serde_json::to_string_pretty(cached) {
            if let Err(e) = fs::write(cache_path, content) {
                debug!("Failed to write IP location cache: {}", e);
            }
        }
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        if let Some(cache_path) = &self.cache_path {
            let _ = fs::remove_file(cache_path);
        }
    }
}

impl LocationPlatform for IpLocationPlatform {
    async fn query_permission(&self) -> Option<Permission> {
        None
    }

    async fn current_position(&self, options: PositionOptions) -> Result<PositionFix> {
        if let Some(cached) = self.load_cache(options.maximum_age) {
            debug!("Using cached IP location {}", cached.fix.coordinate);
            return Ok(cached.fix);
        }

        let cached = self.fetch_fix(options.timeout).await?;
        if let Some(city) = &cached.city {
            debug!("IP location resolved to {} ({})", cached.fix.coordinate, city);
        }
        self.save_cache(&cached);

        Ok(cached.fix)
    }

    fn watch_position(&self, options: PositionOptions) -> Result<PositionUpdates> {
        let (tx, rx) = mpsc::channel(WATCH_CHANNEL_CAPACITY);
        let platform = self.clone();

        tokio::spawn(async move {
            loop {
                let update = platform.fetch_fix(options.timeout).await.map(|cached| {
                    platform.save_cache(&cached);
                    cached.fix
                });
                if let Err(e) = &update {
                    warn!("IP location poll failed: {}", e);
                }
                if tx.send(update).await.is_err() {
                    break;
                }

                tokio::select! {
                    _ = tokio::time::sleep(platform.watch_interval) => {}
                    _ = tx.closed() => break,
                }
            }
            debug!("IP location watch stopped");
        });

        Ok(rx)
    }
}
