//! OpenRouteService routing provider
//!
//! Uses the directions endpoint: `POST {base}/v2/directions/{profile}` with a
//! JSON body of longitude-first coordinate pairs. The response carries an
//! encoded polyline (precision 5) and a distance/duration summary.
//! API documentation: https://openrouteservice.org/dev/#/api-docs/v2/directions

use crate::config::RoutingConfig;
use crate::coord::{polyline, Coordinate};
use crate::error::{Error, Result};
use crate::routing::{Route, RouteProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// ORS error code for "route could not be found"
const ORS_ROUTE_NOT_FOUND: u32 = 2009;
/// ORS error code for "point not found" (no routable road near a coordinate)
const ORS_POINT_NOT_FOUND: u32 = 2010;

/// OpenRouteService directions client
#[derive(Debug, Clone)]
pub struct OpenRouteService {
    client: reqwest::Client,
    base_url: String,
    profile: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    /// `[[lng, lat], [lng, lat]]`
    coordinates: [[f64; 2]; 2],
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    geometry: String,
    #[serde(default)]
    summary: Summary,
}

/// Distance in meters, duration in seconds; ORS omits both for zero-length routes
#[derive(Debug, Default, Deserialize)]
struct Summary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

/// Error body: `{"error": {"code": 2009, "message": "..."}}`
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: Option<u32>,
    #[serde(default)]
    message: Option<String>,
}

impl OpenRouteService {
    /// Create a client
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. `https://api.openrouteservice.org`
    /// * `profile` - Routing profile, e.g. `driving-car`
    /// * `api_key` - Sent as the `Authorization` header
    /// * `timeout` - Per-request transport timeout
    pub fn new(
        base_url: impl Into<String>,
        profile: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            profile: profile.into(),
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }

    /// Create a client from the `[routing]` config section
    pub fn from_config(config: &RoutingConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            config.profile.clone(),
            config.resolved_api_key(),
            config.timeout(),
        )
    }

    /// Whether an API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v2/directions/{}",
            self.base_url.trim_end_matches('/'),
            self.profile
        )
    }

    /// Map a non-2xx response to a typed error
    fn classify_failure(status: reqwest::StatusCode, body: &str) -> Error {
        if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
            if matches!(
                parsed.error.code,
                Some(ORS_ROUTE_NOT_FOUND) | Some(ORS_POINT_NOT_FOUND)
            ) {
                return Error::RouteNotFound;
            }
            if let Some(message) = parsed.error.message {
                return Error::RouteProvider(format!("{} ({})", message, status));
            }
        }
        Error::RouteProvider(format!("OpenRouteService returned status: {}", status))
    }
}

impl RouteProvider for OpenRouteService {
    fn name(&self) -> &'static str {
        "openrouteservice"
    }

    async fn fetch_route(&self, origin: Coordinate, destination: Coordinate) -> Result<Route> {
        let result = self.request(origin, destination).await;
        match &result {
            Err(Error::RouteNotFound) => debug!("No route between {} and {}", origin, destination),
            Err(e) => warn!("OpenRouteService request failed: {}", e),
            Ok(_) => {}
        }
        result
    }
}

impl OpenRouteService {
    async fn request(&self, origin: Coordinate, destination: Coordinate) -> Result<Route> {
        let Some(api_key) = &self.api_key else {
            return Err(Error::RouteProvider(
                "No OpenRouteService API key configured".to_string(),
            ));
        };

        let body = DirectionsRequest {
            coordinates: [origin.to_lng_lat(), destination.to_lng_lat()],
        };

        debug!("Requesting route {} -> {}", origin, destination);
        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::RouteProvider("Routing request timed out".to_string())
                } else {
                    Error::RouteProvider(format!("Routing request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Self::classify_failure(status, &text));
        }

        let data: DirectionsResponse = response.json().await.map_err(|e| {
            Error::RouteProvider(format!("Failed to parse routing response: {}", e))
        })?;

        let Some(route) = data.routes.into_iter().next() else {
            return Err(Error::RouteNotFound);
        };

        let geometry = polyline::decode(&route.geometry, polyline::DEFAULT_PRECISION)
            .map_err(|e| Error::RouteProvider(format!("Invalid route geometry: {}", e)))?;

        Ok(Route {
            geometry,
            distance_meters: route.summary.distance,
            duration_seconds: route.summary.duration,
        })
    }
}
