//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::coord::Coordinate;
use crate::error::Error;
use crate::format::{available_formats, FormatInfo, Trip};
use crate::location::LocationState;
use crate::ranking::NearbyReport;
use crate::routing::RouteOutcome;
use crate::sellers::{FilterCriteria, Seller, SizeClass};
use crate::server::state::{AppState, DEFAULT_SESSION};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/formats", get(formats_handler))
        .route("/api/location", get(location_handler))
        .route("/api/sellers", get(sellers_handler))
        .route("/api/sellers/:id", get(seller_handler))
        .route("/api/route", post(route_handler))
        .route("/api/favorites", get(favorites_handler))
        .route("/api/favorites/:id/toggle", post(toggle_favorite_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ApiError {
    fn unknown_seller(id: &str) -> Self {
        ApiError {
            error: format!("Unknown seller: {}", id),
            code: "SELLER_NOT_FOUND".to_string(),
            status: StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::InvalidCoordinates(_) => (StatusCode::BAD_REQUEST, "INVALID_COORDINATES"),
            Error::RouteNotFound => (StatusCode::NOT_FOUND, "ROUTE_NOT_FOUND"),
            Error::RouteProvider(_) | Error::Http(_) | Error::Polyline(_) => {
                (StatusCode::BAD_GATEWAY, "ROUTE_PROVIDER_ERROR")
            }
            Error::LocationUnavailable(_) | Error::PermissionDenied | Error::LocationTimeout => {
                (StatusCode::SERVICE_UNAVAILABLE, "LOCATION_UNAVAILABLE")
            }
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
            status,
        }
    }
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub version: String,
    /// Sellers in the catalog
    pub sellers: usize,
    /// Whether a routing API key is configured
    pub routing_configured: bool,
    pub cached_routes: usize,
    pub sessions: usize,
    pub uptime_secs: u64,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        sellers: state.catalog.len(),
        routing_configured: state.has_routing_key(),
        cached_routes: state.cached_routes(),
        sessions: state.session_count(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Formats list response
#[derive(Debug, Serialize, Deserialize)]
pub struct FormatsResponse {
    pub formats: Vec<FormatInfo>,
}

/// List available output formats
///
/// GET /api/formats
async fn formats_handler() -> Json<FormatsResponse> {
    Json(FormatsResponse {
        formats: available_formats(),
    })
}

/// Location query parameters
#[derive(Debug, Default, Deserialize)]
pub struct LocationQuery {
    /// Re-acquire even if a position is already held
    #[serde(default)]
    pub refresh: bool,
}

/// Server location, acquired on first use
async fn server_location(state: &AppState, refresh: bool) -> LocationState {
    let current = state.location.state();
    if current.coordinate.is_none() {
        return state.location.initialize().await;
    }
    if refresh {
        let options = state.config.read().await.location.position_options();
        return state.location.acquire_once(options).await;
    }
    current
}

/// Server location endpoint (IP geolocation, fallback on failure)
///
/// GET /api/location
async fn location_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LocationQuery>,
) -> Json<LocationState> {
    Json(server_location(&state, query.refresh).await)
}

/// Nearby sellers query parameters
#[derive(Debug, Default, Deserialize)]
pub struct SellersQuery {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(default)]
    pub brand: String,
    pub size: Option<SizeClass>,
    pub limit: Option<usize>,
}

/// Resolve a request origin: explicit coordinates, or the server location
async fn request_location(
    state: &AppState,
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<LocationState, ApiError> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => Ok(LocationState {
            coordinate: Some(Coordinate::try_new(lat, lng)?),
            ..LocationState::initial()
        }),
        (None, None) => Ok(server_location(state, false).await),
        _ => Err(ApiError {
            error: "lat and lng must be given together".to_string(),
            code: "INVALID_COORDINATES".to_string(),
            status: StatusCode::BAD_REQUEST,
        }),
    }
}

/// Sellers ranked by distance
///
/// GET /api/sellers?lat&lng&brand&size&limit
async fn sellers_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SellersQuery>,
) -> Result<Json<NearbyReport>, ApiError> {
    let location = request_location(&state, query.lat, query.lng).await?;
    let criteria = FilterCriteria::new(query.brand, query.size);
    let limit = match query.limit {
        Some(limit) => limit,
        None => state.config.read().await.defaults.limit,
    };

    let mut sellers = state
        .ranker
        .lock()
        .await
        .rank(location.coordinate, state.catalog.sellers(), &criteria);
    sellers.truncate(limit);

    Ok(Json(NearbyReport {
        location,
        criteria,
        sellers,
    }))
}

/// Single seller
///
/// GET /api/sellers/:id
async fn seller_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Seller>, ApiError> {
    state
        .catalog
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::unknown_seller(&id))
}

/// Route request body
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub seller_id: String,
    /// Client session; a newer request in the same session supersedes older ones
    #[serde(default)]
    pub session: Option<String>,
}

/// Route to a seller
///
/// POST /api/route
///
/// Answers 204 when a newer request of the same session took over.
async fn route_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RouteRequest>,
) -> Result<Response, ApiError> {
    let seller = state
        .catalog
        .get(&req.seller_id)
        .cloned()
        .ok_or_else(|| ApiError::unknown_seller(&req.seller_id))?;

    let location = request_location(&state, req.lat, req.lng).await?;
    let origin = location
        .coordinate
        .unwrap_or_else(|| state.location.fallback());

    let session = req.session.as_deref().unwrap_or(DEFAULT_SESSION);
    let resolver = state.resolver(session).await;

    match resolver.resolve(origin, seller.coordinate).await {
        Ok(RouteOutcome::Resolved(route)) => Ok(Json(Trip {
            origin,
            seller,
            route,
        })
        .into_response()),
        Ok(RouteOutcome::Superseded) => Ok(StatusCode::NO_CONTENT.into_response()),
        Err(e) => {
            debug!("Route to seller {} failed: {}", req.seller_id, e);
            Err(e.into())
        }
    }
}

/// Favorites response
#[derive(Debug, Serialize, Deserialize)]
pub struct FavoritesResponse {
    pub ids: Vec<String>,
    /// Favorite sellers still present in the catalog
    pub sellers: Vec<Seller>,
}

/// List favorites
///
/// GET /api/favorites
async fn favorites_handler(State(state): State<Arc<AppState>>) -> Json<FavoritesResponse> {
    let favorites = state.favorites.lock().await;
    let ids = favorites.all().to_vec();
    let sellers = ids
        .iter()
        .filter_map(|id| state.catalog.get(id).cloned())
        .collect();

    Json(FavoritesResponse { ids, sellers })
}

/// Toggle response
#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub id: String,
    pub favorite: bool,
}

/// Toggle a favorite
///
/// POST /api/favorites/:id/toggle
async fn toggle_favorite_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ToggleResponse>, ApiError> {
    if state.catalog.get(&id).is_none() {
        return Err(ApiError::unknown_seller(&id));
    }

    let mut favorites = state.favorites.lock().await;
    let favorite = favorites.toggle_and_save(&id)?;

    Ok(Json(ToggleResponse { id, favorite }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::favorites::Favorites;
    use crate::location::ip::IpLocationPlatform;
    use crate::location::Permission;
    use crate::sellers::Catalog;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct TestServer {
        state: Arc<AppState>,
        mock: MockServer,
        _temp: TempDir,
    }

    async fn create_test_server() -> TestServer {
        let mock = MockServer::start().await;
        let temp = TempDir::new().unwrap();

        let mut config = Config::default();
        config.routing.base_url = mock.uri();
        config.routing.api_key = "test-key".to_string();

        let favorites = Favorites::load_from(temp.path().join("favorites.json")).unwrap();
        let platform = IpLocationPlatform::without_cache(Duration::from_secs(60))
            .with_url(format!("{}/ip", mock.uri()));

        let state =
            AppState::from_parts(config, Catalog::builtin(), favorites, platform).unwrap();

        TestServer {
            state: Arc::new(state),
            mock,
            _temp: temp,
        }
    }

    async fn get(state: &Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = create_router(state.clone())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        read(response).await
    }

    async fn post(state: &Arc<AppState>, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = create_router(state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        read(response).await
    }

    async fn read(response: Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn route_body() -> serde_json::Value {
        serde_json::json!({
            "routes": [{
                "summary": { "distance": 4210.0, "duration": 540.0 },
                "geometry": "_p~iF~ps|U_ulLnnqC_mqNvxq`@"
            }]
        })
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let server = create_test_server().await;
        let (status, body) = get(&server.state, "/api/status").await;

        assert_eq!(status, StatusCode::OK);
        let status: StatusResponse = serde_json::from_value(body).unwrap();
        assert!(status.running);
        assert_eq!(status.sellers, 4);
        assert!(status.routing_configured);
        assert_eq!(status.cached_routes, 0);
    }

    #[tokio::test]
    async fn test_formats_endpoint() {
        let server = create_test_server().await;
        let (status, body) = get(&server.state, "/api/formats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["formats"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_sellers_ranked_from_given_origin() {
        let server = create_test_server().await;
        let (status, body) = get(&server.state, "/api/sellers?lat=3.85&lng=11.5").await;

        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body["sellers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "4", "2", "3"]);
    }

    #[tokio::test]
    async fn test_sellers_filtered_and_limited() {
        let server = create_test_server().await;

        let (_, body) = get(&server.state, "/api/sellers?lat=3.85&lng=11.5&size=12kg").await;
        assert_eq!(body["sellers"].as_array().unwrap().len(), 1);
        assert_eq!(body["sellers"][0]["id"], "3");

        let (_, body) = get(&server.state, "/api/sellers?lat=3.85&lng=11.5&brand=gaz").await;
        assert_eq!(body["sellers"].as_array().unwrap().len(), 1);
        assert_eq!(body["sellers"][0]["brand"], "CAMGAZ");

        let (_, body) = get(&server.state, "/api/sellers?lat=3.85&lng=11.5&limit=2").await;
        assert_eq!(body["sellers"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_sellers_rejects_invalid_origin() {
        let server = create_test_server().await;

        let (status, body) = get(&server.state, "/api/sellers?lat=95&lng=11.5").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_COORDINATES");

        let (status, _) = get(&server.state, "/api/sellers?lat=3.85").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_sellers_without_origin_use_fallback() {
        let server = create_test_server().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server.mock)
            .await;

        let (status, body) = get(&server.state, "/api/sellers").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["location"]["coordinate"]["lat"], 3.848);
        assert!(body["location"]["error"].is_string());
        assert_eq!(body["sellers"][0]["id"], "1");
    }

    #[tokio::test]
    async fn test_seller_endpoint() {
        let server = create_test_server().await;

        let (status, body) = get(&server.state, "/api/sellers/3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["display_name"], "QuickGaz Bonapriso");

        let (status, body) = get(&server.state, "/api/sellers/99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "SELLER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_location_endpoint() {
        let server = create_test_server().await;
        Mock::given(method("GET"))
            .and(path("/ip"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "city": "Douala",
                "lat": 4.0511,
                "lon": 9.7679
            })))
            .expect(1)
            .mount(&server.mock)
            .await;

        let (status, body) = get(&server.state, "/api/location").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["coordinate"]["lat"], 4.0511);
        assert_eq!(body["permission"], "granted");

        // Held position is reused
        let (_, body) = get(&server.state, "/api/location").await;
        assert_eq!(body["coordinate"]["lng"], 9.7679);
        assert_eq!(server.state.location.state().permission, Permission::Granted);
    }

    #[tokio::test]
    async fn test_route_endpoint_caches() {
        let server = create_test_server().await;
        Mock::given(method("POST"))
            .and(path("/v2/directions/driving-car"))
            .respond_with(ResponseTemplate::new(200).set_body_json(route_body()))
            .expect(1)
            .mount(&server.mock)
            .await;

        let request = serde_json::json!({ "lat": 3.85, "lng": 11.5, "seller_id": "4" });
        let (status, body) = post(&server.state, "/api/route", request.clone()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["seller"]["id"], "4");
        assert_eq!(body["route"]["distance_meters"], 4210.0);

        // Another session shares the cache
        let mut other = request;
        other["session"] = serde_json::json!("tab-2");
        let (status, _) = post(&server.state, "/api/route", other).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(server.state.cached_routes(), 1);
        assert_eq!(server.state.session_count(), 2);
    }

    /// Mount a directions response for one destination longitude
    async fn mount_directions(mock: &MockServer, lng: &str, delay: Duration, calls: u64) {
        Mock::given(method("POST"))
            .and(path("/v2/directions/driving-car"))
            .and(body_string_contains(lng))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(route_body())
                    .set_delay(delay),
            )
            .expect(calls)
            .mount(mock)
            .await;
    }

    async fn wait_for_requests(mock: &MockServer, count: usize) {
        for _ in 0..500 {
            let received = mock.received_requests().await.map_or(0, |r| r.len());
            if received >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("mock server never saw {} requests", count);
    }

    #[tokio::test]
    async fn test_route_same_session_is_superseded() {
        let server = create_test_server().await;
        // Seller 2 (Douala) answers slowly, seller 4 (Ngoa-Ekelle) at once
        mount_directions(&server.mock, "9.768", Duration::from_secs(2), 1).await;
        mount_directions(&server.mock, "11.477", Duration::ZERO, 1).await;

        let state = server.state.clone();
        let stale = tokio::spawn(async move {
            let request = serde_json::json!({ "lat": 3.85, "lng": 11.5, "seller_id": "2" });
            post(&state, "/api/route", request).await
        });
        wait_for_requests(&server.mock, 1).await;

        let request = serde_json::json!({ "lat": 3.85, "lng": 11.5, "seller_id": "4" });
        let (status, body) = post(&server.state, "/api/route", request.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["seller"]["id"], "4");

        let (status, body) = stale.await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, serde_json::Value::Null);

        // Only the newer route was cached; asking again never reaches the provider
        assert_eq!(server.state.cached_routes(), 1);
        let (status, _) = post(&server.state, "/api/route", request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(server.state.session_count(), 1);
    }

    #[tokio::test]
    async fn test_route_sessions_do_not_supersede_each_other() {
        let server = create_test_server().await;
        mount_directions(&server.mock, "9.768", Duration::from_millis(500), 1).await;
        mount_directions(&server.mock, "11.477", Duration::ZERO, 1).await;

        let state = server.state.clone();
        let slow = tokio::spawn(async move {
            let request = serde_json::json!({
                "lat": 3.85, "lng": 11.5, "seller_id": "2", "session": "tab-1"
            });
            post(&state, "/api/route", request).await
        });
        wait_for_requests(&server.mock, 1).await;

        let request = serde_json::json!({
            "lat": 3.85, "lng": 11.5, "seller_id": "4", "session": "tab-2"
        });
        let (status, _) = post(&server.state, "/api/route", request).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = slow.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["seller"]["id"], "2");

        // Both sessions wrote into the one shared cache
        assert_eq!(server.state.session_count(), 2);
        assert_eq!(server.state.cached_routes(), 2);
    }

    #[tokio::test]
    async fn test_route_not_found() {
        let server = create_test_server().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "routes": [] })),
            )
            .expect(2)
            .mount(&server.mock)
            .await;

        let request = serde_json::json!({ "lat": 3.85, "lng": 11.5, "seller_id": "2" });
        let (status, body) = post(&server.state, "/api/route", request.clone()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "ROUTE_NOT_FOUND");

        // Failures are not cached
        let (status, _) = post(&server.state, "/api/route", request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(server.state.cached_routes(), 0);
    }

    #[tokio::test]
    async fn test_route_provider_failure_is_bad_gateway() {
        let server = create_test_server().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server.mock)
            .await;

        let request = serde_json::json!({ "lat": 3.85, "lng": 11.5, "seller_id": "2" });
        let (status, body) = post(&server.state, "/api/route", request).await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["code"], "ROUTE_PROVIDER_ERROR");
    }

    #[tokio::test]
    async fn test_route_unknown_seller() {
        let server = create_test_server().await;
        let request = serde_json::json!({ "lat": 3.85, "lng": 11.5, "seller_id": "nope" });
        let (status, _) = post(&server.state, "/api/route", request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_favorites_toggle_and_list() {
        let server = create_test_server().await;

        let (status, body) = post(&server.state, "/api/favorites/2/toggle", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["favorite"], true);

        let (_, body) = get(&server.state, "/api/favorites").await;
        assert_eq!(body["ids"], serde_json::json!(["2"]));
        assert_eq!(body["sellers"][0]["display_name"], "SafeGaz Douala");

        let (_, body) = post(&server.state, "/api/favorites/2/toggle", serde_json::json!({})).await;
        assert_eq!(body["favorite"], false);

        let (status, _) = post(&server.state, "/api/favorites/99/toggle", serde_json::json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
