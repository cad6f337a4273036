//! Route resolution
//!
//! This module handles:
//! - The routing provider capability (`RouteProvider`)
//! - A bounded TTL cache of resolved routes (`RouteCache`)
//! - `RouteResolver`, which guarantees that only the newest request of an
//!   instance can write to the cache or produce a result
//!
//! ## Flex Point
//! Adding a new routing provider only requires implementing `RouteProvider`
//! in its own file next to `openroute.rs`.

pub mod cache;
pub mod openroute;

pub use cache::{RouteCache, RouteKey};
pub use openroute::OpenRouteService;

use crate::constants::routing::TIMEOUT_SECS;
use crate::coord::Coordinate;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A drivable route between two coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Path points, latitude-first
    pub geometry: Vec<Coordinate>,
    pub distance_meters: f64,
    pub duration_seconds: f64,
}

impl Route {
    /// Distance in kilometers, rounded to one decimal
    pub fn distance_km(&self) -> f64 {
        (self.distance_meters / 100.0).round() / 10.0
    }

    /// Duration rounded to whole minutes
    pub fn duration_minutes(&self) -> u64 {
        (self.duration_seconds / 60.0).round().max(0.0) as u64
    }

    /// South-west and north-east corners of the geometry
    pub fn bounds(&self) -> Option<(Coordinate, Coordinate)> {
        let first = self.geometry.first()?;
        let (mut south_west, mut north_east) = (*first, *first);
        for point in &self.geometry[1..] {
            south_west.lat = south_west.lat.min(point.lat);
            south_west.lng = south_west.lng.min(point.lng);
            north_east.lat = north_east.lat.max(point.lat);
            north_east.lng = north_east.lng.max(point.lng);
        }
        Some((south_west, north_east))
    }
}

/// Result of a resolution that did not fail
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Resolved(Route),
    /// A newer request (or `cancel`) took over; nothing was cached
    Superseded,
}

impl RouteOutcome {
    pub fn into_route(self) -> Option<Route> {
        match self {
            Self::Resolved(route) => Some(route),
            Self::Superseded => None,
        }
    }
}

/// External routing provider
///
/// Implementations must be thread-safe (Send + Sync) to work with the async
/// server. Coordinates are passed latitude-first; the provider converts them
/// to its own axis order.
pub trait RouteProvider: Send + Sync {
    /// Provider name (e.g., "openrouteservice")
    fn name(&self) -> &'static str;

    /// Fetch a route from `origin` to `destination`
    ///
    /// An empty route list must be reported as `Error::RouteNotFound`.
    fn fetch_route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> impl Future<Output = Result<Route>> + Send;
}

/// Route cache shared between resolvers
pub type SharedRouteCache = Arc<Mutex<RouteCache>>;

#[derive(Debug, Default)]
struct InFlight {
    seq: u64,
    token: CancellationToken,
}

/// Resolves routes through a cache, letting only the newest request matter
///
/// Each `resolve` call cancels the previous one on the same instance. A
/// cancelled request never writes to the cache and returns
/// `RouteOutcome::Superseded`.
#[derive(Debug)]
pub struct RouteResolver<P> {
    provider: P,
    cache: SharedRouteCache,
    current: Mutex<InFlight>,
    timeout: Duration,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<P: RouteProvider> RouteResolver<P> {
    /// Create a resolver with its own default-sized cache
    pub fn new(provider: P) -> Self {
        Self::with_cache(
            provider,
            Arc::new(Mutex::new(RouteCache::default())),
            Duration::from_secs(TIMEOUT_SECS),
        )
    }

    /// Create a resolver over an existing, possibly shared, cache
    pub fn with_cache(provider: P, cache: SharedRouteCache, timeout: Duration) -> Self {
        Self {
            provider,
            cache,
            current: Mutex::new(InFlight::default()),
            timeout,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn cache(&self) -> &SharedRouteCache {
        &self.cache
    }

    /// Resolve a route, superseding any request still in flight
    ///
    /// # Returns
    /// `Resolved` with the route, `Superseded` if a newer request or
    /// `cancel` took over, or a typed error. Failures are never cached.
    pub async fn resolve(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<RouteOutcome> {
        origin.validate()?;
        destination.validate()?;

        let key = RouteKey::new(origin, destination);
        let (seq, token) = self.begin();

        let cached = lock(&self.cache).get(&key, Instant::now());
        if let Some(route) = cached {
            debug!("Route cache hit: {}", key);
            return Ok(RouteOutcome::Resolved(route));
        }
        debug!("Route cache miss: {}, asking {}", key, self.provider.name());

        let fetch = tokio::time::timeout(
            self.timeout,
            self.provider.fetch_route(origin, destination),
        );
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!("Route request {} superseded in flight", key);
                return Ok(RouteOutcome::Superseded);
            }
            result = fetch => result,
        };

        let result = match result {
            Ok(result) => result,
            Err(_) => {
                warn!("Route request {} timed out after {:?}", key, self.timeout);
                Err(Error::RouteProvider(format!(
                    "Routing request timed out after {}s",
                    self.timeout.as_secs()
                )))
            }
        };

        // Checked under the in-flight lock so a newer request cannot start
        // between the check and the cache write
        let current = lock(&self.current);
        if current.seq != seq || token.is_cancelled() {
            debug!("Discarding stale route response for {}", key);
            return Ok(RouteOutcome::Superseded);
        }

        match result {
            Ok(route) => {
                lock(&self.cache).insert(key, route.clone(), Instant::now());
                Ok(RouteOutcome::Resolved(route))
            }
            Err(e) => {
                debug!("Route resolution failed for {}: {}", key, e);
                Err(e)
            }
        }
    }

    /// Abandon the in-flight request, if any
    pub fn cancel(&self) {
        lock(&self.current).token.cancel();
    }

    /// Drop every cached route
    pub fn clear_cache(&self) {
        lock(&self.cache).clear();
    }

    pub fn cache_len(&self) -> usize {
        lock(&self.cache).len()
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let mut current = lock(&self.current);
        current.token.cancel();
        current.seq += 1;
        current.token = CancellationToken::new();
        (current.seq, current.token.clone())
    }
}

impl<P> Drop for RouteResolver<P> {
    fn drop(&mut self) {
        lock(&self.current).token.cancel();
    }
}
