//! Server shared state
//!
//! Holds configuration and shared resources for the HTTP server.

use crate::config::Config;
use crate::error::Result;
use crate::favorites::Favorites;
use crate::location::ip::IpLocationPlatform;
use crate::location::LocationResolver;
use crate::ranking::ProximityRanker;
use crate::routing::{OpenRouteService, RouteCache, RouteResolver, SharedRouteCache};
use crate::sellers::Catalog;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::debug;

/// Session used when a route request names none
pub const DEFAULT_SESSION: &str = "default";

/// Idle session resolvers are dropped once this many exist
const MAX_SESSIONS: usize = 256;

pub type SessionResolver = Arc<RouteResolver<OpenRouteService>>;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Arc<RwLock<Config>>,

    /// Seller catalog, static for the server's lifetime
    pub catalog: Catalog,

    /// Server-side location (IP geolocation of the host)
    pub location: LocationResolver<IpLocationPlatform>,

    pub ranker: tokio::sync::Mutex<ProximityRanker>,

    pub favorites: tokio::sync::Mutex<Favorites>,

    provider: OpenRouteService,
    route_cache: SharedRouteCache,
    /// One resolver per client session, all sharing `route_cache`
    sessions: Mutex<HashMap<String, SessionResolver>>,

    started_at: Instant,
}

impl AppState {
    /// Create application state from config
    ///
    /// Loads the catalog and favorites from their configured locations.
    pub fn new(config: Config) -> Result<Self> {
        let catalog = Catalog::load(&config.catalog.path)?;
        let favorites = Favorites::load()?;
        let platform = IpLocationPlatform::new(config.location.watch_interval());
        Self::from_parts(config, catalog, favorites, platform)
    }

    /// Create application state from already loaded parts
    pub fn from_parts(
        config: Config,
        catalog: Catalog,
        favorites: Favorites,
        platform: IpLocationPlatform,
    ) -> Result<Self> {
        let provider = OpenRouteService::from_config(&config.routing)?;
        let route_cache = Arc::new(Mutex::new(RouteCache::new(
            config.routing.cache_ttl(),
            config.routing.cache_capacity,
        )));
        let location = LocationResolver::new(
            platform,
            config.location.fallback(),
            config.location.position_options(),
        );

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            catalog,
            location,
            ranker: tokio::sync::Mutex::new(ProximityRanker::new()),
            favorites: tokio::sync::Mutex::new(favorites),
            provider,
            route_cache,
            sessions: Mutex::new(HashMap::new()),
            started_at: Instant::now(),
        })
    }

    /// Route resolver for a client session, created on first use
    pub async fn resolver(&self, session: &str) -> SessionResolver {
        let timeout = self.config.read().await.routing.timeout();
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some(resolver) = sessions.get(session) {
            return Arc::clone(resolver);
        }

        if sessions.len() >= MAX_SESSIONS {
            // Resolvers not referenced by a request in flight
            sessions.retain(|_, resolver| Arc::strong_count(resolver) > 1);
            debug!("Pruned idle route sessions, {} remain", sessions.len());
        }

        let resolver = Arc::new(RouteResolver::with_cache(
            self.provider.clone(),
            Arc::clone(&self.route_cache),
            timeout,
        ));
        sessions.insert(session.to_string(), Arc::clone(&resolver));
        resolver
    }

    /// Number of cached routes across all sessions
    pub fn cached_routes(&self) -> usize {
        self.route_cache
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn has_routing_key(&self) -> bool {
        self.provider.has_api_key()
    }
}
