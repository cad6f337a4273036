//! Bounded route cache
//!
//! Entries expire a fixed time after insertion (checked lazily on read) and
//! the entry count is capped, evicting the oldest insertion first.

use crate::constants::cache::{ROUTE_CACHE_CAPACITY, ROUTE_KEY_PRECISION, ROUTE_TTL_SECS};
use crate::coord::Coordinate;
use crate::routing::Route;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Cache key derived from origin and destination rounded to 6 decimals
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey(String);

impl RouteKey {
    pub fn new(origin: Coordinate, destination: Coordinate) -> Self {
        Self(format!(
            "{}-{}",
            origin.to_fixed(ROUTE_KEY_PRECISION),
            destination.to_fixed(ROUTE_KEY_PRECISION)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RouteKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cached route and when it was stored
#[derive(Debug, Clone)]
pub struct RouteCacheEntry {
    pub route: Route,
    pub inserted_at: Instant,
}

/// TTL + capacity bounded route cache
#[derive(Debug)]
pub struct RouteCache {
    entries: HashMap<RouteKey, RouteCacheEntry>,
    /// Keys in insertion order, oldest first
    order: VecDeque<RouteKey>,
    ttl: Duration,
    capacity: usize,
}

impl Default for RouteCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(ROUTE_TTL_SECS), ROUTE_CACHE_CAPACITY)
    }
}

impl RouteCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Look up a non-expired route; an expired entry is dropped
    pub fn get(&mut self, key: &RouteKey, now: Instant) -> Option<Route> {
        let expired = match self.entries.get(key) {
            None => return None,
            Some(entry) => now.saturating_duration_since(entry.inserted_at) > self.ttl,
        };

        if expired {
            debug!("Route cache entry expired: {}", key);
            self.remove(key);
            return None;
        }

        self.entries.get(key).map(|entry| entry.route.clone())
    }

    /// Store a route, evicting the oldest insertions beyond capacity
    pub fn insert(&mut self, key: RouteKey, route: Route, now: Instant) {
        if self.entries.contains_key(&key) {
            self.order.retain(|k| k != &key);
        }
        self.entries.insert(
            key.clone(),
            RouteCacheEntry {
                route,
                inserted_at: now,
            },
        );
        self.order.push_back(key);

        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            debug!("Route cache full, evicting {}", oldest);
            self.entries.remove(&oldest);
        }
    }

    pub fn contains(&self, key: &RouteKey) -> bool {
        self.entries.contains_key(key)
    }

    fn remove(&mut self, key: &RouteKey) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
