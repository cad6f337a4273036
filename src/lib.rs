//! gaz-finder: Nearest Cooking Gas Seller Finder
//!
//! A library and CLI tool that ranks gas bottle sellers by distance from the
//! user and resolves driving routes to them.
//!
//! ## Features
//!
//! - Location resolution with permission tracking and a fallback coordinate
//! - Haversine proximity ranking with brand and bottle-size filters
//! - Route resolution through OpenRouteService with a TTL cache and
//!   supersession of stale requests
//! - Favorites, multiple output formats, HTTP API + CLI interface
//!
//! ## Quick Start
//!
//! ```rust
//! use gaz_finder::coord::Coordinate;
//! use gaz_finder::ranking::rank;
//! use gaz_finder::sellers::{Catalog, FilterCriteria, SizeClass};
//!
//! let catalog = Catalog::builtin();
//! let here = Coordinate::new(3.850, 11.500); // Yaoundé
//! let criteria = FilterCriteria::new("", Some(SizeClass::Small));
//!
//! for ranked in rank(Some(here), catalog.sellers(), &criteria) {
//!     println!("{} - {:.1} km", ranked.seller.display_name, ranked.distance_km);
//! }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod coord;
pub mod error;
pub mod favorites;
pub mod format;
pub mod location;
pub mod ranking;
pub mod routing;
pub mod sellers;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use coord::Coordinate;
pub use error::{Error, Result};
pub use location::{LocationResolver, LocationState, Permission};
pub use ranking::{rank, ProximityRanker, RankedSeller};
pub use routing::{Route, RouteOutcome, RouteResolver};
pub use sellers::{Catalog, FilterCriteria, Seller, SizeClass};
