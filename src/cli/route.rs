//! Route command handler
//!
//! Resolves a driving route from the user to one seller.

use crate::cli::location::{self, LocationArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{get_formatter, Trip};
use crate::routing::{OpenRouteService, RouteCache, RouteOutcome, RouteResolver};
use crate::sellers::Catalog;
use clap::Args;
use std::sync::{Arc, Mutex};

/// Route command arguments
#[derive(Args)]
pub struct RouteArgs {
    /// Seller id (see `gaz-finder nearby`)
    pub seller_id: String,

    #[command(flatten)]
    pub location: LocationArgs,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,
}

/// Run the route command
pub async fn run(args: RouteArgs) -> Result<()> {
    let config = Config::load()?;
    let catalog = Catalog::load(&config.catalog.path)?;

    let seller = catalog
        .get(&args.seller_id)
        .cloned()
        .ok_or_else(|| Error::Config(format!("Unknown seller: {}", args.seller_id)))?;

    let format = args.format.unwrap_or(config.defaults.format.clone());
    let formatter = get_formatter(&format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;

    let state = location::resolve(&args.location, &config).await?;
    let origin = location::origin_of(&state, &config);

    let provider = OpenRouteService::from_config(&config.routing)?;
    let cache = RouteCache::new(config.routing.cache_ttl(), config.routing.cache_capacity);
    let resolver =
        RouteResolver::with_cache(provider, Arc::new(Mutex::new(cache)), config.routing.timeout());

    let route = match resolver.resolve(origin, seller.coordinate).await? {
        RouteOutcome::Resolved(route) => route,
        RouteOutcome::Superseded => return Err(Error::Cancelled),
    };

    let trip = Trip {
        origin,
        seller,
        route,
    };
    let output = formatter.format_trip(&trip, &config)?;

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}
