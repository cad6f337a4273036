//! Nearby command handler
//!
//! Lists sellers ordered by distance from the user.

use crate::cli::location::{self, LocationArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::favorites::Favorites;
use crate::format::{available_formats, get_formatter};
use crate::ranking::{rank, NearbyReport};
use crate::sellers::{Catalog, FilterCriteria, SizeClass};
use clap::Args;

/// Nearby command arguments
#[derive(Args)]
pub struct NearbyArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Brand filter (case-insensitive substring)
    #[arg(long, short = 'b')]
    pub brand: Option<String>,

    /// Bottle size: small (6kg) or large (12kg, 50kg)
    #[arg(long, short = 's')]
    pub size: Option<SizeClass>,

    /// Maximum number of sellers listed
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Only list favorite sellers
    #[arg(long)]
    pub favorites_only: bool,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available brands
    #[arg(short = 'B', long = "list-brands")]
    pub list_brands: bool,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Run the nearby command
pub async fn run(args: NearbyArgs) -> Result<()> {
    if args.list_formats {
        list_formats();
        return Ok(());
    }

    let config = Config::load()?;
    let catalog = Catalog::load(&config.catalog.path)?;

    if args.list_brands {
        for brand in catalog.known_brands() {
            println!("{}", brand);
        }
        return Ok(());
    }

    let format = args.format.unwrap_or(config.defaults.format.clone());
    let formatter = get_formatter(&format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;

    let state = location::resolve(&args.location, &config).await?;
    let criteria = FilterCriteria::new(args.brand.unwrap_or_default(), args.size);

    let mut sellers = rank(state.coordinate, catalog.sellers(), &criteria);
    if args.favorites_only {
        let favorites = Favorites::load()?;
        sellers.retain(|ranked| favorites.has(&ranked.seller.id));
    }
    sellers.truncate(args.limit.unwrap_or(config.defaults.limit));

    let report = NearbyReport {
        location: state,
        criteria,
        sellers,
    };
    let output = formatter.format_nearby(&report, &config)?;

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:6} - {}", format.name, format.description);
    }
}
