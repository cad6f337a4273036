//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod favorites;
pub mod location;
pub mod nearby;
pub mod route;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Find the nearest cooking gas sellers and route to them
#[derive(Parser)]
#[command(name = "gaz-finder")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List sellers ordered by distance
    Nearby(nearby::NearbyArgs),

    /// Driving route to a seller
    Route(route::RouteArgs),

    /// View and toggle favorite sellers
    Favorites(favorites::FavoritesArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),
}

/// Initialize logging to stderr; `RUST_LOG` overrides the default level
fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    init_logging(match cli.command {
        Commands::Serve(_) => "info",
        _ => "warn",
    });

    match cli.command {
        Commands::Nearby(args) => nearby::run(args).await,
        Commands::Route(args) => route::run(args).await,
        Commands::Favorites(args) => favorites::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Serve(args) => serve::run(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_nearby() {
        let cli = Cli::try_parse_from([
            "gaz-finder", "nearby", "--lat", "3.85", "--lng", "11.5", "--size", "6kg", "-b", "total",
        ])
        .unwrap();

        let Commands::Nearby(args) = cli.command else {
            panic!("expected nearby");
        };
        assert_eq!(args.location.lat, Some(3.85));
        assert_eq!(args.size, Some(crate::sellers::SizeClass::Small));
        assert_eq!(args.brand.as_deref(), Some("total"));
    }

    #[test]
    fn test_lat_requires_lng() {
        assert!(Cli::try_parse_from(["gaz-finder", "nearby", "--lat", "3.85"]).is_err());
    }

    #[test]
    fn test_here_conflicts_with_coordinates() {
        let result = Cli::try_parse_from([
            "gaz-finder", "route", "2", "--here", "--lat", "3.85", "--lng", "11.5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_favorites_toggle() {
        let cli = Cli::try_parse_from(["gaz-finder", "favorites", "toggle", "3"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Favorites(favorites::FavoritesArgs {
                command: Some(favorites::FavoritesCommand::Toggle { .. })
            })
        ));
    }
}
