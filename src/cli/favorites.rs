//! Favorites command handler
//!
//! View and toggle favorite sellers.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::favorites::Favorites;
use crate::sellers::Catalog;
use clap::{Args, Subcommand};

/// Favorites command arguments
#[derive(Args)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    pub command: Option<FavoritesCommand>,
}

/// Favorites subcommands
#[derive(Subcommand)]
pub enum FavoritesCommand {
    /// List favorite sellers
    List,
    /// Add or remove a seller
    Toggle {
        /// Seller id
        id: String,
    },
}

/// Run the favorites command
pub async fn run(args: FavoritesArgs) -> Result<()> {
    let config = Config::load()?;
    let catalog = Catalog::load(&config.catalog.path)?;

    match args.command.unwrap_or(FavoritesCommand::List) {
        FavoritesCommand::List => list_favorites(&catalog),
        FavoritesCommand::Toggle { id } => toggle_favorite(&catalog, &id),
    }
}

/// List favorite sellers
fn list_favorites(catalog: &Catalog) -> Result<()> {
    let favorites = Favorites::load()?;

    if favorites.is_empty() {
        println!("No favorite sellers.");
        return Ok(());
    }

    println!("Favorite sellers ({}):\n", favorites.len());
    for id in favorites.all() {
        match catalog.get(id) {
            Some(seller) => println!(
                "  {:>3}  {} ({}, {})  {}",
                seller.id, seller.display_name, seller.brand, seller.size_class, seller.phone
            ),
            None => println!("  {:>3}  (no longer in catalog)", id),
        }
    }

    Ok(())
}

/// Toggle one seller
fn toggle_favorite(catalog: &Catalog, id: &str) -> Result<()> {
    let seller = catalog
        .get(id)
        .ok_or_else(|| Error::Config(format!("Unknown seller: {}", id)))?;

    let mut favorites = Favorites::load()?;
    let added = favorites.toggle_and_save(id)?;

    if added {
        println!("Added {} to favorites", seller.display_name);
    } else {
        println!("Removed {} from favorites", seller.display_name);
    }

    Ok(())
}
