//! gaz-finder CLI entry point
//!
//! Nearest cooking gas seller finder - CLI + web API

use gaz_finder::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
