//! Serve command handler
//!
//! Runs the HTTP API in the foreground.

use crate::config::Config;
use crate::error::Result;
use crate::server;
use clap::Args;
use tracing::info;

#[derive(Args)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Seller catalog JSON file (overrides catalog.path)
    #[arg(long)]
    pub catalog: Option<String>,
}

impl ServeArgs {
    /// Apply command-line overrides on top of the loaded config
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(catalog) = self.catalog {
            config.catalog.path = catalog;
        }
    }
}

pub async fn run(args: ServeArgs) -> Result<()> {
    let mut config = Config::load()?;
    args.apply(&mut config);

    info!(
        "gaz-finder v{} listening on http://{}",
        env!("CARGO_PKG_VERSION"),
        config.server_addr()
    );
    server::run(config).await
}
