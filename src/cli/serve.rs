//! Serve command handler
//!
//! Starts the HTTP server in foreground mode.

use crate::config::Config;
use crate::error::Result;
use crate::quota::StoreKind;
use crate::server;
use clap::Args;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Serve command arguments
#[derive(Args)]
pub struct ServeArgs {
    /// Host address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Quota store: memory or redis
    #[arg(long)]
    pub store: Option<StoreKind>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    // Logging, RUST_LOG overrides the info default
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Command-line flags win over the config file
    let mut config = Config::load()?;

    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(store) = args.store {
        config.quota.store = store;
    }

    info!(
        "Starting skywatch server v{} on {}",
        env!("CARGO_PKG_VERSION"),
        config.server_addr()
    );

    // Blocks until the listener fails
    server::run(config).await
}
