//! Server shared state
//!
//! Holds configuration and the request pipeline, built once at startup.

use crate::config::Config;
use crate::error::Result;
use crate::proxy::ProxyHandler;
use crate::quota::QuotaGuard;
use crate::upstream::AircraftFeed;
use std::sync::Arc;
use tracing::warn;

/// Shared state for the HTTP server
pub struct AppState {
    /// Configuration
    pub config: Config,

    /// `/planes` pipeline
    pub proxy: Arc<ProxyHandler>,
}

impl AppState {
    /// Create application state from already-built components
    pub fn new(config: Config, proxy: Arc<ProxyHandler>) -> Self {
        Self { config, proxy }
    }

    /// Build the quota guard, feed client and pipeline described by `config`
    pub async fn from_config(config: Config) -> Result<Self> {
        if config.api_keys.rapidapi.is_empty() {
            warn!("No RapidAPI key configured; set it with `skywatch config api_keys.rapidapi <key>`");
        }

        let guard = QuotaGuard::from_config(&config.quota).await?;
        let feed = AircraftFeed::new(&config.upstream, &config.api_keys.rapidapi)?;
        let proxy = ProxyHandler::new(Arc::new(guard), feed)
            .with_default_dist(config.upstream.default_dist);

        Ok(Self::new(config, Arc::new(proxy)))
    }
}
