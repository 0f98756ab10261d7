//! Status command handler
//!
//! Shows whether the server is running and whether the quota store answers.

use crate::config::Config;
use crate::error::Result;
use crate::quota::build_store;
use clap::Args;

/// Status command arguments
#[derive(Args)]
pub struct StatusArgs {
    /// Skip the server check
    #[arg(long)]
    pub no_server: bool,

    /// Skip the quota store check
    #[arg(long)]
    pub no_store: bool,
}

/// Run the status command
pub async fn run(args: StatusArgs) -> Result<()> {
    let config = Config::load()?;

    println!("skywatch v{}", env!("CARGO_PKG_VERSION"));
    println!();

    if !args.no_server {
        check_server_status(&config).await;
    }

    if !args.no_store {
        check_quota_store(&config).await;
    }

    println!("Limits:");
    for limit in config.quota.limits() {
        println!(
            "  {:8} {} requests / {}h",
            limit.name,
            limit.max_requests,
            limit.window.as_secs() / 3600
        );
    }
    println!("  on store error: {}", config.quota.on_store_error);

    Ok(())
}

/// Check if the server is running
async fn check_server_status(config: &Config) {
    let url = format!("http://{}/api/status", config.server_addr());

    match reqwest::get(&url).await {
        Ok(response) => {
            if response.status().is_success() {
                println!("Server: RUNNING on {}", config.server_addr());
                if let Ok(status) = response.json::<serde_json::Value>().await {
                    if let Some(version) = status.get("version").and_then(|v| v.as_str()) {
                        println!("  Version: {}", version);
                    }
                    if let Some(store) = status.get("quota_store").and_then(|v| v.as_str()) {
                        let ok = status
                            .get("quota_store_ok")
                            .and_then(|v| v.as_bool())
                            .unwrap_or(false);
                        println!("  Quota store: {} [{}]", store, if ok { "OK" } else { "DOWN" });
                    }
                }
            } else {
                println!("Server: ERROR (status {})", response.status());
            }
        }
        Err(_) => {
            println!("Server: NOT RUNNING on {}", config.server_addr());
        }
    }
    println!();
}

/// Check the configured quota store directly
async fn check_quota_store(config: &Config) {
    let result = match build_store(&config.quota).await {
        Ok(store) => store.ping().await,
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => println!("Quota store: {} [OK]", config.quota.store),
        Err(e) => println!("Quota store: {} [DOWN] {}", config.quota.store, e),
    }
    println!();
}
