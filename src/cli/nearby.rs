//! Nearby command handler
//!
//! Runs the `/planes` pipeline once from the command line, without a server
//! and without quota.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{available_formats, get_formatter};
use crate::proxy::{PlanesQuery, ProxyHandler};
use crate::quota::{ClientIdentity, QuotaGuard};
use crate::upstream::AircraftFeed;
use clap::Args;
use std::sync::Arc;

/// Nearby command arguments
#[derive(Args)]
pub struct NearbyArgs {
    /// Latitude
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,

    /// Search radius in nautical miles
    #[arg(long, short = 'd')]
    pub dist: Option<f64>,

    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: String,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,
}

/// Run the nearby command
pub async fn run(args: NearbyArgs) -> Result<()> {
    let formatter = get_formatter(&args.format).ok_or_else(|| {
        let names: Vec<String> = available_formats().into_iter().map(|f| f.name).collect();
        Error::Config(format!(
            "Unknown format: {} (available: {})",
            args.format,
            names.join(", ")
        ))
    })?;

    let config = Config::load()?;
    if config.api_keys.rapidapi.is_empty() {
        eprintln!("Warning: no RapidAPI key configured (api_keys.rapidapi)");
    }

    let feed = AircraftFeed::new(&config.upstream, &config.api_keys.rapidapi)?;
    let proxy = ProxyHandler::new(Arc::new(QuotaGuard::disabled()), feed);

    let valid = PlanesQuery::new(args.lat, args.lon, args.dist).validate(config.upstream.default_dist)?;
    let response = proxy
        .planes_validated(&ClientIdentity::unknown(), valid)
        .await?;

    let output = formatter.format(valid.center, &response.ac)?;

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}
