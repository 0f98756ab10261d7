//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod nearby;
pub mod serve;
pub mod status;

use clap::{Parser, Subcommand};

/// Rate-limited aircraft proximity proxy
#[derive(Parser)]
#[command(name = "skywatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),

    /// Show server and quota store status
    Status(status::StatusArgs),

    /// List aircraft near a point, nearest first
    Nearby(nearby::NearbyArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
        Commands::Status(args) => status::run(args).await,
        Commands::Nearby(args) => nearby::run(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_nearby() {
        let cli = Cli::try_parse_from([
            "skywatch", "nearby", "--lat", "40.0", "--lon", "-74.0", "--dist", "10",
        ])
        .unwrap();

        match cli.command {
            Commands::Nearby(args) => {
                assert_eq!(args.lat, 40.0);
                assert_eq!(args.lon, -74.0);
                assert_eq!(args.dist, Some(10.0));
            }
            _ => panic!("expected nearby command"),
        }
    }
}
