//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "quota.store")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Print where the file lives
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Overwrite with defaults
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // Nothing given: dump everything
        (None, None) => {
            show_all_config(&config);
        }

        // Read one key
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Unknown config key: {}", key);
                eprintln!("\nAvailable keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                std::process::exit(1);
            }
        }

        // Write one key, masking secrets in the echo
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            if key.starts_with("api_keys.") {
                println!("{} = ***", key);
            } else {
                println!("{} = {}", key, value);
            }
        }

        // A value needs a key
        (None, Some(_)) => {
            eprintln!("Error: Must specify a key to set a value");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
    println!("static_dir = \"{}\"", config.server.static_dir);
    println!("airlines_file = \"{}\"", config.server.airlines_file);
    println!();

    println!("[upstream]");
    println!("base_url = \"{}\"", config.upstream.base_url);
    println!("host = \"{}\"", config.upstream.host);
    println!("timeout_secs = {}", config.upstream.timeout_secs);
    println!("default_dist = {}", config.upstream.default_dist);
    println!();

    println!("[quota]");
    println!("store = \"{}\"", config.quota.store);
    println!("redis_url = \"{}\"", config.quota.redis_url);
    println!("key_prefix = \"{}\"", config.quota.key_prefix);
    println!("hourly_limit = {}", config.quota.hourly_limit);
    println!("monthly_limit = {}", config.quota.monthly_limit);
    println!("on_store_error = \"{}\"", config.quota.on_store_error);
    println!();

    println!("[api_keys]");
    if config.api_keys.rapidapi.is_empty() {
        println!("rapidapi = \"\" # not configured");
    } else {
        println!("rapidapi = \"***\" # configured");
    }
}
