//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/skywatch/config.toml

pub mod defaults;

use crate::error::{Error, Result};
use crate::quota::{QuotaLimit, StoreFailureMode, StoreKind};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Aircraft-tracking provider settings
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Per-client rate limits
    #[serde(default)]
    pub quota: QuotaConfig,

    /// API keys for various services
    #[serde(default)]
    pub api_keys: ApiKeysConfig,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory served as the front-end
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// File served at `/airlines.json`
    #[serde(default = "default_airlines_file")]
    pub airlines_file: String,
}

/// Aircraft-tracking provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Provider base URL (without trailing slash)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value of the `x-rapidapi-host` header
    #[serde(default = "default_upstream_host")]
    pub host: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Search radius in nautical miles when the caller omits `dist`
    #[serde(default = "default_dist")]
    pub default_dist: f64,
}

/// Rate limit settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Counting store backend
    #[serde(default)]
    pub store: StoreKind,

    /// Redis URL (used when `store = "redis"`)
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Prefix for counter keys
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Requests per client per hour
    #[serde(default = "default_hourly_limit")]
    pub hourly_limit: u64,

    /// Requests per client per month
    #[serde(default = "default_monthly_limit")]
    pub monthly_limit: u64,

    /// What to do when the counting store cannot be reached
    #[serde(default)]
    pub on_store_error: StoreFailureMode,
}

/// API keys for external services
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiKeysConfig {
    /// RapidAPI key for the aircraft-tracking provider
    #[serde(default)]
    pub rapidapi: String,
}

// Default value functions for serde
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_static_dir() -> String {
    DEFAULT_STATIC_DIR.to_string()
}
fn default_airlines_file() -> String {
    DEFAULT_AIRLINES_FILE.to_string()
}
fn default_base_url() -> String {
    crate::constants::api::ADSB_EXCHANGE_URL.to_string()
}
fn default_upstream_host() -> String {
    crate::constants::api::ADSB_EXCHANGE_HOST.to_string()
}
fn default_timeout() -> u64 {
    DEFAULT_UPSTREAM_TIMEOUT_SECS
}
fn default_dist() -> f64 {
    DEFAULT_DIST_NM
}
fn default_redis_url() -> String {
    DEFAULT_REDIS_URL.to_string()
}
fn default_key_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}
fn default_hourly_limit() -> u64 {
    DEFAULT_HOURLY_LIMIT
}
fn default_monthly_limit() -> u64 {
    DEFAULT_MONTHLY_LIMIT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            airlines_file: default_airlines_file(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            host: default_upstream_host(),
            timeout_secs: default_timeout(),
            default_dist: default_dist(),
        }
    }
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::default(),
            redis_url: default_redis_url(),
            key_prefix: default_key_prefix(),
            hourly_limit: default_hourly_limit(),
            monthly_limit: default_monthly_limit(),
            on_store_error: StoreFailureMode::default(),
        }
    }
}

impl UpstreamConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl QuotaConfig {
    /// The hourly and monthly windows, in that order
    pub fn limits(&self) -> Vec<QuotaLimit> {
        vec![
            QuotaLimit::hourly(self.hourly_limit),
            QuotaLimit::monthly(self.monthly_limit),
        ]
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config file: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every request fail
    pub fn validate(&self) -> Result<()> {
        if self.upstream.timeout_secs == 0 {
            return Err(Error::Config(
                "upstream.timeout_secs must be at least 1".to_string(),
            ));
        }
        if !self.upstream.default_dist.is_finite() || self.upstream.default_dist <= 0.0 {
            return Err(Error::Config(format!(
                "upstream.default_dist must be positive: {}",
                self.upstream.default_dist
            )));
        }
        Ok(())
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&path, content)
            .map_err(|e| Error::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),
            ["server", "static_dir"] => Some(self.server.static_dir.clone()),
            ["server", "airlines_file"] => Some(self.server.airlines_file.clone()),

            ["upstream", "base_url"] => Some(self.upstream.base_url.clone()),
            ["upstream", "host"] => Some(self.upstream.host.clone()),
            ["upstream", "timeout_secs"] => Some(self.upstream.timeout_secs.to_string()),
            ["upstream", "default_dist"] => Some(self.upstream.default_dist.to_string()),

            ["quota", "store"] => Some(self.quota.store.to_string()),
            ["quota", "redis_url"] => Some(self.quota.redis_url.clone()),
            ["quota", "key_prefix"] => Some(self.quota.key_prefix.clone()),
            ["quota", "hourly_limit"] => Some(self.quota.hourly_limit.to_string()),
            ["quota", "monthly_limit"] => Some(self.quota.monthly_limit.to_string()),
            ["quota", "on_store_error"] => Some(self.quota.on_store_error.to_string()),

            ["api_keys", "rapidapi"] => Some(self.api_keys.rapidapi.clone()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid port value: {}", value)))?;
            }
            ["server", "static_dir"] => {
                self.server.static_dir = value.to_string();
            }
            ["server", "airlines_file"] => {
                self.server.airlines_file = value.to_string();
            }

            ["upstream", "base_url"] => {
                self.upstream.base_url = value.trim_end_matches('/').to_string();
            }
            ["upstream", "host"] => {
                self.upstream.host = value.to_string();
            }
            ["upstream", "timeout_secs"] => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid timeout value: {}", value)))?;
                if secs == 0 {
                    return Err(Error::Config("Timeout must be at least 1 second".to_string()));
                }
                self.upstream.timeout_secs = secs;
            }
            ["upstream", "default_dist"] => {
                let dist: f64 = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid distance value: {}", value)))?;
                if !dist.is_finite() || dist <= 0.0 {
                    return Err(Error::Config(format!("Distance must be positive: {}", value)));
                }
                self.upstream.default_dist = dist;
            }

            ["quota", "store"] => {
                self.quota.store = value.parse().map_err(Error::Config)?;
            }
            ["quota", "redis_url"] => {
                self.quota.redis_url = value.to_string();
            }
            ["quota", "key_prefix"] => {
                self.quota.key_prefix = value.to_string();
            }
            ["quota", "hourly_limit"] => {
                self.quota.hourly_limit = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid limit value: {}", value)))?;
            }
            ["quota", "monthly_limit"] => {
                self.quota.monthly_limit = value
                    .parse()
                    .map_err(|_| Error::Config(format!("Invalid limit value: {}", value)))?;
            }
            ["quota", "on_store_error"] => {
                self.quota.on_store_error = value.parse().map_err(Error::Config)?;
            }

            ["api_keys", "rapidapi"] => {
                self.api_keys.rapidapi = value.to_string();
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "server.host",
            "server.port",
            "server.static_dir",
            "server.airlines_file",
            "upstream.base_url",
            "upstream.host",
            "upstream.timeout_secs",
            "upstream.default_dist",
            "quota.store",
            "quota.redis_url",
            "quota.key_prefix",
            "quota.hourly_limit",
            "quota.monthly_limit",
            "quota.on_store_error",
            "api_keys.rapidapi",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
