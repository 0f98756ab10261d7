//! Default configuration values
//!
//! Named constants for all tunable parameters

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 5000;

/// Directory holding the static front-end
pub const DEFAULT_STATIC_DIR: &str = "frontend";

/// Airline lookup table served at `/airlines.json`
pub const DEFAULT_AIRLINES_FILE: &str = "airlines.json";

/// Upstream request timeout in seconds
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Search radius in nautical miles when `dist` is omitted
pub const DEFAULT_DIST_NM: f64 = 5.0;

/// Default Redis URL for the quota store
pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";

/// Prefix for quota keys in the counting store
pub const DEFAULT_KEY_PREFIX: &str = "skywatch:quota";

/// Requests allowed per client per hour
pub const DEFAULT_HOURLY_LIMIT: u64 = 500;

/// Requests allowed per client per month
pub const DEFAULT_MONTHLY_LIMIT: u64 = 10_000;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "skywatch";
