//! Per-client admission control
//!
//! A [`QuotaGuard`] enforces several fixed-window limits at once (by default
//! 500 requests per hour and 10,000 per month) for each client identity.
//! Counters live in a [`CounterStore`], either in process memory or in Redis
//! so that one logical limit holds across every server instance.
//!
//! Windows are fixed: the first counted request opens a window that expires
//! after the window duration, and the count starts over on the next request.
//! This is an approximation of a sliding window that costs O(1) per check.
//!
//! ## Flex Point
//! Adding a new counting store requires:
//! 1. Create `src/quota/{store_name}.rs` implementing `CounterStore`
//! 2. Add `pub mod {store_name};` below and a `StoreKind` variant
//! 3. Construct it in [`build_store`]

pub mod memory;
pub mod redis_store;

use crate::config::QuotaConfig;
use crate::constants::quota::{HOURLY_WINDOW_SECS, MONTHLY_WINDOW_SECS, UNKNOWN_IDENTITY};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// One fixed-window limit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaLimit {
    /// Window identifier, part of the counter key
    pub name: String,
    /// Requests allowed within one window
    pub max_requests: u64,
    /// Window length
    pub window: Duration,
}

impl QuotaLimit {
    pub fn new(name: impl Into<String>, max_requests: u64, window: Duration) -> Self {
        Self {
            name: name.into(),
            max_requests,
            window,
        }
    }

    /// `max_requests` per hour
    pub fn hourly(max_requests: u64) -> Self {
        Self::new("hourly", max_requests, Duration::from_secs(HOURLY_WINDOW_SECS))
    }

    /// `max_requests` per month (730 hours)
    pub fn monthly(max_requests: u64) -> Self {
        Self::new("monthly", max_requests, Duration::from_secs(MONTHLY_WINDOW_SECS))
    }
}

/// Outcome of an admission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The request was counted against every window
    Allowed {
        /// Smallest allowance left across all windows
        remaining: u64,
    },
    /// The request was refused and nothing was counted
    Denied {
        /// Name of the window that refused the request
        window: String,
        /// How long until the blocking window resets, if known
        retry_after: Option<Duration>,
    },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

/// Client identity used as the counter key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identity shared by all requests whose peer address is unknown
    pub fn unknown() -> Self {
        Self(UNKNOWN_IDENTITY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<IpAddr> for ClientIdentity {
    fn from(ip: IpAddr) -> Self {
        Self(ip.to_string())
    }
}

impl std::fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the guard does when its counting store cannot be reached
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreFailureMode {
    /// Fail closed: refuse the request
    #[default]
    Deny,
    /// Fail open: serve the request uncounted
    Allow,
}

impl std::fmt::Display for StoreFailureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deny => write!(f, "deny"),
            Self::Allow => write!(f, "allow"),
        }
    }
}

impl std::str::FromStr for StoreFailureMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deny" | "closed" => Ok(Self::Deny),
            "allow" | "open" => Ok(Self::Allow),
            _ => Err(format!("Unknown store failure mode: {}", s)),
        }
    }
}

/// Counting store backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Per-process counters, for a single instance
    Memory,
    /// Counters shared through Redis
    #[default]
    Redis,
}

impl std::fmt::Display for StoreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Redis => write!(f, "redis"),
        }
    }
}

impl std::str::FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            _ => Err(format!("Unknown quota store: {}", s)),
        }
    }
}

/// Storage for window counters
///
/// Implementations must check every window and, only if all of them have
/// room, increment every window as one atomic step. Two concurrent callers
/// competing for the last slot must never both be allowed.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Returns the store name (e.g., "memory", "redis")
    fn name(&self) -> &'static str;

    /// Check all windows for `identity` and count the request if it fits
    async fn check_and_increment(&self, identity: &str, limits: &[QuotaLimit]) -> Result<Decision>;

    /// Verify the store is reachable
    async fn ping(&self) -> Result<()>;
}

/// Admission control in front of the proxy endpoint
pub struct QuotaGuard {
    store: Arc<dyn CounterStore>,
    limits: Vec<QuotaLimit>,
    on_store_error: StoreFailureMode,
}

impl QuotaGuard {
    pub fn new(
        store: Arc<dyn CounterStore>,
        limits: Vec<QuotaLimit>,
        on_store_error: StoreFailureMode,
    ) -> Self {
        Self {
            store,
            limits,
            on_store_error,
        }
    }

    /// A guard with no windows; every request is allowed
    pub fn disabled() -> Self {
        Self::new(
            Arc::new(memory::MemoryStore::new()),
            Vec::new(),
            StoreFailureMode::Allow,
        )
    }

    /// Build a guard from the `[quota]` config section
    pub async fn from_config(config: &QuotaConfig) -> Result<Self> {
        let store = build_store(config).await?;
        Ok(Self::new(store, config.limits(), config.on_store_error))
    }

    /// Admit or refuse one request from `identity`
    ///
    /// Admission and counting happen in the same store operation.
    pub async fn check_and_increment(&self, identity: &ClientIdentity) -> Decision {
        match self
            .store
            .check_and_increment(identity.as_str(), &self.limits)
            .await
        {
            Ok(decision) => {
                if let Decision::Denied { window, .. } = &decision {
                    debug!(client = %identity, window = %window, "quota exhausted");
                }
                decision
            }
            Err(e) => {
                warn!(
                    store = self.store.name(),
                    error = %e,
                    mode = %self.on_store_error,
                    "quota store unavailable"
                );
                match self.on_store_error {
                    StoreFailureMode::Allow => Decision::Allowed { remaining: 0 },
                    StoreFailureMode::Deny => Decision::Denied {
                        window: "store".to_string(),
                        retry_after: None,
                    },
                }
            }
        }
    }

    pub fn limits(&self) -> &[QuotaLimit] {
        &self.limits
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Check that the backing store is reachable
    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}

/// Create the counting store selected in config
pub async fn build_store(config: &QuotaConfig) -> Result<Arc<dyn CounterStore>> {
    match config.store {
        StoreKind::Memory => {
            warn!("Using the in-memory quota store; limits are not shared between instances");
            let store = Arc::new(memory::MemoryStore::new());
            memory::spawn_janitor(&store);
            Ok(store)
        }
        StoreKind::Redis => {
            let store = redis_store::RedisStore::connect(&config.redis_url, &config.key_prefix).await?;
            Ok(Arc::new(store))
        }
    }
}
