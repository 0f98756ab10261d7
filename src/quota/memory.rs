//! In-process counting store
//!
//! Counters for one identity live in a single map entry, so the entry lock
//! covers the check and the increments of every window together. Limits only
//! hold per process; use the Redis store when running several instances.

use crate::error::Result;
use crate::quota::{CounterStore, Decision, QuotaLimit};
use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tracing::debug;

/// How often expired identities are dropped from memory
const JANITOR_INTERVAL: Duration = Duration::from_secs(300);

/// Counter for one window of one identity
#[derive(Debug, Clone, Copy)]
struct WindowState {
    count: u64,
    expires_at: Instant,
}

/// Counting store backed by a concurrent hash map
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, HashMap<String, WindowState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current count of one window, zero if it expired or never opened
    pub fn count(&self, identity: &str, window: &str) -> u64 {
        let now = Instant::now();
        self.entries
            .get(identity)
            .and_then(|windows| windows.get(window).copied())
            .filter(|state| state.expires_at > now)
            .map(|state| state.count)
            .unwrap_or(0)
    }

    /// Drop every expired window, and identities left with none
    ///
    /// Returns the number of identities removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, windows| {
            windows.retain(|_, state| state.expires_at > now);
            !windows.is_empty()
        });
        before.saturating_sub(self.entries.len())
    }

    /// Number of identities currently tracked
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CounterStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn check_and_increment(&self, identity: &str, limits: &[QuotaLimit]) -> Result<Decision> {
        if limits.is_empty() {
            return Ok(Decision::Allowed {
                remaining: u64::MAX,
            });
        }

        let now = Instant::now();
        let mut entry = self.entries.entry(identity.to_string()).or_default();
        let windows = entry.value_mut();

        windows.retain(|_, state| state.expires_at > now);

        let mut blocked: Option<(&str, Duration)> = None;
        for limit in limits {
            let (count, resets_in) = match windows.get(&limit.name) {
                Some(state) => (state.count, state.expires_at.saturating_duration_since(now)),
                None => (0, limit.window),
            };
            if count >= limit.max_requests {
                blocked = match blocked {
                    None => Some((limit.name.as_str(), resets_in)),
                    Some((name, wait)) => Some((name, wait.max(resets_in))),
                };
            }
        }

        if let Some((window, retry_after)) = blocked {
            return Ok(Decision::Denied {
                window: window.to_string(),
                retry_after: Some(retry_after),
            });
        }

        let mut remaining = u64::MAX;
        for limit in limits {
            let state = windows
                .entry(limit.name.clone())
                .or_insert_with(|| WindowState {
                    count: 0,
                    expires_at: now + limit.window,
                });
            state.count += 1;
            remaining = remaining.min(limit.max_requests - state.count);
        }

        Ok(Decision::Allowed { remaining })
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

/// Periodically purge expired counters until the store is dropped
pub fn spawn_janitor(store: &Arc<MemoryStore>) {
    let weak: Weak<MemoryStore> = Arc::downgrade(store);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(JANITOR_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            let Some(store) = weak.upgrade() else {
                break;
            };
            let removed = store.purge_expired();
            if removed > 0 {
                debug!(removed, remaining = store.len(), "purged expired quota entries");
            }
        }
    });
}
