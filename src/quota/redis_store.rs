//! Redis-backed counting store
//!
//! Counters are shared by every instance pointed at the same Redis. One Lua
//! script reads all window counters for an identity and increments them only
//! if every window has room, so the check and the count are a single atomic
//! step on the server. A counter's TTL is set when it is created and Redis
//! drops it when the window ends.

use crate::error::{Error, Result};
use crate::quota::{CounterStore, Decision, QuotaLimit};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, Script};
use std::time::Duration;
use tracing::{debug, info};

/// KEYS: one counter per window. ARGV: (max, window_ms) per window.
///
/// Returns `{1, remaining, 0}` when counted, or
/// `{0, blocking_window_index, retry_after_ms}` when refused.
const CHECK_AND_INCREMENT: &str = r#"
local blocked = 0
local retry = -1
for i, key in ipairs(KEYS) do
  local max = tonumber(ARGV[i * 2 - 1])
  local current = tonumber(redis.call('GET', key) or '0')
  if current >= max then
    if blocked == 0 then blocked = i end
    local ttl = redis.call('PTTL', key)
    if ttl > retry then retry = ttl end
  end
end
if blocked > 0 then
  return {0, blocked, retry}
end
local remaining = -1
for i, key in ipairs(KEYS) do
  local max = tonumber(ARGV[i * 2 - 1])
  local count = redis.call('INCR', key)
  if count == 1 then
    redis.call('PEXPIRE', key, ARGV[i * 2])
  end
  local left = max - count
  if remaining < 0 or left < remaining then remaining = left end
end
return {1, remaining, 0}
"#;

/// Counting store shared through Redis
pub struct RedisStore {
    conn: ConnectionManager,
    key_prefix: String,
    script: Script,
}

impl RedisStore {
    /// Connect to Redis at `url`
    pub async fn connect(url: &str, key_prefix: &str) -> Result<Self> {
        info!("Connecting to quota store at {}", sanitize_url(url));

        let client = Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn,
            key_prefix: key_prefix.to_string(),
            script: Script::new(CHECK_AND_INCREMENT),
        })
    }

    /// Counter key for one window of one identity
    ///
    /// The identity is wrapped in a hash tag so all of a client's windows
    /// land in the same cluster slot.
    fn key(&self, identity: &str, window: &str) -> String {
        counter_key(&self.key_prefix, identity, window)
    }
}

fn counter_key(prefix: &str, identity: &str, window: &str) -> String {
    format!("{}:{{{}}}:{}", prefix, identity, window)
}

/// Hide any password in a Redis URL before logging it
fn sanitize_url(url: &str) -> String {
    match url.split_once('@') {
        Some((creds, host)) => match creds.rsplit_once(':') {
            Some((scheme_user, _)) if scheme_user.contains("://") => {
                format!("{}:***@{}", scheme_user, host)
            }
            _ => format!("***@{}", host),
        },
        None => url.to_string(),
    }
}

/// Interpret the script reply
fn decode_reply(reply: &[i64], limits: &[QuotaLimit]) -> Result<Decision> {
    match reply {
        [1, remaining, _] => Ok(Decision::Allowed {
            remaining: (*remaining).max(0) as u64,
        }),
        [0, index, retry_ms] => {
            let window = usize::try_from(*index)
                .ok()
                .and_then(|i| i.checked_sub(1))
                .and_then(|i| limits.get(i))
                .map(|limit| limit.name.clone())
                .ok_or_else(|| Error::QuotaStore(format!("Bad window index in reply: {}", index)))?;
            let retry_after = u64::try_from(*retry_ms).ok().map(Duration::from_millis);
            Ok(Decision::Denied {
                window,
                retry_after,
            })
        }
        other => Err(Error::QuotaStore(format!("Unexpected script reply: {:?}", other))),
    }
}

#[async_trait]
impl CounterStore for RedisStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn check_and_increment(&self, identity: &str, limits: &[QuotaLimit]) -> Result<Decision> {
        if limits.is_empty() {
            return Ok(Decision::Allowed {
                remaining: u64::MAX,
            });
        }

        let mut invocation = self.script.prepare_invoke();
        for limit in limits {
            invocation.key(self.key(identity, &limit.name));
        }
        for limit in limits {
            invocation
                .arg(limit.max_requests)
                .arg(limit.window.as_millis() as u64);
        }

        let mut conn = self.conn.clone();
        let reply: Vec<i64> = invocation.invoke_async(&mut conn).await?;
        debug!(client = identity, ?reply, "quota script reply");

        decode_reply(&reply, limits)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}
