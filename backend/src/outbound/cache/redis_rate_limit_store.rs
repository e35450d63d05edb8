//! `RateLimitStore` adapter over a `bb8-redis` pool.
//!
//! Each hit runs one `MULTI`/`EXEC` pipeline:
//!
//! ```text
//! SET <key> 0 EX <window> NX   -- open the window if absent
//! INCR <key>                   -- count this hit
//! TTL <key>                    -- seconds until the window closes
//! ```
//!
//! so the counter and its expiry are created together and every instance
//! sharing the Redis server sees the same count.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::{self, RedisError};
use tracing::debug;

use crate::domain::ports::{RateLimitStore, RateLimitStoreError, WindowHit};

/// Redis implementation of the `RateLimitStore` port.
#[derive(Clone)]
pub struct RedisRateLimitStore {
    pool: Pool<RedisConnectionManager>,
}

impl RedisRateLimitStore {
    /// Wrap an existing pool.
    pub fn new(pool: Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }

    /// Build a pool of at most `max_size` connections to `redis_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitStoreError::Connection`] when the URL is invalid or
    /// the initial connection fails.
    pub async fn connect(redis_url: &str, max_size: u32) -> Result<Self, RateLimitStoreError> {
        let manager = RedisConnectionManager::new(redis_url).map_err(map_redis_error)?;
        let pool = Pool::builder()
            .max_size(max_size.max(1))
            .build(manager)
            .await
            .map_err(map_redis_error)?;
        Ok(Self::new(pool))
    }
}

fn map_redis_error(error: RedisError) -> RateLimitStoreError {
    debug!(%error, kind = ?error.kind(), "redis operation failed");
    if error.is_io_error() || error.is_connection_dropped() || error.is_connection_refusal() {
        RateLimitStoreError::connection(error.to_string())
    } else {
        RateLimitStoreError::command(error.to_string())
    }
}

/// Whole seconds for `EX`; sub-second windows round up to one second.
fn expiry_secs(window: Duration) -> u64 {
    let secs = window.as_secs();
    if window.subsec_nanos() > 0 || secs == 0 {
        secs.saturating_add(1)
    } else {
        secs
    }
}

/// Convert a `TTL` reply; negative replies mean the key has no expiry.
fn remaining(ttl: i64, window: Duration) -> Duration {
    u64::try_from(ttl)
        .map(Duration::from_secs)
        .unwrap_or(window)
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowHit, RateLimitStoreError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| RateLimitStoreError::connection(err.to_string()))?;

        let (count, ttl): (u64, i64) = redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(key)
            .arg(0)
            .arg("EX")
            .arg(expiry_secs(window))
            .arg("NX")
            .ignore()
            .cmd("INCR")
            .arg(key)
            .cmd("TTL")
            .arg(key)
            .query_async(&mut *conn)
            .await
            .map_err(map_redis_error)?;

        Ok(WindowHit {
            count,
            resets_in: remaining(ttl, window),
        })
    }
}
