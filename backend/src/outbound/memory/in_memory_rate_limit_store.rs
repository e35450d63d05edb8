//! In-memory fixed-window counters.
//!
//! Counts are per process, so limits are only exact for a single instance.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::domain::ports::{RateLimitStore, RateLimitStoreError, WindowHit};

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u64,
    expires_at: Instant,
}

/// `RateLimitStore` keeping counters in a mutex-guarded map.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
}

impl InMemoryRateLimitStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for InMemoryRateLimitStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowHit, RateLimitStoreError> {
        let now = Instant::now();
        let mut windows = self
            .windows
            .lock()
            .map_err(|_| RateLimitStoreError::command("rate limit store lock poisoned"))?;

        // Expired windows are dropped lazily so the map does not grow without bound.
        windows.retain(|_, entry| entry.expires_at > now);

        let entry = windows.entry(key.to_owned()).or_insert(Window {
            count: 0,
            expires_at: now + window,
        });
        entry.count = entry.count.saturating_add(1);

        Ok(WindowHit {
            count: entry.count,
            resets_in: entry.expires_at.saturating_duration_since(now),
        })
    }
}
