//! Port abstraction for shared fixed-window counters.
//!
//! A hit must be atomic per key: create the counter with the window expiry if
//! absent, increment it, and report the new count with the time left before
//! the window closes.

use std::time::Duration;

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised by counter store adapters.
    pub enum RateLimitStoreError {
        /// The counter store could not be reached.
        Connection { message: String } => "rate limit store connection failed: {message}",
        /// The store rejected or failed the counter command.
        Command { message: String } => "rate limit store command failed: {message}",
    }
}

/// Counter state observed right after a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHit {
    /// Hits recorded in the current window, including this one.
    pub count: u64,
    /// Time until the counter expires.
    pub resets_in: Duration,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Record one hit against `key` in a window of length `window`.
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowHit, RateLimitStoreError>;
}
