//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use backend::domain::RateLimitRule;
use backend::outbound::cache::RedisRateLimitStore;
use backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
///
/// Stores that are not attached fall back to in-process adapters.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) list_rate_limit: RateLimitRule,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) rate_limit_store: Option<RedisRateLimitStore>,
}

impl ServerConfig {
    /// Construct a server configuration with in-memory stores.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, list_rate_limit: RateLimitRule) -> Self {
        Self {
            bind_addr,
            list_rate_limit,
            db_pool: None,
            rate_limit_store: None,
        }
    }

    /// Attach a database connection pool for the user repository.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach a Redis-backed counter store for rate limiting.
    #[must_use]
    pub fn with_rate_limit_store(mut self, store: RedisRateLimitStore) -> Self {
        self.rate_limit_store = Some(store);
        self
    }
}
