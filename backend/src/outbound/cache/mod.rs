//! Redis-backed counter store for the rate limiter.

mod redis_rate_limit_store;

pub use redis_rate_limit_store::RedisRateLimitStore;
