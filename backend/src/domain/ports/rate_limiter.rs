//! Driving port for request budgeting on rate-limited endpoints.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::rate_limit::ClientKey;

/// Gatekeeper consulted before a rate-limited handler runs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Charge one request to `client`.
    ///
    /// Returns an [`ErrorCode::RateLimited`](crate::domain::ErrorCode) error
    /// when the client has exhausted its budget.
    async fn check(&self, client: &ClientKey) -> Result<(), Error>;
}

/// Limiter that admits every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnlimitedRateLimiter;

#[async_trait]
impl RateLimiter for UnlimitedRateLimiter {
    async fn check(&self, _client: &ClientKey) -> Result<(), Error> {
        Ok(())
    }
}
