//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{RateLimiter, UsersCommand, UsersQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users_query: Arc<dyn UsersQuery>,
    pub users_command: Arc<dyn UsersCommand>,
    /// Budget enforced on `GET /users`.
    pub list_rate_limiter: Arc<dyn RateLimiter>,
}

impl HttpState {
    /// Construct state from port implementations.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use backend::domain::UserDirectoryService;
    /// use backend::domain::ports::UnlimitedRateLimiter;
    /// use backend::inbound::http::state::HttpState;
    /// use backend::outbound::memory::InMemoryUserRepository;
    ///
    /// let service = Arc::new(UserDirectoryService::new(Arc::new(
    ///     InMemoryUserRepository::default(),
    /// )));
    /// let state = HttpState::new(service.clone(), service, Arc::new(UnlimitedRateLimiter));
    /// let _query = state.users_query.clone();
    /// ```
    pub fn new(
        users_query: Arc<dyn UsersQuery>,
        users_command: Arc<dyn UsersCommand>,
        list_rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            users_query,
            users_command,
            list_rate_limiter,
        }
    }
}
