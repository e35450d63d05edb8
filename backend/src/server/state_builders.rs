//! Builders selecting store adapters for the HTTP state.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use backend::domain::ports::{RateLimitStore, UserRepository};
use backend::domain::{FixedWindowRateLimiter, UserDirectoryService};
use backend::inbound::http::state::HttpState;
use backend::outbound::memory::{InMemoryRateLimitStore, InMemoryUserRepository};
use backend::outbound::persistence::DieselUserRepository;

use super::ServerConfig;

/// Counter namespace for the `GET /users` budget.
pub(super) const LIST_USERS_SCOPE: &str = "users:list";

/// Use `make` when `resource` is configured, otherwise the in-memory fallback.
fn select_adapter<T, P: ?Sized>(
    resource: Option<&T>,
    make: impl FnOnce(&T) -> Arc<P>,
    fallback: impl FnOnce() -> Arc<P>,
    store: &'static str,
) -> Arc<P> {
    match resource {
        Some(resource) => make(resource),
        None => {
            warn!(store, "no backing store configured; using in-memory adapter");
            fallback()
        }
    }
}

fn build_user_repository(config: &ServerConfig) -> Arc<dyn UserRepository> {
    select_adapter(
        config.db_pool.as_ref(),
        |pool| Arc::new(DieselUserRepository::new(pool.clone())) as Arc<dyn UserRepository>,
        || Arc::new(InMemoryUserRepository::new()) as Arc<dyn UserRepository>,
        "users",
    )
}

fn build_rate_limit_store(config: &ServerConfig) -> Arc<dyn RateLimitStore> {
    select_adapter(
        config.rate_limit_store.as_ref(),
        |store| Arc::new(store.clone()) as Arc<dyn RateLimitStore>,
        || Arc::new(InMemoryRateLimitStore::new()) as Arc<dyn RateLimitStore>,
        "rate_limit",
    )
}

/// Build the shared HTTP state from the configured stores.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let users = Arc::new(UserDirectoryService::new(build_user_repository(config)));
    let limiter = FixedWindowRateLimiter::new(
        build_rate_limit_store(config),
        config.list_rate_limit.clone(),
        LIST_USERS_SCOPE,
    );

    web::Data::new(HttpState::new(users.clone(), users, Arc::new(limiter)))
}
