//! Process-local adapters used when no external store is configured and by
//! integration tests.
//!
//! State lives behind a `std::sync::Mutex`; no lock is held across an await.

mod in_memory_rate_limit_store;
mod in_memory_user_repository;

pub use in_memory_rate_limit_store::InMemoryRateLimitStore;
pub use in_memory_user_repository::InMemoryUserRepository;
