//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`UserRepository`, `RateLimitStore`) are implemented by
//! outbound adapters; driving ports (`UsersQuery`, `UsersCommand`,
//! `RateLimiter`) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod rate_limit_store;
mod rate_limiter;
mod user_repository;
mod users_command;
mod users_query;

#[cfg(test)]
pub use rate_limit_store::MockRateLimitStore;
pub use rate_limit_store::{RateLimitStore, RateLimitStoreError, WindowHit};
#[cfg(test)]
pub use rate_limiter::MockRateLimiter;
pub use rate_limiter::{RateLimiter, UnlimitedRateLimiter};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use users_command::MockUsersCommand;
pub use users_command::{DeleteOutcome, UpdateOutcome, UsersCommand};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;
