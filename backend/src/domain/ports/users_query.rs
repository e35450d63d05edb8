//! Driving port for user-facing reads.
//!
//! HTTP handlers depend on this trait rather than on persistence adapters, so
//! tests can substitute a mock or an in-memory service.

use async_trait::async_trait;

use crate::domain::pagination::{Page, PageRequest};
use crate::domain::{Error, User, UserId};

/// Domain use-case port for listing and fetching users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Return one page of users in insertion order with collection totals.
    async fn list_users(&self, request: PageRequest) -> Result<Page<User>, Error>;

    /// Return the user with `id`, or a not-found error.
    async fn get_user(&self, id: UserId) -> Result<User, Error>;
}
