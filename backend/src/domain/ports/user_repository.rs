//! Port abstraction for user persistence adapters and their errors.
//!
//! The store owns uniqueness: adapters must reject a write that would
//! duplicate another record's `id` or `email` with
//! [`UserPersistenceError::Duplicate`], regardless of any pre-check the
//! service performed.

use async_trait::async_trait;

use crate::domain::{EmailAddress, StorageId, User, UserId, UserPatch};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// A unique constraint rejected the write.
        Duplicate { field: String } => "user repository already holds a record with this {field}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Return up to `limit` records after skipping `offset`, in insertion order.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, UserPersistenceError>;

    /// Count every stored record.
    async fn count(&self) -> Result<u64, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Report whether any record uses `email`.
    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError>;

    /// Insert a new record and return its generated storage identifier.
    async fn insert(&self, user: &User) -> Result<StorageId, UserPersistenceError>;

    /// Set the fields present in `patch` on the record matching `id`.
    ///
    /// Returns `false` when no record matched.
    async fn update(&self, id: UserId, patch: &UserPatch) -> Result<bool, UserPersistenceError>;

    /// Remove the record matching `id`, returning whether one was removed.
    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;
}
