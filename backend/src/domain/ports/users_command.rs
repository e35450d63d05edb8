//! Driving port for user mutations.

use async_trait::async_trait;

use crate::domain::{Error, StorageId, User, UserId, UserPatch};

/// Result of applying a merge-patch to an existing user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// At least one stored value changed.
    Updated,
    /// The record exists but every provided value already matched.
    Unchanged,
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// One record was removed.
    Deleted,
    /// No record matched the identifier.
    NotFound,
}

/// Domain use-case port for creating, patching, and removing users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersCommand: Send + Sync {
    /// Store a validated user, rejecting duplicate `id` or `email` values.
    async fn create_user(&self, user: User) -> Result<StorageId, Error>;

    /// Merge `patch` into the user with `id`.
    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<UpdateOutcome, Error>;

    /// Remove the user with `id`.
    async fn delete_user(&self, id: UserId) -> Result<DeleteOutcome, Error>;
}
