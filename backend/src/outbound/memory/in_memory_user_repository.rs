//! In-memory `UserRepository` keeping records in insertion order.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, StorageId, User, UserId, UserPatch};

/// `UserRepository` over a `Vec` guarded by a mutex.
///
/// Enforces the same `id` and `email` uniqueness the SQL schema does. Storage
/// identifiers are generated on insert but not retained.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    records: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> Result<MutexGuard<'_, Vec<User>>, UserPersistenceError> {
        self.records
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))
    }
}

/// Reject `candidate` if a record other than `skip` already uses its id or email.
fn check_unique(
    records: &[User],
    candidate: &User,
    skip: Option<usize>,
) -> Result<(), UserPersistenceError> {
    let others = records
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != skip)
        .map(|(_, user)| user);
    for other in others {
        if other.id == candidate.id {
            return Err(UserPersistenceError::duplicate("id"));
        }
        if other.email == candidate.email {
            return Err(UserPersistenceError::duplicate("email"));
        }
    }
    Ok(())
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, UserPersistenceError> {
        let skip = usize::try_from(offset)
            .map_err(|_| UserPersistenceError::query(format!("invalid offset {offset}")))?;
        let take = usize::try_from(limit)
            .map_err(|_| UserPersistenceError::query(format!("invalid limit {limit}")))?;
        Ok(self
            .records()?
            .iter()
            .skip(skip)
            .take(take)
            .cloned()
            .collect())
    }

    async fn count(&self) -> Result<u64, UserPersistenceError> {
        let len = self.records()?.len();
        u64::try_from(len).map_err(|_| UserPersistenceError::query("user count overflow"))
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .records()?
            .iter()
            .find(|user| user.id == id)
            .cloned())
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError> {
        Ok(self
            .records()?
            .iter()
            .any(|user| user.email == *email))
    }

    async fn insert(&self, user: &User) -> Result<StorageId, UserPersistenceError> {
        let mut records = self.records()?;
        check_unique(&records, user, None)?;
        records.push(user.clone());
        Ok(StorageId::random())
    }

    async fn update(&self, id: UserId, patch: &UserPatch) -> Result<bool, UserPersistenceError> {
        let mut records = self.records()?;
        let Some(index) = records.iter().position(|user| user.id == id) else {
            return Ok(false);
        };
        let merged = patch.apply_to(&records[index]);
        check_unique(&records, &merged, Some(index))?;
        records[index] = merged;
        Ok(true)
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut records = self.records()?;
        let before = records.len();
        records.retain(|user| user.id != id);
        Ok(records.len() < before)
    }
}
