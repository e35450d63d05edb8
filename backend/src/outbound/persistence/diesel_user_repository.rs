//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Uniqueness of `user_id` and `email` is enforced by the `users_user_id_key`
//! and `users_email_key` constraints; violations surface as
//! [`UserPersistenceError::Duplicate`] naming the offending field.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, StorageId, User, UserId, UserPatch};

use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const EMAIL_CONSTRAINT: &str = "users_email_key";
const USER_ID_CONSTRAINT: &str = "users_user_id_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.message())
}

/// Field reported for a unique violation on `constraint`.
fn duplicate_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some(EMAIL_CONSTRAINT) => "email",
        Some(USER_ID_CONSTRAINT) => "id",
        _ => "id or email",
    }
}

/// Map Diesel errors to domain user persistence errors.
fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            UserPersistenceError::duplicate(duplicate_field(info.constraint_name()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        _ => UserPersistenceError::query("database error"),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let email = EmailAddress::new(row.email).map_err(|err| {
        UserPersistenceError::query(format!("invalid email stored for user {}: {err}", row.user_id))
    })?;
    Ok(User {
        id: UserId::new(row.user_id),
        name: row.name,
        email,
        password: row.password,
    })
}

fn count_to_u64(count: i64) -> Result<u64, UserPersistenceError> {
    u64::try_from(count)
        .map_err(|_| UserPersistenceError::query(format!("negative row count: {count}")))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order(users::seq.asc())
            .offset(offset)
            .limit(limit)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn count(&self) -> Result<u64, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = users::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        count_to_u64(total)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::user_id.eq(id.get()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_user).transpose()
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::select(exists(
            users::table.filter(users::email.eq(email.as_ref())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error)
    }

    async fn insert(&self, user: &User) -> Result<StorageId, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let storage_id = Uuid::new_v4();
        let row = NewUserRow {
            storage_id,
            user_id: user.id.get(),
            name: &user.name,
            email: user.email.as_ref(),
            password: &user.password,
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        debug!(user_id = %user.id, %storage_id, "inserted user");
        Ok(StorageId::from_uuid(storage_id))
    }

    async fn update(&self, id: UserId, patch: &UserPatch) -> Result<bool, UserPersistenceError> {
        if patch.is_empty() {
            return Ok(self.find_by_id(id).await?.is_some());
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let changes = UserChangeset {
            user_id: patch.id.map(UserId::get),
            name: patch.name.as_deref(),
            email: patch.email.as_ref().map(AsRef::as_ref),
            password: patch.password.as_deref(),
        };

        let updated = diesel::update(users::table.filter(users::user_id.eq(id.get())))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(updated > 0)
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let deleted = diesel::delete(users::table.filter(users::user_id.eq(id.get())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(deleted > 0)
    }
}
