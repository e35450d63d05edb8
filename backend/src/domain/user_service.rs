//! User directory domain service.
//!
//! Implements the user driving ports on top of a [`UserRepository`]. Identity
//! and email uniqueness are checked up front so callers receive a conflict
//! before any write, and the store's own unique constraints catch the races
//! the pre-checks cannot.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::pagination::{Page, PageRequest};
use crate::domain::ports::{
    DeleteOutcome, UpdateOutcome, UserPersistenceError, UserRepository, UsersCommand, UsersQuery,
};
use crate::domain::{Error, StorageId, User, UserId, UserPatch};

/// Message returned when a write would duplicate an `id` or `email`.
pub const DUPLICATE_USER_MESSAGE: &str = "User with this ID or email already exists";
/// Message returned when no user matches an identifier.
pub const USER_NOT_FOUND_MESSAGE: &str = "User not found";

/// User directory service implementing [`UsersQuery`] and [`UsersCommand`].
#[derive(Clone)]
pub struct UserDirectoryService<R: ?Sized> {
    repo: Arc<R>,
}

impl<R: ?Sized> UserDirectoryService<R> {
    /// Create a new service backed by `repo`.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

impl<R> UserDirectoryService<R>
where
    R: UserRepository + ?Sized,
{
    fn map_persistence_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::Duplicate { .. } => Error::conflict(DUPLICATE_USER_MESSAGE),
        }
    }

    async fn id_taken(&self, id: UserId) -> Result<bool, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map(|found| found.is_some())
            .map_err(Self::map_persistence_error)
    }

    async fn email_taken(&self, user: &User) -> Result<bool, Error> {
        self.repo
            .email_exists(&user.email)
            .await
            .map_err(Self::map_persistence_error)
    }

    /// Reject `candidate` when another record already holds its id or email.
    ///
    /// `current` is the record being replaced, whose own values never
    /// conflict with themselves.
    async fn ensure_unique(&self, candidate: &User, current: Option<&User>) -> Result<(), Error> {
        let id_changed = current.is_none_or(|existing| existing.id != candidate.id);
        if id_changed && self.id_taken(candidate.id).await? {
            return Err(Error::conflict(DUPLICATE_USER_MESSAGE));
        }
        let email_changed = current.is_none_or(|existing| existing.email != candidate.email);
        if email_changed && self.email_taken(candidate).await? {
            return Err(Error::conflict(DUPLICATE_USER_MESSAGE));
        }
        Ok(())
    }

    async fn load(&self, id: UserId) -> Result<User, Error> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| Error::not_found(USER_NOT_FOUND_MESSAGE))
    }
}

#[async_trait]
impl<R> UsersQuery for UserDirectoryService<R>
where
    R: UserRepository + ?Sized,
{
    async fn list_users(&self, request: PageRequest) -> Result<Page<User>, Error> {
        let total = self
            .repo
            .count()
            .await
            .map_err(Self::map_persistence_error)?;
        let limit = i64::try_from(request.limit())
            .map_err(|_| Error::invalid_request("page is out of range"))?;
        let users = self
            .repo
            .list(request.offset(), limit)
            .await
            .map_err(Self::map_persistence_error)?;
        Ok(Page::new(request, users, total))
    }

    async fn get_user(&self, id: UserId) -> Result<User, Error> {
        self.load(id).await
    }
}

#[async_trait]
impl<R> UsersCommand for UserDirectoryService<R>
where
    R: UserRepository + ?Sized,
{
    async fn create_user(&self, user: User) -> Result<StorageId, Error> {
        self.ensure_unique(&user, None).await?;
        self.repo
            .insert(&user)
            .await
            .map_err(Self::map_persistence_error)
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<UpdateOutcome, Error> {
        let existing = self.load(id).await?;
        if !patch.changes(&existing) {
            return Ok(UpdateOutcome::Unchanged);
        }

        let merged = patch.apply_to(&existing);
        self.ensure_unique(&merged, Some(&existing)).await?;

        let matched = self
            .repo
            .update(id, &patch)
            .await
            .map_err(Self::map_persistence_error)?;
        if matched {
            Ok(UpdateOutcome::Updated)
        } else {
            Err(Error::not_found(USER_NOT_FOUND_MESSAGE))
        }
    }

    async fn delete_user(&self, id: UserId) -> Result<DeleteOutcome, Error> {
        let removed = self
            .repo
            .delete(id)
            .await
            .map_err(Self::map_persistence_error)?;
        Ok(if removed {
            DeleteOutcome::Deleted
        } else {
            DeleteOutcome::NotFound
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EmailAddress, ErrorCode};
    use crate::domain::ports::MockUserRepository;
    use mockall::predicate::eq;
    use rstest::rstest;

    fn user(id: i64, email: &str) -> User {
        User {
            id: UserId::new(id),
            name: format!("User {id}"),
            email: EmailAddress::new(email).expect("valid email"),
            password: "secret".to_owned(),
        }
    }

    fn make_service(repo: MockUserRepository) -> UserDirectoryService<MockUserRepository> {
        UserDirectoryService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn list_users_combines_page_and_total() {
        let mut repo = MockUserRepository::new();
        repo.expect_count().times(1).return_once(|| Ok(3));
        repo.expect_list()
            .with(eq(2_i64), eq(2_i64))
            .times(1)
            .return_once(|_, _| Ok(vec![user(3, "c@example.com")]));

        let service = make_service(repo);
        let request = PageRequest::new(2, 2).expect("valid page");
        let page = service.list_users(request).await.expect("page");

        assert_eq!(page.items, vec![user(3, "c@example.com")]);
        assert_eq!(page.total, 3);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn get_user_reports_missing_record() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(UserId::new(9)))
            .return_once(|_| Ok(None));

        let error = make_service(repo)
            .get_user(UserId::new(9))
            .await
            .expect_err("missing");
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), USER_NOT_FOUND_MESSAGE);
    }

    #[tokio::test]
    async fn create_user_inserts_unique_record() {
        let stored = StorageId::random();
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().return_once(|_| Ok(None));
        repo.expect_email_exists().return_once(|_| Ok(false));
        repo.expect_insert()
            .withf(|candidate| candidate.id == UserId::new(1))
            .times(1)
            .return_once(move |_| Ok(stored));

        let created = make_service(repo)
            .create_user(user(1, "a@example.com"))
            .await
            .expect("created");
        assert_eq!(created, stored);
    }

    #[rstest]
    #[case(true, false)]
    #[case(false, true)]
    #[tokio::test]
    async fn create_user_rejects_duplicates_before_writing(
        #[case] id_taken: bool,
        #[case] email_taken: bool,
    ) {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .return_once(move |_| Ok(id_taken.then(|| user(1, "other@example.com"))));
        repo.expect_email_exists()
            .returning(move |_| Ok(email_taken));
        repo.expect_insert().never();

        let error = make_service(repo)
            .create_user(user(1, "a@example.com"))
            .await
            .expect_err("duplicate");
        assert_eq!(error.code(), ErrorCode::Conflict);
        assert_eq!(error.message(), DUPLICATE_USER_MESSAGE);
    }

    #[tokio::test]
    async fn create_user_maps_store_uniqueness_race_to_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().return_once(|_| Ok(None));
        repo.expect_email_exists().return_once(|_| Ok(false));
        repo.expect_insert()
            .return_once(|_| Err(UserPersistenceError::duplicate("email")));

        let error = make_service(repo)
            .create_user(user(1, "a@example.com"))
            .await
            .expect_err("duplicate");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn repository_failures_map_to_error_codes(
        #[case] failure: UserPersistenceError,
        #[case] expected: ErrorCode,
    ) {
        let mut repo = MockUserRepository::new();
        repo.expect_count().return_once(move || Err(failure));

        let request = PageRequest::new(1, 10).expect("valid page");
        let error = make_service(repo)
            .list_users(request)
            .await
            .expect_err("failure");
        assert_eq!(error.code(), expected);
    }

    #[tokio::test]
    async fn update_user_reports_missing_record() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id().return_once(|_| Ok(None));
        repo.expect_update().never();

        let patch = UserPatch {
            name: Some("New".to_owned()),
            ..UserPatch::default()
        };
        let error = make_service(repo)
            .update_user(UserId::new(4), patch)
            .await
            .expect_err("missing");
        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(UserPatch::default())]
    #[case(UserPatch { name: Some("User 1".to_owned()), ..UserPatch::default() })]
    #[tokio::test]
    async fn update_user_skips_writes_that_change_nothing(#[case] patch: UserPatch) {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .return_once(|_| Ok(Some(user(1, "a@example.com"))));
        repo.expect_update().never();

        let outcome = make_service(repo)
            .update_user(UserId::new(1), patch)
            .await
            .expect("unchanged");
        assert_eq!(outcome, UpdateOutcome::Unchanged);
    }

    #[tokio::test]
    async fn update_user_writes_changed_fields() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(UserId::new(1)))
            .return_once(|_| Ok(Some(user(1, "a@example.com"))));
        repo.expect_email_exists().never();
        repo.expect_update()
            .withf(|id, patch| *id == UserId::new(1) && patch.name.as_deref() == Some("Renamed"))
            .times(1)
            .return_once(|_, _| Ok(true));

        let patch = UserPatch {
            name: Some("Renamed".to_owned()),
            ..UserPatch::default()
        };
        let outcome = make_service(repo)
            .update_user(UserId::new(1), patch)
            .await
            .expect("updated");
        assert_eq!(outcome, UpdateOutcome::Updated);
    }

    #[tokio::test]
    async fn update_user_rejects_taken_email() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .return_once(|_| Ok(Some(user(1, "a@example.com"))));
        repo.expect_email_exists()
            .withf(|email| email.as_ref() == "b@example.com")
            .return_once(|_| Ok(true));
        repo.expect_update().never();

        let patch = UserPatch {
            email: Some(EmailAddress::new("b@example.com").expect("valid email")),
            ..UserPatch::default()
        };
        let error = make_service(repo)
            .update_user(UserId::new(1), patch)
            .await
            .expect_err("duplicate");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn update_user_rejects_taken_id() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .with(eq(UserId::new(1)))
            .return_once(|_| Ok(Some(user(1, "a@example.com"))));
        repo.expect_find_by_id()
            .with(eq(UserId::new(2)))
            .return_once(|_| Ok(Some(user(2, "b@example.com"))));
        repo.expect_update().never();

        let patch = UserPatch {
            id: Some(UserId::new(2)),
            ..UserPatch::default()
        };
        let error = make_service(repo)
            .update_user(UserId::new(1), patch)
            .await
            .expect_err("duplicate");
        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[case(true, DeleteOutcome::Deleted)]
    #[case(false, DeleteOutcome::NotFound)]
    #[tokio::test]
    async fn delete_user_reports_outcome(#[case] removed: bool, #[case] expected: DeleteOutcome) {
        let mut repo = MockUserRepository::new();
        repo.expect_delete()
            .with(eq(UserId::new(7)))
            .return_once(move |_| Ok(removed));

        let outcome = make_service(repo)
            .delete_user(UserId::new(7))
            .await
            .expect("delete");
        assert_eq!(outcome, expected);
    }
}
