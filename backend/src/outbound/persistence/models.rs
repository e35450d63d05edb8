//! Diesel row structs for the `users` table.
//!
//! Internal to the persistence adapter; repositories convert these to and
//! from domain types.

use diesel::prelude::*;
use uuid::Uuid;

use super::schema::users;

/// Row struct for reading user records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Insertable struct for new user records; `seq` is assigned by the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub storage_id: Uuid,
    pub user_id: i64,
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Changeset applying a merge-patch; `None` columns are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserChangeset<'a> {
    pub user_id: Option<i64>,
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password: Option<&'a str>,
}
