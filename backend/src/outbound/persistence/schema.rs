//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// User directory records.
    ///
    /// `storage_id` is generated on insert and never exposed in user JSON.
    /// `seq` records insertion order for stable pagination.
    users (storage_id) {
        storage_id -> Uuid,
        seq -> Int8,
        /// Caller-assigned identifier (`users_user_id_key`).
        user_id -> Int8,
        name -> Text,
        /// Unique address (`users_email_key`).
        email -> Text,
        password -> Text,
    }
}
