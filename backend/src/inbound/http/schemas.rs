//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialised shape of their corresponding
//! domain types but live in the inbound adapter layer where framework
//! concerns belong.

use std::collections::BTreeMap;

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The request would duplicate an existing `id` or `email`.
    #[schema(rename = "conflict")]
    Conflict,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The client exhausted its request budget.
    #[schema(rename = "rate_limited")]
    RateLimited,
    /// A backing store is unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// Every failure except field validation answers with this envelope.
#[derive(ToSchema)]
#[schema(as = Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "User with this ID or email already exists")]
    message: String,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "0e6a4ba4-3c0e-4c5b-9d63-bc2f1d0a6f11")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for a validation failure body: field name to messages.
#[derive(ToSchema)]
#[schema(as = FieldErrors)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FieldErrorsSchema(BTreeMap<String, Vec<String>>);

/// OpenAPI schema for [`crate::domain::User`].
#[derive(ToSchema)]
#[schema(as = User)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserSchema {
    /// Caller-assigned identifier, unique across the directory.
    #[schema(example = 1)]
    id: i64,
    #[schema(example = "Ada Lovelace")]
    name: String,
    /// Unique email address.
    #[schema(example = "ada@example.com")]
    email: String,
    #[schema(example = "analytical-engine")]
    password: String,
}

/// OpenAPI schema for a `PUT /users/{id}` body; every field is optional.
#[derive(ToSchema)]
#[schema(as = UserPatch)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UserPatchSchema {
    #[schema(example = 2)]
    id: Option<i64>,
    #[schema(example = "Ada King")]
    name: Option<String>,
    #[schema(example = "ada.king@example.com")]
    email: Option<String>,
    password: Option<String>,
}

/// OpenAPI schema for a page of users.
#[derive(ToSchema)]
#[schema(as = UsersPage)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct UsersPageSchema {
    users: Vec<UserSchema>,
    /// Number of users in the whole collection.
    #[schema(example = 42)]
    total_users: u64,
    #[schema(example = 1)]
    page: u64,
    #[schema(example = 5)]
    total_pages: u64,
}
