//! Users API handlers.
//!
//! ```text
//! GET    /users?page=1&limit=10
//! GET    /users/{id}
//! POST   /users        {"id":1,"name":"Ada","email":"ada@example.com","password":"p"}
//! PUT    /users/{id}   {"name":"Ada Lovelace"}
//! DELETE /users/{id}
//! ```
//!
//! Handlers take raw JSON so the validator can report every field problem at
//! once instead of failing on the first serde error.

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::pagination::{Page, PageRequest, PaginationError};
use crate::domain::ports::{DeleteOutcome, UpdateOutcome};
use crate::domain::user_service::USER_NOT_FOUND_MESSAGE;
use crate::domain::{Error, User, UserId, validate_new_user, validate_user_patch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::rate_limit::client_key;
use crate::inbound::http::schemas::{
    ErrorSchema, FieldErrorsSchema, UserPatchSchema, UserSchema, UsersPageSchema,
};
use crate::inbound::http::state::HttpState;

/// Plain-text body served on `GET /`.
pub const BANNER: &str = "Users API is running";

/// Query string accepted by `GET /users`.
///
/// Values stay textual so non-integers can be reported with a dedicated
/// message.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// One-based page number (default 1).
    #[param(value_type = Option<i64>, example = 1)]
    pub page: Option<String>,
    /// Page size (default 10, at most 100).
    #[param(value_type = Option<i64>, example = 10)]
    pub limit: Option<String>,
}

/// Acknowledgement body for mutations.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "User updated successfully")]
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

/// Body returned by `POST /users`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreatedResponse {
    #[schema(example = "User added")]
    pub message: String,
    /// Storage identifier generated for the new record.
    #[schema(example = "9b2f6c1e-3f5a-4d8e-a2b1-7c4d5e6f7a8b")]
    pub id: String,
}

/// Path identifiers that are not integers address no user.
fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    raw.parse::<i64>()
        .map(UserId::new)
        .map_err(|_| Error::not_found(USER_NOT_FOUND_MESSAGE))
}

fn parse_list_query(raw: &str) -> Result<ListUsersQuery, Error> {
    web::Query::<ListUsersQuery>::from_query(raw)
        .map(web::Query::into_inner)
        .map_err(|_| Error::invalid_request(PaginationError::NotAnInteger.to_string()))
}

fn parse_body(body: &[u8]) -> Result<Value, Error> {
    serde_json::from_slice(body)
        .map_err(|err| Error::invalid_request(format!("request body must be valid JSON: {err}")))
}

/// Banner confirming the service is up.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = String, content_type = "text/plain")),
    tags = ["users"],
    operation_id = "banner"
)]
#[get("/")]
pub async fn banner() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(BANNER)
}

/// List users one page at a time, in insertion order.
///
/// Rate limited per client address.
#[utoipa::path(
    get,
    path = "/users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "One page of users", body = UsersPageSchema),
        (status = 400, description = "Invalid pagination parameters", body = ErrorSchema),
        (status = 429, description = "Rate limit exceeded", body = ErrorSchema,
            headers(("Retry-After" = u64, description = "Seconds until the window resets"))),
        (status = 503, description = "Backing store unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    req: HttpRequest,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Page<User>>> {
    state.list_rate_limiter.check(&client_key(&req)).await?;

    // Parsed after the limiter so malformed queries are still charged.
    let ListUsersQuery { page, limit } = parse_list_query(req.query_string())?;
    let request = PageRequest::parse(page.as_deref(), limit.as_deref())
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let page = state.users_query.list_users(request).await?;
    Ok(web::Json(page))
}

/// Fetch one user by identifier.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User", body = UserSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let id = parse_user_id(&path)?;
    let user = state.users_query.get_user(id).await?;
    Ok(web::Json(user))
}

/// Create a user from a complete record.
#[utoipa::path(
    post,
    path = "/users",
    request_body = UserSchema,
    responses(
        (status = 201, description = "User added", body = CreatedResponse),
        (status = 400,
            description = "Field validation failures; a duplicate id or email answers with an Error body",
            body = FieldErrorsSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(state: web::Data<HttpState>, body: web::Bytes) -> ApiResult<HttpResponse> {
    let user = validate_new_user(&parse_body(&body)?)?;
    let storage_id = state.users_command.create_user(user).await?;
    Ok(HttpResponse::Created().json(CreatedResponse {
        message: "User added".to_owned(),
        id: storage_id.to_string(),
    }))
}

/// Merge the supplied fields into an existing user.
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    request_body = UserPatchSchema,
    responses(
        (status = 200, description = "User updated or already up to date", body = MessageResponse),
        (status = 400,
            description = "Field validation failures; a duplicate id or email answers with an Error body",
            body = FieldErrorsSchema),
        (status = 404, description = "User not found", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = parse_user_id(&path)?;
    let patch = validate_user_patch(&parse_body(&body)?)?;
    let message = match state.users_command.update_user(id, patch).await? {
        UpdateOutcome::Updated => "User updated successfully",
        UpdateOutcome::Unchanged => "Nothing to update",
    };
    Ok(web::Json(MessageResponse::new(message)))
}

/// Remove a user. Deleting an unknown id is not an error.
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Deletion outcome", body = MessageResponse)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let id = parse_user_id(&path)?;
    let message = match state.users_command.delete_user(id).await? {
        DeleteOutcome::Deleted => "User deleted successfully",
        DeleteOutcome::NotFound => "No user found",
    };
    Ok(web::Json(MessageResponse::new(message)))
}

/// Register every user route on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(banner)
        .service(list_users)
        .service(get_user)
        .service(create_user)
        .service(update_user)
        .service(delete_user);
}

#[cfg(test)]
mod tests;
