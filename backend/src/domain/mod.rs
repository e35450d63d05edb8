//! Domain primitives, services, and ports.
//!
//! Purpose: Define strongly typed user directory entities and the use-case
//! services that drive them. Adapters in `inbound` and `outbound` depend on
//! this module; it depends on neither.
//!
//! Public surface:
//! - `Error`, `ErrorCode`: transport-agnostic failure payload.
//! - `User`, `UserPatch`: directory record and its merge-patch.
//! - `UserDirectoryService`: implements the user query and command ports.
//! - `FixedWindowRateLimiter`: implements the rate limiter port.

pub mod error;
pub mod pagination;
pub mod ports;
pub mod rate_limit;
pub mod trace_id;
pub mod user;
pub mod user_service;
pub mod user_validation;

pub use self::error::{Error, ErrorCode};
pub use self::pagination::{Page, PageRequest, PaginationError};
pub use self::rate_limit::{ClientKey, FixedWindowRateLimiter, RateLimitRule, RateLimitRuleError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{EmailAddress, StorageId, User, UserId, UserPatch, UserValidationError};
pub use self::user_service::UserDirectoryService;
pub use self::user_validation::{FieldErrors, validate_new_user, validate_user_patch};

