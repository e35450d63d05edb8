//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes.

use actix_web::http::header::RETRY_AFTER;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Details key carrying the seconds until a rate-limited client may retry.
pub(crate) const RETRY_AFTER_DETAIL: &str = "retryAfterSecs";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        // Duplicate ids and emails are reported as bad requests.
        ErrorCode::InvalidRequest | ErrorCode::ValidationFailed | ErrorCode::Conflict => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

fn retry_after_secs(error: &Error) -> Option<u64> {
    if error.code() != ErrorCode::RateLimited {
        return None;
    }
    error
        .details()
        .and_then(|details| details.get(RETRY_AFTER_DETAIL))
        .and_then(serde_json::Value::as_u64)
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if self.code() == ErrorCode::InternalError {
            error!(message = %self.message(), trace_id = ?self.trace_id(), "internal error");
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if let Some(secs) = retry_after_secs(self) {
            builder.insert_header((RETRY_AFTER, secs.to_string()));
        }

        // Validation failures answer with the bare field map.
        if let (ErrorCode::ValidationFailed, Some(fields)) = (self.code(), self.details()) {
            return builder.json(fields);
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}
