//! Client identification for rate-limited endpoints.
//!
//! Budgets are charged to the TCP peer address. Forwarding headers such as
//! `X-Forwarded-For` are client-controlled and therefore ignored.

use actix_web::HttpRequest;

use crate::domain::ClientKey;

/// Derive the budget key for `req` from its peer IP address.
pub fn client_key(req: &HttpRequest) -> ClientKey {
    req.peer_addr().map_or_else(
        || ClientKey::new(ClientKey::UNKNOWN),
        |addr| ClientKey::new(addr.ip().to_string()),
    )
}
