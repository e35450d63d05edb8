//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL user repository using Diesel ORM
//! - **cache**: Redis-backed rate limit counters via `bb8-redis`
//! - **memory**: process-local fallbacks for both ports
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod cache;
pub mod memory;
pub mod persistence;
