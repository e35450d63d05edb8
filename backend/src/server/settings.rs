//! Runtime settings loaded via OrthoConfig.
//!
//! Values are layered from CLI flags, `USERS_*` environment variables and an
//! optional configuration file.

use std::net::SocketAddr;

use backend::domain::{RateLimitRule, RateLimitRuleError};
use backend::outbound::persistence::PoolConfig;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);
const DEFAULT_LIST_RATE_LIMIT: &str = "5 per minute";

/// Settings controlling the listener and backing stores.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USERS")]
pub struct ServerSettings {
    /// Socket address the HTTP listener binds to.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. The in-memory repository is used when unset.
    pub database_url: Option<String>,
    /// Redis URL for shared rate-limit counters. Counters stay in-process
    /// when unset.
    pub redis_url: Option<String>,
    /// Budget for `GET /users`, e.g. `"5 per minute"`.
    pub list_rate_limit: Option<String>,
    /// Upper bound on pooled database and Redis connections.
    pub db_max_connections: Option<u32>,
}

impl ServerSettings {
    /// Return the configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(DEFAULT_BIND_ADDR))
    }

    /// Parse the listing budget, falling back to five requests per minute.
    pub fn list_rate_limit(&self) -> Result<RateLimitRule, RateLimitRuleError> {
        self.list_rate_limit
            .as_deref()
            .unwrap_or(DEFAULT_LIST_RATE_LIMIT)
            .parse()
    }

    /// Return the connection pool bound.
    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .unwrap_or(PoolConfig::DEFAULT_MAX_SIZE)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "USERS_BIND_ADDR",
        "USERS_DATABASE_URL",
        "USERS_REDIS_URL",
        "USERS_LIST_RATE_LIMIT",
        "USERS_DB_MAX_CONNECTIONS",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("users-backend")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080".parse().expect("addr"));
        assert!(settings.database_url.is_none());
        assert!(settings.redis_url.is_none());
        assert_eq!(
            settings.list_rate_limit().expect("default rule").to_string(),
            "5 per 1 minute"
        );
        assert_eq!(settings.db_max_connections(), PoolConfig::DEFAULT_MAX_SIZE);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("USERS_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "USERS_DATABASE_URL",
                Some("postgres://users@db/users".to_owned()),
            ),
            ("USERS_REDIS_URL", Some("redis://cache:6379".to_owned())),
            ("USERS_LIST_RATE_LIMIT", Some("100 per hour".to_owned())),
            ("USERS_DB_MAX_CONNECTIONS", Some("4".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000".parse().expect("addr"));
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://users@db/users")
        );
        assert_eq!(settings.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(settings.list_rate_limit().expect("rule").limit(), 100);
        assert_eq!(settings.db_max_connections(), 4);
    }

    #[rstest]
    fn malformed_rate_limit_is_reported() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = ServerSettings {
            list_rate_limit: Some("often".to_owned()),
            ..load_from_empty_args()
        };
        assert!(settings.list_rate_limit().is_err());
    }
}
