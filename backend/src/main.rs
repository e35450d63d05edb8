//! Backend entry-point: loads settings, prepares stores, and serves the API.

mod server;

use actix_web::web;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::cache::RedisRateLimitStore;
use backend::outbound::persistence::{DbPool, PoolConfig, migrate};
use ortho_config::OrthoConfig;
use server::{ServerConfig, ServerSettings, create_server};

fn io_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

async fn build_server_config(settings: &ServerSettings) -> std::io::Result<ServerConfig> {
    let rule = settings
        .list_rate_limit()
        .map_err(|err| io_error("invalid list rate limit", err))?;
    let mut config = ServerConfig::new(settings.bind_addr(), rule);

    if let Some(database_url) = settings.database_url.clone() {
        let applied = migrate(database_url.clone())
            .await
            .map_err(|err| io_error("database migration failed", err))?;
        info!(applied, "database schema up to date");

        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(settings.db_max_connections()),
        )
        .await
        .map_err(|err| io_error("database pool", err))?;
        config = config.with_db_pool(pool);
    }

    if let Some(redis_url) = settings.redis_url.as_deref() {
        let store = RedisRateLimitStore::connect(redis_url, settings.db_max_connections())
            .await
            .map_err(|err| io_error("redis pool", err))?;
        config = config.with_rate_limit_store(store);
    }

    Ok(config)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(|err| io_error("invalid configuration", err))?;
    let config = build_server_config(&settings).await?;
    let bind_addr = settings.bind_addr();

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "listening");

    let result = server.await;
    health_state.mark_draining();
    result
}
