//! Backend entry-point: reads configuration, runs migrations, and starts
//! the HTTP server.

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use diesel::Connection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use std::env;
use std::net::SocketAddr;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

use closet_backend::inbound::http::health::HealthState;
use closet_backend::outbound::persistence::{DbPool, PoolConfig};
use closet_backend::server::{BucketConfig, ServerConfig, create_server};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

fn session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

fn bucket_config() -> std::io::Result<Option<BucketConfig>> {
    let Ok(raw) = env::var("IMAGE_BUCKET_URL") else {
        return Ok(None);
    };
    let base_url = Url::parse(&raw)
        .map_err(|e| std::io::Error::other(format!("invalid IMAGE_BUCKET_URL: {e}")))?;
    Ok(Some(BucketConfig {
        base_url,
        bearer_token: env::var("IMAGE_BUCKET_TOKEN").ok(),
    }))
}

fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = diesel::PgConnection::establish(database_url)
        .map_err(|e| std::io::Error::other(format!("database connection failed: {e}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;
    Ok(())
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

    let editor_password = env::var("EDITOR_PASSWORD")
        .map_err(|_| std::io::Error::other("EDITOR_PASSWORD must be set"))?;

    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;

    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);

    let mut config = ServerConfig::new(
        session_key()?,
        cookie_secure,
        SameSite::Lax,
        bind_addr,
        editor_password,
    );

    if let Ok(database_url) = env::var("DATABASE_URL") {
        run_migrations(&database_url)?;
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(|e| std::io::Error::other(format!("pool construction failed: {e}")))?;
        config = config.with_db_pool(pool);
    }
    if let Some(bucket) = bucket_config()? {
        config = config.with_bucket(bucket);
    }

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}
