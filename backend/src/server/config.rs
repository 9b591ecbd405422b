//! HTTP server configuration object and helpers.

use actix_web::cookie::{Key, SameSite};
use std::net::SocketAddr;
use url::Url;

use crate::outbound::persistence::DbPool;

/// Image bucket connection settings.
#[derive(Clone)]
pub struct BucketConfig {
    /// Base URL objects are PUT under and served from.
    pub base_url: Url,
    /// Optional bearer token for uploads.
    pub bearer_token: Option<String>,
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) editor_password: String,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) bucket: Option<BucketConfig>,
}

impl ServerConfig {
    /// Construct a server configuration with no database or bucket attached.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        editor_password: impl Into<String>,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            editor_password: editor_password.into(),
            db_pool: None,
            bucket: None,
        }
    }

    /// Attach a database connection pool for the Diesel repositories.
    ///
    /// Without a pool the server runs entirely on in-memory fixtures, which
    /// suits local development and tests.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach the image bucket used to re-host selected shoe images.
    #[must_use]
    pub fn with_bucket(mut self, bucket: BucketConfig) -> Self {
        self.bucket = Some(bucket);
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
