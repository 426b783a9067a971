//! Store connection settings, read from the environment at startup.

use crate::StoreError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::env;

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl StoreConfig {
    /// Reads `STORE_HOST`, `STORE_PORT`, `STORE_DATABASE`, `STORE_USER` and
    /// `STORE_PASSWORD`, falling back to local-development defaults.
    pub fn from_env() -> Result<Self, StoreError> {
        let port = match env::var("STORE_PORT") {
            Ok(value) => value
                .parse()
                .map_err(|_| StoreError::Config(format!("invalid STORE_PORT: {value}")))?,
            Err(_) => 5432,
        };

        Ok(Self {
            host: env::var("STORE_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port,
            database: env::var("STORE_DATABASE").unwrap_or_else(|_| "user_store".to_string()),
            user: env::var("STORE_USER").unwrap_or_else(|_| "postgres".to_string()),
            password: env::var("STORE_PASSWORD").unwrap_or_else(|_| "postgres".to_string()),
        })
    }

    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }
}

/// Creates the process-scoped connection pool. Call once at startup and
/// close the pool before exit.
pub async fn create_pool(config: &StoreConfig) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_with(config.connect_options())
        .await?;

    Ok(pool)
}
