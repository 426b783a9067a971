//! Pooled Postgres CRUD demonstration: one `users` table, one repository,
//! and a fixed transaction example that aborts to show rollback.

pub mod config;
pub mod error;
pub mod users;

pub use config::{create_pool, StoreConfig};
pub use error::StoreError;
pub use users::{User, UsersRepository};

use sqlx::migrate::Migrator;
use sqlx::PgPool;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies the embedded schema migrations. Called once at startup.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
