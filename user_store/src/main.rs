use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use user_store::{create_pool, run_migrations, StoreConfig, UsersRepository};

/// Runs every store operation once, logging each outcome. A failed step is
/// logged and the demonstration moves on to the next one.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = StoreConfig::from_env()?;
    let pool = create_pool(&config).await?;
    run_migrations(&pool).await?;
    info!(host = %config.host, database = %config.database, "connected to store");

    let mut repo = UsersRepository::new(pool.clone());

    match repo.insert_users(100).await {
        Ok(rows) => info!(rows, "bulk insert complete"),
        Err(err) => warn!(error = %err, "bulk insert failed"),
    }

    match repo.count().await {
        Ok(total) => info!(total, "row count"),
        Err(err) => warn!(error = %err, "count failed"),
    }

    match repo.list(10).await {
        Ok(users) => info!(rows = users.len(), first = ?users.first(), "fetched user list"),
        Err(err) => warn!(error = %err, "list failed"),
    }

    match repo.find_by_id(6).await {
        Ok(Some(user)) => info!(?user, "fetched user by id"),
        Ok(None) => warn!(id = 6, "no such user"),
        Err(err) => warn!(error = %err, "fetch by id failed"),
    }

    match repo.name_by_id(6).await {
        Ok(Some(name)) => info!(name = %name, "fetched name by id"),
        Ok(None) => warn!(id = 6, "no such user"),
        Err(err) => warn!(error = %err, "name fetch failed"),
    }

    match repo.update_name(2, "renamed").await {
        Ok(true) => info!(id = 2, "renamed user"),
        Ok(false) => warn!(id = 2, "rename touched no row"),
        Err(err) => warn!(error = %err, "rename failed"),
    }

    match repo.delete_by_id(1).await {
        Ok(true) => info!(id = 1, "deleted user"),
        Ok(false) => warn!(id = 1, "delete touched no row"),
        Err(err) => warn!(error = %err, "delete failed"),
    }

    // The transaction example always aborts; the rename it applies must not
    // be visible afterwards.
    match repo.rename_aborted(5, "updated_name".to_string()).await {
        Ok(()) => warn!(id = 5, "transaction unexpectedly committed"),
        Err(err) => info!(error = %err, "transaction aborted, changes rolled back"),
    }

    match repo.count().await {
        Ok(total) => info!(total, "final row count"),
        Err(err) => warn!(error = %err, "count failed"),
    }

    pool.close().await;
    Ok(())
}
