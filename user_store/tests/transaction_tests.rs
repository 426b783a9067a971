use tx_exec::Begin;
use user_store::{StoreError, UsersRepository};

async fn seed_user(pool: &sqlx::PgPool, name: &str) -> anyhow::Result<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (name, create_time) VALUES ($1, NOW()) RETURNING id",
    )
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

#[sqlx::test(migrations = "./migrations")]
async fn aborted_rename_is_rolled_back(pool: sqlx::PgPool) -> anyhow::Result<()> {
    let id = seed_user(&pool, "original").await?;
    let repo = UsersRepository::new(pool.clone());

    let result = repo.rename_aborted(id, "updated_name".to_string()).await;
    assert!(matches!(result, Err(StoreError::Aborted(_))));

    // The intermediate update must be undone.
    let mut repo = UsersRepository::new(pool);
    assert_eq!(Some("original".to_string()), repo.name_by_id(id).await?);

    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn error_inside_transaction_rolls_back_all_steps(pool: sqlx::PgPool) -> anyhow::Result<()> {
    let first = seed_user(&pool, "first").await?;
    let second = seed_user(&pool, "second").await?;
    let repo = UsersRepository::new(pool.clone());

    let result: Result<(), StoreError> = repo
        .begin(|mut users| {
            Box::pin(async move {
                users.update_name(first, "changed_first").await?;
                users.update_name(second, "changed_second").await?;
                Err(StoreError::Aborted("forced failure".to_string()))
            })
        })
        .await;

    assert!(result.is_err());

    let mut repo = UsersRepository::new(pool);
    assert_eq!(Some("first".to_string()), repo.name_by_id(first).await?);
    assert_eq!(Some("second".to_string()), repo.name_by_id(second).await?);

    Ok(())
}

#[sqlx::test(migrations = "./migrations")]
async fn committed_rename_is_visible(pool: sqlx::PgPool) -> anyhow::Result<()> {
    let id = seed_user(&pool, "before").await?;
    let repo = UsersRepository::new(pool.clone());

    let result: Result<(), StoreError> = repo
        .begin(|mut users| {
            Box::pin(async move {
                users.update_name(id, "after").await?;
                Ok(users)
            })
        })
        .await;
    result?;

    let mut repo = UsersRepository::new(pool);
    assert_eq!(Some("after".to_string()), repo.name_by_id(id).await?);

    Ok(())
}
