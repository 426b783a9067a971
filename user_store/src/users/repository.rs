use crate::error::StoreError;
use crate::users::models::User;
use chrono::Utc;
use sqlx::{PgPool, PgTransaction};
use tx_exec::{Begin, Exec, SharedPool, Transactional};

#[derive(Clone)]
pub struct UsersRepository<E: Exec> {
    executor: E,
}

impl<E: Exec> Transactional for UsersRepository<E> {
    type WithinTx<'tx> = UsersRepository<PgTransaction<'tx>>;
}

impl<'tx> SharedPool<'tx> for UsersRepository<PgPool> {
    type Handle = &'tx PgPool;
    fn pool(&'tx self) -> Self::Handle {
        &self.executor
    }
}

impl<'tx> Into<PgTransaction<'tx>> for UsersRepository<PgTransaction<'tx>> {
    fn into(self) -> PgTransaction<'tx> {
        self.executor
    }
}

impl<'tx> From<PgTransaction<'tx>> for UsersRepository<PgTransaction<'tx>> {
    fn from(tx: PgTransaction<'tx>) -> Self {
        Self { executor: tx }
    }
}

impl UsersRepository<PgPool> {
    pub fn new(pool: PgPool) -> Self {
        Self { executor: pool }
    }

    /// Fixed transaction example: renames the row, then aborts, so the
    /// rename is rolled back. Always returns `Err`.
    pub async fn rename_aborted(&self, id: i64, new_name: String) -> Result<(), StoreError> {
        self.begin(|mut users| {
            Box::pin(async move {
                users.update_name(id, &new_name).await?;
                Err(StoreError::Aborted("simulated failure after update".to_string()))
            })
        })
        .await
    }
}

impl<E: Exec> UsersRepository<E> {
    /// Inserts `count` generated rows (`user_1`, `user_2`, ...) stamped with
    /// the current time. Fails unless every insert affects exactly one row.
    pub async fn insert_users(&mut self, count: u32) -> Result<u64, StoreError> {
        let mut inserted = 0;
        for i in 1..=count {
            let name = format!("user_{i}");
            let result = self
                .executor
                .with_conn(|c| {
                    sqlx::query("INSERT INTO users (name, create_time) VALUES ($1, $2)")
                        .bind(&name)
                        .bind(Utc::now())
                        .execute(c)
                })
                .await?;

            if result.rows_affected() != 1 {
                return Err(StoreError::UnexpectedRowCount {
                    expected: 1,
                    actual: result.rows_affected(),
                });
            }
            inserted += result.rows_affected();
        }

        Ok(inserted)
    }

    /// Returns true iff exactly one row was deleted.
    pub async fn delete_by_id(&mut self, id: i64) -> Result<bool, StoreError> {
        let result = self
            .executor
            .with_conn(|c| {
                sqlx::query("DELETE FROM users WHERE id = $1")
                    .bind(id)
                    .execute(c)
            })
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Returns true iff exactly one row was renamed.
    pub async fn update_name(&mut self, id: i64, new_name: &str) -> Result<bool, StoreError> {
        let result = self
            .executor
            .with_conn(|c| {
                sqlx::query("UPDATE users SET name = $1 WHERE id = $2")
                    .bind(new_name)
                    .bind(id)
                    .execute(c)
            })
            .await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn count(&mut self) -> Result<i64, StoreError> {
        let total = self
            .executor
            .with_conn(|c| sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users").fetch_one(c))
            .await?;

        Ok(total)
    }

    pub async fn name_by_id(&mut self, id: i64) -> Result<Option<String>, StoreError> {
        let name = self
            .executor
            .with_conn(|c| {
                sqlx::query_scalar::<_, String>("SELECT name FROM users WHERE id = $1")
                    .bind(id)
                    .fetch_optional(c)
            })
            .await?;

        Ok(name)
    }

    pub async fn find_by_id(&mut self, id: i64) -> Result<Option<User>, StoreError> {
        let user = self
            .executor
            .with_conn(|c| {
                sqlx::query_as::<_, User>(
                    "SELECT id, name, create_time FROM users WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(c)
            })
            .await?;

        Ok(user)
    }

    /// Fetches up to `limit` rows in insertion (id) order.
    pub async fn list(&mut self, limit: i64) -> Result<Vec<User>, StoreError> {
        let users = self
            .executor
            .with_conn(|c| {
                sqlx::query_as::<_, User>(
                    "SELECT id, name, create_time FROM users ORDER BY id LIMIT $1",
                )
                .bind(limit)
                .fetch_all(c)
            })
            .await?;

        Ok(users)
    }
}
