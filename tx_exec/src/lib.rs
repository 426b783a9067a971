//! Run repository queries against either a connection pool or an open
//! transaction, with a single `begin` combinator for the transactional path.

use sqlx::{Acquire, PgExecutor, PgPool, PgTransaction};
use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<'tx, T> = Pin<Box<dyn Future<Output = T> + Send + 'tx>>;

/// Something queries can be executed on. Implemented for `PgPool` and
/// `PgTransaction`, so repository methods are written once and work both
/// inside and outside a transaction.
pub trait Exec {
    type Conn<'c>: PgExecutor<'c> + Acquire<'c>;

    fn with_conn<'c, F, Fut, T>(&'c mut self, f: F) -> Fut
    where
        F: FnOnce(Self::Conn<'c>) -> Fut,
        Fut: Future<Output = T> + Send,
        T: Send;
}

impl Exec for PgPool {
    type Conn<'c> = &'c PgPool;

    fn with_conn<'c, F, Fut, T>(&'c mut self, f: F) -> Fut
    where
        F: FnOnce(Self::Conn<'c>) -> Fut,
        Fut: Future<Output = T> + Send,
        T: Send,
    {
        f(self) // &PgPool implements Executor
    }
}

impl<'t> Exec for PgTransaction<'t> {
    type Conn<'c> = &'c mut sqlx::PgConnection;

    fn with_conn<'c, F, Fut, T>(&'c mut self, f: F) -> Fut
    where
        F: FnOnce(Self::Conn<'c>) -> Fut,
        Fut: Future<Output = T> + Send,
        T: Send,
    {
        f(self.as_mut())
    }
}

/// Maps a pool-backed repository to its transaction-backed form.
pub trait Transactional {
    type WithinTx<'tx>: From<PgTransaction<'tx>> + Into<PgTransaction<'tx>>;
}

/// Exposes the pool a transaction can be begun from.
pub trait SharedPool<'tx> {
    type Handle: PgExecutor<'tx>;
    fn pool(&'tx self) -> Self::Handle;
}

pub trait Begin<'tx>: Transactional {
    /// Begins a transaction and hands the transaction-backed repository to
    /// `f`. Commits when `f` returns `Ok`; on `Err` the transaction is
    /// dropped without commit, which rolls it back, and the error is
    /// propagated to the caller.
    fn begin<F, E>(&'tx self, f: F) -> BoxFuture<'tx, Result<(), E>>
    where
        F: FnOnce(Self::WithinTx<'tx>) -> BoxFuture<'tx, Result<Self::WithinTx<'tx>, E>>
            + Send
            + 'tx,
        E: From<sqlx::Error> + Send + 'tx,
        Self: Sized;
}

impl<'tx, R> Begin<'tx> for R
where
    R: Transactional + SharedPool<'tx>,
    R::Handle: sqlx::Acquire<'tx, Database = sqlx::Postgres>,
{
    fn begin<F, E>(&'tx self, f: F) -> BoxFuture<'tx, Result<(), E>>
    where
        F: FnOnce(Self::WithinTx<'tx>) -> BoxFuture<'tx, Result<Self::WithinTx<'tx>, E>>
            + Send
            + 'tx,
        E: From<sqlx::Error> + Send + 'tx,
        Self: Sized,
    {
        let handle = self.pool();
        let fut = handle.begin();
        Box::pin(async move {
            let tx = fut.await.map_err(E::from)?;
            let ret = f(Self::WithinTx::from(tx)).await?;
            let tx = ret.into();
            tx.commit().await.map_err(E::from)?;
            Ok(())
        })
    }
}
