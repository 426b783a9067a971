use thiserror::Error;

/// Errors surfaced by the user store. The repository never logs; callers
/// decide whether to log or propagate.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A mutating statement touched a different number of rows than expected.
    #[error("statement affected {actual} rows, expected {expected}")]
    UnexpectedRowCount { expected: u64, actual: u64 },

    /// Deliberate abort used to exercise transaction rollback.
    #[error("transaction aborted: {0}")]
    Aborted(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
