use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Db(#[from] crate::db::DbError),
    #[error("storage unavailable: {operation} did not finish within {timeout:?}")]
    Unavailable {
        operation: &'static str,
        timeout: Duration,
    },
    #[error("invalid content: {0}")]
    InvalidContent(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;
