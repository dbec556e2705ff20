//! Custom error types for the order management service

use thiserror::Error;

/// Error taxonomy for every user-facing action.
///
/// `Conflict` is retried internally and never shown to a user; `Store`
/// is logged and surfaced as a generic failure message.
#[derive(Error, Debug)]
pub enum AppError {
    /// Empty or malformed user input; the caller re-prompts
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Referenced entity is absent
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The role lacks permission for the requested action
    #[error("Unrecognized choice.")]
    Forbidden,

    /// Identifier collision; exhausted internal retries
    #[error("Could not allocate a unique identifier")]
    Conflict,

    /// Transport or query failure against the backing store
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// The input line source failed or was closed
    #[error("Input error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for results in the service
pub type AppResult<T> = Result<T, AppError>;

/// True when a sqlx error is a Postgres unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}
