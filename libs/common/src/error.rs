//! Error types shared across the pizzeria services
//!
//! Database failures are classified by the phase they occur in, so a
//! caller can tell a bad configuration from a failed statement or a
//! schema migration that did not apply.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish the PostgreSQL connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// A statement failed while executing
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Applying schema migrations failed
    #[error("Database migration error: {0}")]
    Migration(String),

    /// The database configuration is invalid
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;
