// Error types for database operations

use thiserror::Error;

/// Error types for database connection and query operations
#[derive(Debug, Error)]
pub enum DbError {
    /// Error occurred while building the connection pool
    #[error("Database connection error: {0}")]
    ConnectionError(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        DbError::ConnectionError(err.to_string())
    }
}
