// Database connection pooling management

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::ConnectOptions;
use sea_orm::{DatabaseConnection, SqlxPostgresConnector};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::db::error::DbError;

/// Database connection pool for managing Sea-ORM connections
pub struct DbPool {
    pool: Arc<DatabaseConnection>,
}

impl DbPool {
    /// Creates a new database connection pool from API configuration.
    ///
    /// The pool is lazy: no connection is opened until the first query, so the
    /// server still starts (and reports the failure on `/health`) when the
    /// database is down.
    pub async fn new(config: &ApiConfig) -> Result<Self, DbError> {
        // How long a caller waits for a connection
        let acquire_timeout_secs: u64 = 5;
        let idle_timeout_secs: u64 = 300;
        let max_lifetime_secs: u64 = 1800;

        let connect_opts = config
            .database_url
            .parse::<PgConnectOptions>()?
            .disable_statement_logging();

        let pool = PgPoolOptions::new()
            .max_connections(config.db_pool_max)
            .min_connections(config.db_pool_min)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(idle_timeout_secs))
            .max_lifetime(Duration::from_secs(max_lifetime_secs))
            .connect_lazy_with(connect_opts);

        Ok(DbPool {
            pool: Arc::new(SqlxPostgresConnector::from_sqlx_postgres_pool(pool)),
        })
    }

    /// Returns a handle to the shared pool
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.pool)
    }
}
