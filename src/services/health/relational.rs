// PostgreSQL liveness probe

use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, RuntimeErr, Statement};
use std::sync::Arc;

use super::{Probe, ProbeOutcome};
use crate::config::DbMode;

/// Runs `SELECT 1` on the shared pool
pub struct RelationalProbe {
    conn: Arc<DatabaseConnection>,
    mode: DbMode,
}

impl RelationalProbe {
    pub fn new(conn: Arc<DatabaseConnection>, mode: DbMode) -> Self {
        Self { conn, mode }
    }
}

/// Strips sea-orm's own wrapping so only the driver's message remains
fn driver_message(err: DbErr) -> String {
    match err {
        DbErr::Conn(inner) | DbErr::Exec(inner) | DbErr::Query(inner) => match inner {
            RuntimeErr::SqlxError(e) => e.to_string(),
            RuntimeErr::Internal(msg) => msg,
        },
        DbErr::ConnectionAcquire(e) => e.to_string(),
        DbErr::Custom(msg) => msg,
        other => other.to_string(),
    }
}

#[async_trait]
impl Probe for RelationalProbe {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn check(&self) -> ProbeOutcome {
        let backend = self.conn.get_database_backend();
        match self
            .conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await
        {
            Ok(_) => ProbeOutcome::Healthy(self.mode.label().to_string()),
            Err(err) => {
                tracing::warn!(error = ?err, "PostgreSQL liveness query failed");
                ProbeOutcome::Failed(driver_message(err))
            }
        }
    }

    /// The driver message is surfaced as-is
    fn failure_status(&self, cause: &str) -> String {
        format!("error: {}", cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn answering_connection() -> Arc<DatabaseConnection> {
        Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![BTreeMap::from([(
                    "?column?",
                    Value::Int(Some(1)),
                )])]])
                .into_connection(),
        )
    }

    fn failing_connection(err: DbErr) -> Arc<DatabaseConnection> {
        Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([err])
                .into_connection(),
        )
    }

    #[tokio::test]
    async fn test_label_follows_deployment_mode() {
        let local = RelationalProbe::new(answering_connection(), DbMode::Local);
        assert_eq!(local.render(local.check().await), "Local PostgreSQL");

        let aws = RelationalProbe::new(answering_connection(), DbMode::Aws);
        assert_eq!(aws.render(aws.check().await), "AWS RDS PostgreSQL");
    }

    #[tokio::test]
    async fn test_timeout_is_reported_without_wrapping() {
        let probe = RelationalProbe::new(
            failing_connection(DbErr::Custom("timeout".to_string())),
            DbMode::Local,
        );

        let outcome = probe.check().await;

        assert_eq!(outcome, ProbeOutcome::Failed("timeout".to_string()));
        assert_eq!(probe.render(outcome), "error: timeout");
    }

    #[tokio::test]
    async fn test_runtime_error_message_is_reported_verbatim() {
        let probe = RelationalProbe::new(
            failing_connection(DbErr::Conn(RuntimeErr::Internal(
                "connection refused".to_string(),
            ))),
            DbMode::Aws,
        );

        assert_eq!(
            probe.render(probe.check().await),
            "error: connection refused"
        );
    }

    #[test]
    fn test_failure_status_prefixes_cause() {
        let probe = RelationalProbe::new(answering_connection(), DbMode::Local);

        assert_eq!(
            probe.render(ProbeOutcome::Failed("timeout".to_string())),
            "error: timeout"
        );
    }
}
