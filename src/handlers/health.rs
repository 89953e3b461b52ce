// Health check endpoint handler implementation

use axum::{extract::State, Json};

use crate::error::{ApiError, ApiResult};
use crate::handlers::AppState;
use crate::services::health::HealthReport;

/// Handler for GET /health - Probes every backing service and returns the combined status
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthReport>> {
    let aggregator = state.health.clone();

    // Outer boundary: a fault escaping the aggregator becomes a 500, not a dead connection
    let report = tokio::spawn(async move { aggregator.collect().await })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Health aggregation failed");
            ApiError::HealthCheckFailed(e.to_string())
        })?;

    Ok(Json(report))
}
