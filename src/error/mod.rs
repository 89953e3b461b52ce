use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::otp::OtpError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Email required")]
    MissingEmail,
    #[error("OTP dispatch failed: {0}")]
    OtpDispatch(#[from] OtpError),
    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingEmail => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Email required" }),
            ),
            ApiError::OtpDispatch(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "success": false, "message": err.to_string() }),
            ),
            ApiError::HealthCheckFailed(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "message": "Health check failed", "error": err }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Body for panics caught outside the health boundary
pub fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(msg) = err.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(msg) = err.downcast_ref::<&str>() {
        msg.to_string()
    } else {
        "unknown panic payload".to_string()
    };
    tracing::error!(panic = %detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Something went wrong!" })),
    )
        .into_response()
}
