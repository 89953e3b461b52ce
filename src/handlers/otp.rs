// OTP email endpoint handler implementation

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::handlers::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SendOtpRequest {
    email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendOtpResponse {
    success: bool,
    message: String,
}

/// Handler for POST /api/send-otp-email
pub async fn send_otp_email(
    State(state): State<AppState>,
    payload: Result<Json<SendOtpRequest>, JsonRejection>,
) -> ApiResult<Json<SendOtpResponse>> {
    // An unreadable body is treated the same as one without an email
    let request = payload.map(|Json(body)| body).unwrap_or_default();
    let email = request
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or(ApiError::MissingEmail)?;

    state.otp.issue(&email).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to send OTP email");
        ApiError::from(e)
    })?;

    Ok(Json(SendOtpResponse {
        success: true,
        message: format!("OTP sent to {}", email),
    }))
}
