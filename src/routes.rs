// API routes and cross-cutting HTTP layers

use axum::routing::{get, post};
use axum::Router;
use http::{header, HeaderName, HeaderValue, Method};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::handle_panic;
use crate::handlers::{health_check, send_otp_email, AppState};

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/send-otp-email", post(send_otp_email))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// CORS policy for the browser front-end
pub fn cors_layer(origin: &str) -> Result<CorsLayer, header::InvalidHeaderValue> {
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin.parse::<HeaderValue>()?))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-id"),
            HeaderName::from_static("x-client-secret"),
            HeaderName::from_static("x-api-version"),
        ]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_rejects_invalid_origin() {
        assert!(cors_layer("http://localhost:3000").is_ok());
        assert!(cors_layer("bad\norigin").is_err());
    }
}
