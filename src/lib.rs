// Gateway API: composite dependency health checks and OTP email issuance

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod services;

pub use handlers::{AppServices, AppState};
pub use routes::create_router;
