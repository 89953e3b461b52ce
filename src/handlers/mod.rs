// Handlers Module
// This module contains the API endpoint handlers

pub mod health;
pub mod otp;

use std::sync::Arc;

use crate::services::health::HealthAggregator;
use crate::services::otp::OtpService;

pub use health::health_check;
pub use otp::send_otp_email;

/// Services shared by every handler
pub struct AppServices {
    pub health: HealthAggregator,
    pub otp: OtpService,
}

// Type alias for the application state
pub type AppState = Arc<AppServices>;
