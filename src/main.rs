// Gateway API server entry point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gateway_api::config::ApiConfig;
use gateway_api::db::DbPool;
use gateway_api::routes::{cors_layer, create_router};
use gateway_api::services::health::HealthAggregator;
use gateway_api::services::mail::SmtpMailer;
use gateway_api::services::otp::{OtpService, RandomOtpGenerator};
use gateway_api::AppServices;

fn load_env() {
    dotenv::dotenv().ok();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env();
    // Configure logging with tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load API configuration from environment
    let config = ApiConfig::from_env();
    tracing::info!("Configuration loaded");

    // Shared database pool; connections are opened on first use
    let db_pool = DbPool::new(&config).await?;

    let health = HealthAggregator::from_config(&config.health, db_pool.connection())?;
    let mailer = SmtpMailer::new(&config.mail, &config.otp)?;
    let otp = OtpService::new(
        Arc::new(RandomOtpGenerator::new(config.otp.length)),
        Arc::new(mailer),
    );
    let app_state = Arc::new(AppServices { health, otp });

    let app = create_router(app_state)
        .layer(cors_layer(&config.cors_origin)?)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http());

    // Parse server address from config
    let addr: SocketAddr = config.server_addr().parse()?;

    // Start HTTP server
    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
