use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use gateway_api::config::{ApiConfig, DbMode};
use gateway_api::services::health::{
    ConnectorManagerProbe, HealthAggregator, RelationalProbe, ScyllaConnector, SearchEngineProbe,
    WideColumnProbe,
};
use gateway_api::services::mail::{MailError, Mailer};
use gateway_api::services::otp::{OtpError, OtpGenerator, OtpService};
use gateway_api::{create_router, AppServices};
use sea_orm::{DatabaseBackend, MockDatabase};
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Default)]
struct CountingGenerator {
    calls: AtomicUsize,
}

impl OtpGenerator for CountingGenerator {
    fn generate(&self, _email: &str) -> Result<String, OtpError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{:06}", 100_000 + n))
    }
}

struct FailingGenerator;

impl OtpGenerator for FailingGenerator {
    fn generate(&self, _email: &str) -> Result<String, OtpError> {
        Err(OtpError::Generation("entropy source unavailable".to_string()))
    }
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, String, String)>>,
    fail_with: Option<String>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_otp(&self, email: &str, name: &str, code: &str) -> Result<(), MailError> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), name.to_string(), code.to_string()));
        match &self.fail_with {
            Some(message) => Err(MailError::Rejected(message.clone())),
            None => Ok(()),
        }
    }
}

/// Health wiring is irrelevant here; point everything at unused local ports
fn idle_health() -> HealthAggregator {
    let config = ApiConfig::from_lookup(|_| None);
    let client = reqwest::Client::new();
    HealthAggregator::new(
        Arc::new(RelationalProbe::new(
            Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection()),
            DbMode::Local,
        )),
        Arc::new(ConnectorManagerProbe::new(client.clone(), "http://127.0.0.1:1")),
        Arc::new(WideColumnProbe::new(ScyllaConnector::from_config(&config.health))),
        Arc::new(SearchEngineProbe::new(client, "http://127.0.0.1:1")),
        Duration::from_secs(1),
    )
}

fn app(generator: Arc<dyn OtpGenerator>, mailer: Arc<dyn Mailer>) -> Router {
    let otp = OtpService::new(generator, mailer);
    create_router(Arc::new(AppServices {
        health: idle_health(),
        otp,
    }))
}

async fn post_otp(app: Router, body: &str) -> (StatusCode, Value) {
    let request = Request::post("/api/send-otp-email")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_missing_email_is_rejected_without_side_effects() {
    let generator = Arc::new(CountingGenerator::default());
    let mailer = Arc::new(RecordingMailer::default());

    let (status, body) = post_otp(app(generator.clone(), mailer.clone()), "{}").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Email required" }));
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_and_malformed_bodies_count_as_missing_email() {
    for raw in [r#"{"email": ""}"#, r#"{"email": null}"#, "not json"] {
        let generator = Arc::new(CountingGenerator::default());
        let mailer = Arc::new(RecordingMailer::default());

        let (status, _) = post_otp(app(generator.clone(), mailer.clone()), raw).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", raw);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn test_successful_dispatch() {
    let generator = Arc::new(CountingGenerator::default());
    let mailer = Arc::new(RecordingMailer::default());

    let (status, body) = post_otp(
        app(generator.clone(), mailer.clone()),
        r#"{"email": "alice@example.com"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "success": true, "message": "OTP sent to alice@example.com" })
    );
    let sent = mailer.sent.lock().unwrap();
    assert_eq!(
        *sent,
        vec![(
            "alice@example.com".to_string(),
            "User".to_string(),
            "100000".to_string()
        )]
    );
}

#[tokio::test]
async fn test_mail_failure_is_reported_with_its_message() {
    let generator = Arc::new(CountingGenerator::default());
    let mailer = Arc::new(RecordingMailer {
        fail_with: Some("550 mailbox unavailable".to_string()),
        ..Default::default()
    });

    let (status, body) = post_otp(
        app(generator, mailer),
        r#"{"email": "bob@example.com"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "success": false, "message": "550 mailbox unavailable" })
    );
}

#[tokio::test]
async fn test_generation_failure_skips_delivery() {
    let mailer = Arc::new(RecordingMailer::default());

    let (status, body) = post_otp(
        app(Arc::new(FailingGenerator), mailer.clone()),
        r#"{"email": "carol@example.com"}"#,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "entropy source unavailable");
    assert_eq!(body["success"], false);
    assert!(mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_repeated_requests_issue_independent_codes() {
    let generator = Arc::new(CountingGenerator::default());
    let mailer = Arc::new(RecordingMailer::default());
    let router = app(generator.clone(), mailer.clone());

    for _ in 0..2 {
        let (status, _) = post_otp(router.clone(), r#"{"email": "dave@example.com"}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 2);
    assert_ne!(sent[0].2, sent[1].2);
    assert_eq!(generator.calls.load(Ordering::SeqCst), 2);
}
