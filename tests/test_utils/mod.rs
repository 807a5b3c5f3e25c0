//! Test utilities for integration tests
use std::env;
use std::fs;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use axum::Router;
use chrono::{Duration, Utc};

use dentcal::api::AppState;
use dentcal::api::app;
use dentcal::core::AppConfig;
use dentcal::core::db::{async_db, initialize_db};
use dentcal::tokens::TokenSet;

/// Creates a test application router with a temporary database, pointing
/// every Google client at `google_url` (a mockito server). The state handle
/// is returned too so tests can seed or inspect the shared credential.
pub async fn test_app(google_url: &str) -> (Router, Arc<RwLock<AppState>>) {
    // Unique directory per test to avoid collisions
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
        .to_string();
    let db_path = env::temp_dir().join(format!("dentcal-test-{}", ts));
    fs::create_dir_all(&db_path).expect("Failed to create db directory");

    let db = async_db(db_path.to_str().unwrap())
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await
    .unwrap();

    let app_config = AppConfig {
        db_path: db_path.display().to_string(),
        client_origin: String::from("http://localhost:5173"),
        google_client_id: String::from("test_client_id"),
        google_client_secret: String::from("test_client_secret"),
        google_redirect_uri: String::from("http://localhost:4000/oauth2callback"),
        google_api_url: google_url.to_string(),
        google_oauth_url: google_url.to_string(),
        shared_calendar_id: String::from("shared-cal"),
        admin_emails: vec![String::from("admin@dentalclinic.com")],
        secure_cookies: false,
    };
    let app_state = AppState::new(db, app_config);
    let shared_state = Arc::new(RwLock::new(app_state));
    (app(Arc::clone(&shared_state)), shared_state)
}

/// A token set that won't need a refresh for the duration of a test
pub fn fresh_tokens() -> TokenSet {
    TokenSet {
        access_token: "ya29.fresh".to_string(),
        refresh_token: Some("1//refresh".to_string()),
        expiry: Some(Utc::now() + Duration::hours(1)),
    }
}

/// A token set past its expiry, forcing a refresh exchange on first use
pub fn expired_tokens() -> TokenSet {
    TokenSet {
        access_token: "ya29.stale".to_string(),
        refresh_token: Some("1//refresh".to_string()),
        expiry: Some(Utc::now() - Duration::hours(1)),
    }
}

/// Cookie header value for a signed-in caller
pub fn session_cookie_value() -> String {
    format!(
        "tokens={}",
        urlencoding::encode(&serde_json::to_string(&fresh_tokens()).unwrap())
    )
}

/// Seed the shared calendar credential the way an admin login would
pub fn seed_shared_calendar(state: &Arc<RwLock<AppState>>, tokens: TokenSet) {
    state
        .read()
        .unwrap()
        .shared_calendar
        .initialize(tokens, "admin@dentalclinic.com".to_string());
}

/// Mock the userinfo endpoint so session authentication resolves to `email`
pub async fn mock_userinfo(server: &mut mockito::ServerGuard, email: &str) -> mockito::Mock {
    server
        .mock("GET", "/oauth2/v2/userinfo")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(
            r#"{{"email": "{}", "name": "Test Caller", "verified_email": true}}"#,
            email
        ))
        .create_async()
        .await
}
