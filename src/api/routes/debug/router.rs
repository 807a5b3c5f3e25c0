//! Router for the debug API

use std::sync::{Arc, RwLock};

use axum::Router;
use axum::extract::State;
use axum::response::Json;
use serde_json::{Value, json};

use crate::api::state::AppState;
use crate::tokens;

type SharedState = Arc<RwLock<AppState>>;

/// Snapshot of the credential storage, in-memory state, and configuration
async fn debug_status_handler(State(state): State<SharedState>) -> Json<Value> {
    let (db, config, shared_calendar) = {
        let shared_state = state.read().unwrap();
        (
            shared_state.db.clone(),
            shared_state.config.clone(),
            Arc::clone(&shared_state.shared_calendar),
        )
    };

    let storage = match tokens::db::load_shared_calendar_tokens(&db).await {
        Ok(stored) => json!({
            "connected": true,
            "hasData": stored.is_some(),
            "userEmail": stored.as_ref().map(|s| s.user_email.clone()),
            "savedAt": stored.as_ref().map(|s| s.saved_at.clone()),
        }),
        Err(err) => json!({
            "connected": false,
            "error": err.to_string(),
        }),
    };

    Json(json!({
        "storage": storage,
        "memory": {
            "hasTokens": shared_calendar.is_configured(),
        },
        "config": {
            "calendarId": config.shared_calendar_id,
            "adminEmails": config.admin_emails,
        },
    }))
}

/// Create the debug router
pub fn router() -> Router<SharedState> {
    Router::new().route("/status", axum::routing::get(debug_status_handler))
}
