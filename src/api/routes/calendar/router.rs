//! Router for the shared calendar readiness API

use std::sync::{Arc, RwLock};

use axum::Router;
use axum::extract::State;
use axum::response::Json;

use super::public;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// Whether the shared calendar credential is ready for use. Unauthenticated
/// on purpose: the frontend polls it before offering login.
async fn calendar_status_handler(
    State(state): State<SharedState>,
) -> Json<public::CalendarStatusResponse> {
    let (configured, shared_calendar_id, admin_emails) = {
        let shared_state = state.read().unwrap();
        (
            shared_state.shared_calendar.is_configured(),
            shared_state.config.shared_calendar_id.clone(),
            shared_state.config.admin_emails.clone(),
        )
    };

    let message = if configured {
        "Shared calendar is ready"
    } else {
        "Admin needs to authenticate first"
    };

    Json(public::CalendarStatusResponse {
        shared_calendar_configured: configured,
        shared_calendar_id,
        admin_emails,
        message: message.to_string(),
    })
}

/// Create the calendar router
pub fn router() -> Router<SharedState> {
    Router::new().route("/status", axum::routing::get(calendar_status_handler))
}
