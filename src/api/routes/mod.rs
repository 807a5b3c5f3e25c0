//! API routes module

pub mod appointments;
pub mod auth;
pub mod calendar;
mod debug;

use std::sync::{Arc, RwLock};

use axum::Router;

use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

/// Create the combined API router, mounted at `/api`
pub fn router() -> Router<SharedState> {
    Router::new()
        // Appointment routes
        .nest("/appointments", appointments::router())
        // Shared calendar readiness
        .nest("/calendar", calendar::router())
        // Diagnostics
        .nest("/debug", debug::router())
        // Current caller
        .route("/me", axum::routing::get(auth::me_handler))
}
