//! Public API types and the error taxonomy

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Admin access required")]
    Forbidden,
    #[error("{error}: {message}")]
    SharedCalendarUnavailable { error: String, message: String },
    #[error("Appointment not found")]
    NotFound,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

impl ApiError {
    pub fn shared_calendar(error: &str, message: &str) -> Self {
        ApiError::SharedCalendarUnavailable {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

/// Convert `ApiError` into an Axum compatible response with a structured
/// JSON body. Every error is logged before it leaves the handler.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);

        let (status, body) = match &self {
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                json!({"error": "Not authenticated"}),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                json!({"error": "Admin access required"}),
            ),
            ApiError::SharedCalendarUnavailable { error, message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({"error": error, "message": message}),
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                json!({"error": "Appointment not found"}),
            ),
            ApiError::Validation(message) => (StatusCode::BAD_REQUEST, json!({"error": message})),
            ApiError::Provider(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": err.to_string()}),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<tokio_rusqlite::Error> for ApiError {
    fn from(err: tokio_rusqlite::Error) -> Self {
        ApiError::Provider(err.into())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Provider(err.into())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Provider(err.into())
    }
}

// Re-export public types from each route

pub mod appointments {
    pub use crate::api::routes::appointments::public::*;
}

pub mod auth {
    pub use crate::api::routes::auth::public::*;
}

pub mod calendar {
    pub use crate::api::routes::calendar::public::*;
}
