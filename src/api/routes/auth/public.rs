//! Public types for the auth API
use serde::{Deserialize, Serialize};

use crate::booking::policy::Role;

#[derive(Serialize, Deserialize)]
pub struct AuthUrlResponse {
    pub url: String,
}

#[derive(Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct SessionUser {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub role: Role,
}

#[derive(Serialize, Deserialize)]
pub struct MeResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

#[derive(Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}
