//! Router for the OAuth login flow and session endpoints

use std::sync::{Arc, RwLock};

use anyhow::anyhow;
use axum::Router;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use http::{StatusCode, header};

use super::public;
use crate::api::session::{authenticate, clear_session_cookie, session_cookie, with_session_cookie};
use crate::api::state::AppState;
use crate::booking::policy::{Role, role_for_email};
use crate::core::AppConfig;
use crate::google::oauth::{consent_url, exchange_code_for_token, fetch_user_info};
use crate::tokens::{self, TokenSet};

type SharedState = Arc<RwLock<AppState>>;

/// Consent URL the frontend sends the caller to
async fn auth_url_handler(State(state): State<SharedState>) -> Json<public::AuthUrlResponse> {
    let (client_id, redirect_uri) = {
        let shared_state = state.read().unwrap();
        let AppConfig {
            google_client_id,
            google_redirect_uri,
            ..
        } = &shared_state.config;
        (google_client_id.clone(), google_redirect_uri.clone())
    };

    Json(public::AuthUrlResponse {
        url: consent_url(&client_id, &redirect_uri),
    })
}

/// Exchange the authorization code, set the session cookie, and seed the
/// shared calendar credential when the caller is an admin.
pub async fn oauth2callback_handler(
    State(state): State<SharedState>,
    Query(params): Query<public::CallbackQuery>,
) -> Response {
    match handle_callback(&state, params).await {
        Ok(response) => response,
        Err(err) => {
            tracing::error!("OAuth error: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed").into_response()
        }
    }
}

async fn handle_callback(
    state: &SharedState,
    params: public::CallbackQuery,
) -> Result<Response, anyhow::Error> {
    let code = params.code.ok_or_else(|| anyhow!("No code provided"))?;

    let (db, config, shared_calendar) = {
        let shared_state = state.read().unwrap();
        (
            shared_state.db.clone(),
            shared_state.config.clone(),
            Arc::clone(&shared_state.shared_calendar),
        )
    };

    let token_response = exchange_code_for_token(
        &config.google_oauth_url,
        &config.google_client_id,
        &config.google_client_secret,
        &code,
        &config.google_redirect_uri,
    )
    .await?;
    let token_set = TokenSet::from_response(token_response);

    let user = fetch_user_info(&config.google_api_url, &token_set.access_token).await?;
    let role = role_for_email(&user.email, &config.admin_emails);
    tracing::info!("User: {} ({:?})", user.email, role);

    // An admin login (re)establishes the shared calendar credential
    if role == Role::Admin {
        tracing::info!("Initializing shared calendar");
        shared_calendar.initialize(token_set.clone(), user.email.clone());
        if let Err(err) =
            tokens::db::save_shared_calendar_tokens(&db, &token_set, &user.email).await
        {
            tracing::error!("Error saving tokens: {}", err);
        } else {
            tracing::info!("Shared calendar initialized and saved");
        }
    }

    let cookie = session_cookie(&token_set, config.secure_cookies)?;
    let redirect = format!("{}/?auth=success", config.client_origin);
    Ok(with_session_cookie(
        Redirect::to(&redirect).into_response(),
        Some(cookie),
    ))
}

/// Clear the session cookie
async fn logout_handler() -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(public::LogoutResponse { success: true }),
    )
}

/// Who the caller is. Never a 401: an unusable session answers
/// `{authenticated: false}` so the frontend can show the login screen.
pub async fn me_handler(State(state): State<SharedState>, jar: CookieJar) -> Response {
    let config = state.read().unwrap().config.clone();

    match authenticate(&jar, &config).await {
        Ok((caller, refreshed_cookie)) => {
            let body = public::MeResponse {
                authenticated: true,
                user: Some(public::SessionUser {
                    email: caller.user.email.clone(),
                    name: caller.user.name.clone(),
                    picture: caller.user.picture.clone(),
                    role: caller.role,
                }),
            };
            with_session_cookie(Json(body).into_response(), refreshed_cookie)
        }
        Err(_) => Json(public::MeResponse {
            authenticated: false,
            user: None,
        })
        .into_response(),
    }
}

/// Create the auth router, mounted at `/auth`
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/url", axum::routing::get(auth_url_handler))
        .route("/logout", axum::routing::post(logout_handler))
}
