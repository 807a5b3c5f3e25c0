//! Session cookie plumbing: the caller's own OAuth token set rides in an
//! opaque cookie, refreshed transparently when it nears expiry.

use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use http::{HeaderValue, header};

use crate::api::public::ApiError;
use crate::booking::policy::{Role, role_for_email};
use crate::core::AppConfig;
use crate::google::oauth::{UserInfo, fetch_user_info};
use crate::tokens::{TokenSet, ensure_fresh};

pub const SESSION_COOKIE: &str = "tokens";
const SESSION_MAX_AGE_SECONDS: i64 = 7 * 24 * 60 * 60;

/// An authenticated caller: verified profile plus their policy role
pub struct Caller {
    pub user: UserInfo,
    pub role: Role,
}

impl Caller {
    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Set-Cookie value carrying a session token set
pub fn session_cookie(tokens: &TokenSet, secure: bool) -> Result<String, serde_json::Error> {
    let value = urlencoding::encode(&serde_json::to_string(tokens)?).into_owned();
    Ok(format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax{}",
        SESSION_COOKIE,
        value,
        SESSION_MAX_AGE_SECONDS,
        if secure { "; Secure" } else { "" }
    ))
}

/// Set-Cookie value that removes the session cookie
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", SESSION_COOKIE)
}

/// Token set from the session cookie, if present and parseable
pub fn session_tokens(jar: &CookieJar) -> Option<TokenSet> {
    let cookie = jar.get(SESSION_COOKIE)?;
    let raw = urlencoding::decode(cookie.value()).ok()?;
    serde_json::from_str(&raw).ok()
}

/// Attach a replacement session cookie to a response, when one was issued
pub fn with_session_cookie(mut response: Response, cookie: Option<String>) -> Response {
    if let Some(cookie) = cookie
        && let Ok(value) = HeaderValue::from_str(&cookie)
    {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

/// Authenticate the caller from their session cookie, refreshing the token
/// set when it nears expiry. Returns the caller plus a replacement cookie
/// when the tokens changed.
pub async fn authenticate(
    jar: &CookieJar,
    config: &AppConfig,
) -> Result<(Caller, Option<String>), ApiError> {
    let tokens = session_tokens(jar).ok_or(ApiError::Unauthenticated)?;

    let fresh = ensure_fresh(config, &tokens)
        .await
        .ok_or(ApiError::Unauthenticated)?;
    let refreshed_cookie = if fresh != tokens {
        Some(session_cookie(&fresh, config.secure_cookies)?)
    } else {
        None
    };

    let user = fetch_user_info(&config.google_api_url, &fresh.access_token)
        .await
        .map_err(|err| {
            tracing::error!("Error getting user info: {}", err);
            ApiError::Unauthenticated
        })?;
    let role = role_for_email(&user.email, &config.admin_emails);

    Ok((Caller { user, role }, refreshed_cookie))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_extra::extract::cookie::Cookie;
    use chrono::{Duration, Utc};

    fn tokens() -> TokenSet {
        TokenSet {
            access_token: "ya29.test".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            expiry: Some(Utc::now() + Duration::hours(1)),
        }
    }

    #[test]
    fn test_session_cookie_round_trip() {
        let tokens = tokens();
        let cookie_value = session_cookie(&tokens, false).unwrap();
        assert!(cookie_value.starts_with("tokens="));
        assert!(cookie_value.contains("HttpOnly"));
        assert!(cookie_value.contains("SameSite=Lax"));
        assert!(!cookie_value.contains("Secure"));

        // Parse the value part back the way a browser would send it
        let value = cookie_value
            .strip_prefix("tokens=")
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, value));
        assert_eq!(session_tokens(&jar), Some(tokens));
    }

    #[test]
    fn test_secure_flag() {
        let cookie_value = session_cookie(&tokens(), true).unwrap();
        assert!(cookie_value.contains("; Secure"));
    }

    #[test]
    fn test_clear_session_cookie() {
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }

    #[test]
    fn test_session_tokens_missing_or_garbled() {
        assert!(session_tokens(&CookieJar::new()).is_none());

        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "not-json"));
        assert!(session_tokens(&jar).is_none());
    }
}
