//! Google OAuth client for the consent redirect flow, code exchange,
//! token refresh, and userinfo lookup.

use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Scopes needed to manage the shared calendar and identify the caller.
pub const SCOPES: &str = "https://www.googleapis.com/auth/calendar.events \
                          https://www.googleapis.com/auth/calendar.readonly \
                          https://www.googleapis.com/auth/userinfo.profile \
                          https://www.googleapis.com/auth/userinfo.email \
                          openid";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub email: String,
    pub name: Option<String>,
    pub picture: Option<String>,
    pub verified_email: Option<bool>,
}

/// Consent URL the frontend redirects the caller to. Offline access with a
/// forced consent prompt so Google reissues a refresh token.
pub fn consent_url(client_id: &str, redirect_uri: &str) -> String {
    format!(
        "https://accounts.google.com/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(SCOPES)
    )
}

/// Exchange an authorization code for a token set
pub async fn exchange_code_for_token(
    oauth_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse, anyhow::Error> {
    let client = Client::new();
    let params = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("code", code),
        ("redirect_uri", redirect_uri),
        ("grant_type", "authorization_code"),
    ];
    let res = client
        .post(format!("{}/token", oauth_url))
        .form(&params)
        .send()
        .await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        anyhow::bail!("Code exchange failed: {} ({})", status, text);
    }
    Ok(serde_json::from_str(&text)?)
}

/// Trade a refresh token for a new access token
pub async fn refresh_access_token(
    oauth_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenResponse, anyhow::Error> {
    let client = Client::new();
    let params = [
        ("client_id", client_id),
        ("client_secret", client_secret),
        ("refresh_token", refresh_token),
        ("grant_type", "refresh_token"),
    ];
    let res = client
        .post(format!("{}/token", oauth_url))
        .form(&params)
        .send()
        .await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        anyhow::bail!("Token refresh failed: {} ({})", status, text);
    }
    Ok(serde_json::from_str(&text)?)
}

/// Look up the profile of the account the access token belongs to
pub async fn fetch_user_info(
    api_url: &str,
    access_token: &str,
) -> Result<UserInfo, anyhow::Error> {
    let client = Client::new();
    let res = client
        .get(format!("{}/oauth2/v2/userinfo", api_url))
        .bearer_auth(access_token)
        .send()
        .await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        anyhow::bail!("Userinfo fetch failed: {} ({})", status, text);
    }
    Ok(serde_json::from_str(&text)?)
}
