//! Shared-calendar credential lifecycle: refresh-before-expiry, durable
//! persistence, invalidate-on-failure.

use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::google::oauth::{self, TokenResponse};

pub mod db;

/// Refresh when the access token is within this many minutes of expiry
const REFRESH_THRESHOLD_MINUTES: i64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl TokenSet {
    pub fn from_response(response: TokenResponse) -> Self {
        let expiry = response
            .expires_in
            .map(|seconds| Utc::now() + Duration::seconds(seconds));
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            expiry,
        }
    }
}

/// Refresh a token set when it is near expiry. Returns the (possibly
/// unchanged) token set, or `None` when the credential is unusable: no
/// refresh token, or the provider rejected the refresh. A missing expiry is
/// treated as already expired. Providers don't always reissue refresh
/// tokens, so a missing one in the response keeps the prior token.
pub async fn ensure_fresh(config: &AppConfig, tokens: &TokenSet) -> Option<TokenSet> {
    let Some(refresh_token) = tokens.refresh_token.clone() else {
        tracing::error!("No refresh token available");
        return None;
    };

    let expiry = tokens.expiry.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
    if expiry - Utc::now() > Duration::minutes(REFRESH_THRESHOLD_MINUTES) {
        return Some(tokens.clone());
    }

    tracing::info!("Refreshing expiring access token");
    match oauth::refresh_access_token(
        &config.google_oauth_url,
        &config.google_client_id,
        &config.google_client_secret,
        &refresh_token,
    )
    .await
    {
        Ok(response) => {
            let mut refreshed = TokenSet::from_response(response);
            if refreshed.refresh_token.is_none() {
                refreshed.refresh_token = Some(refresh_token);
            }
            Some(refreshed)
        }
        Err(err) => {
            tracing::error!("Token refresh error: {}", err);
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SharedCredential {
    pub tokens: TokenSet,
    pub user_email: String,
}

/// The one admin-delegated credential every appointment operation borrows
/// to reach the shared calendar. Mutex-guarded; snapshots are cloned out
/// before any await and written back after, so two racing refreshes
/// resolve last-writer-wins.
#[derive(Default)]
pub struct SharedCalendar {
    credential: RwLock<Option<SharedCredential>>,
}

impl SharedCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialize(&self, tokens: TokenSet, user_email: String) {
        *self.credential.write().unwrap() = Some(SharedCredential { tokens, user_email });
    }

    pub fn snapshot(&self) -> Option<SharedCredential> {
        self.credential.read().unwrap().clone()
    }

    pub fn invalidate(&self) {
        *self.credential.write().unwrap() = None;
    }

    pub fn is_configured(&self) -> bool {
        self.credential.read().unwrap().is_some()
    }

    /// A fresh access token for the shared calendar, or `None` when no
    /// usable credential exists (the admin must re-authenticate). A
    /// refreshed credential is written back and persisted best-effort;
    /// a failed refresh clears the credential.
    pub async fn access_token(&self, config: &AppConfig, db: &Connection) -> Option<String> {
        let current = self.snapshot()?;

        match ensure_fresh(config, &current.tokens).await {
            Some(fresh) => {
                if fresh != current.tokens {
                    self.initialize(fresh.clone(), current.user_email.clone());
                    if let Err(err) =
                        db::save_shared_calendar_tokens(db, &fresh, &current.user_email).await
                    {
                        tracing::warn!("Could not save refreshed tokens: {}", err);
                    }
                }
                Some(fresh.access_token)
            }
            None => {
                tracing::error!("Shared calendar tokens invalid. Admin must re-authenticate.");
                self.invalidate();
                None
            }
        }
    }
}

/// Load the persisted shared credential at startup, refreshing it if
/// needed. Returns true when the shared calendar is ready; absence of a
/// stored credential is the "admin not yet authenticated" steady state.
pub async fn load_shared_calendar(
    config: &AppConfig,
    db: &Connection,
    shared: &SharedCalendar,
) -> bool {
    let stored = match db::load_shared_calendar_tokens(db).await {
        Ok(Some(stored)) => stored,
        Ok(None) => {
            tracing::warn!("No tokens found in database");
            return false;
        }
        Err(err) => {
            tracing::error!("Error loading tokens: {}", err);
            return false;
        }
    };

    tracing::info!("Loading tokens for {}", stored.user_email);
    match ensure_fresh(config, &stored.tokens).await {
        Some(fresh) => {
            if fresh != stored.tokens {
                if let Err(err) =
                    db::save_shared_calendar_tokens(db, &fresh, &stored.user_email).await
                {
                    tracing::warn!("Could not save refreshed tokens: {}", err);
                }
            }
            shared.initialize(fresh, stored.user_email.clone());
            tracing::info!("Shared calendar loaded (Admin: {})", stored.user_email);
            true
        }
        None => {
            tracing::error!("Token refresh failed. Admin needs to re-authenticate.");
            false
        }
    }
}
