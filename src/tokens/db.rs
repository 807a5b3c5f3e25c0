//! Durable storage for the shared-calendar credential. A single row keyed
//! by a fixed type discriminator, so concurrent saves collapse to one row.

use anyhow::{Error, Result};
use chrono::Utc;
use tokio_rusqlite::Connection;

use super::TokenSet;

#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub tokens: TokenSet,
    pub user_email: String,
    pub saved_at: String,
}

pub async fn load_shared_calendar_tokens(
    db: &Connection,
) -> Result<Option<StoredCredential>, Error> {
    let row: Option<(String, String, String)> = db
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT tokens, user_email, saved_at FROM calendar_tokens
                 WHERE type = 'shared_calendar'",
            )?;
            let mut rows = stmt.query_map([], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?))
            })?;
            Ok(rows.next().transpose()?)
        })
        .await?;

    match row {
        Some((tokens_json, user_email, saved_at)) => {
            let tokens = serde_json::from_str(&tokens_json)?;
            Ok(Some(StoredCredential {
                tokens,
                user_email,
                saved_at,
            }))
        }
        None => Ok(None),
    }
}

/// Upsert the one shared-credential row
pub async fn save_shared_calendar_tokens(
    db: &Connection,
    tokens: &TokenSet,
    user_email: &str,
) -> Result<(), Error> {
    let tokens_json = serde_json::to_string(tokens)?;
    let user_email = user_email.to_owned();
    let now = Utc::now().to_rfc3339();

    db.call(move |conn| {
        conn.execute(
            "INSERT INTO calendar_tokens (type, tokens, user_email, saved_at, updated_at)
             VALUES ('shared_calendar', ?1, ?2, ?3, ?3)
             ON CONFLICT(type) DO UPDATE SET
                 tokens = excluded.tokens,
                 user_email = excluded.user_email,
                 saved_at = excluded.saved_at,
                 updated_at = excluded.updated_at",
            (&tokens_json, &user_email, &now),
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}
