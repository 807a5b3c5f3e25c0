use std::path::Path;

use anyhow::Result;
use tokio_rusqlite::Connection;

/// Open the SQLite database inside the storage directory.
pub async fn async_db(db_path: &str) -> Result<Connection> {
    let file = Path::new(db_path).join("dentcal.db3");
    let conn = Connection::open(file).await?;
    Ok(conn)
}

/// Create the schema if it doesn't exist. Safe to run repeatedly.
pub fn initialize_db(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS calendar_tokens (
             type TEXT PRIMARY KEY,
             tokens TEXT NOT NULL,
             user_email TEXT NOT NULL,
             saved_at TEXT NOT NULL,
             updated_at TEXT NOT NULL
         )",
        [],
    )?;
    Ok(())
}
