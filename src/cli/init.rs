use anyhow::Result;
use std::fs;

use crate::core::db::{async_db, initialize_db};

pub async fn run(db_path: &str) -> Result<()> {
    fs::create_dir_all(db_path)?;

    let db = async_db(db_path).await?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;

    println!("Database initialized at {}", db_path);
    Ok(())
}
