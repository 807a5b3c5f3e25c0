use anyhow::Result;
use std::env;
use std::io::{self, Write};

use crate::core::db::async_db;
use crate::google::oauth::{consent_url, exchange_code_for_token};
use crate::tokens::{TokenSet, db::save_shared_calendar_tokens};

/// Console OAuth bootstrap: authenticate an admin account and seed the
/// shared calendar credential without going through the web flow.
pub async fn run(db_path: &str) -> Result<()> {
    // Prompt the user for the admin email address
    print!("Enter the admin email address you are authenticating: ");
    io::stdout().flush().unwrap();
    let mut user_email = String::new();
    io::stdin()
        .read_line(&mut user_email)
        .expect("Failed to read email address");
    let user_email = user_email.trim().to_owned();

    let client_id =
        env::var("DENTCAL_GOOGLE_CLIENT_ID").expect("Set DENTCAL_GOOGLE_CLIENT_ID in your environment");
    let client_secret = env::var("DENTCAL_GOOGLE_CLIENT_SECRET")
        .expect("Set DENTCAL_GOOGLE_CLIENT_SECRET in your environment");
    let redirect_uri = env::var("DENTCAL_GOOGLE_REDIRECT_URI")
        .unwrap_or_else(|_| "urn:ietf:wg:oauth:2.0:oob".to_string());
    let oauth_url = env::var("DENTCAL_GOOGLE_OAUTH_URL")
        .unwrap_or_else(|_| "https://oauth2.googleapis.com".to_string());

    let auth_url = consent_url(&client_id, &redirect_uri);
    println!(
        "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
        auth_url
    );
    print!("Paste the authorization code shown by Google here: ");
    io::stdout().flush().unwrap();
    let mut code = String::new();
    io::stdin()
        .read_line(&mut code)
        .expect("Failed to read code");
    let code = code.trim();

    let token_response =
        exchange_code_for_token(&oauth_url, &client_id, &client_secret, code, &redirect_uri)
            .await?;
    let token_set = TokenSet::from_response(token_response);

    // Store the shared credential so the server picks it up at startup
    let db = async_db(db_path).await.expect("Failed to connect to db");
    save_shared_calendar_tokens(&db, &token_set, &user_email).await?;
    println!("Shared calendar credential for {} saved to DB.", user_email);

    Ok(())
}
