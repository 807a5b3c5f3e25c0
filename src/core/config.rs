use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: String,
    pub client_origin: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub google_api_url: String,
    pub google_oauth_url: String,
    pub shared_calendar_id: String,
    pub admin_emails: Vec<String>,
    pub secure_cookies: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("DENTCAL_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path);
        let client_origin = env::var("DENTCAL_CLIENT_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:5173".to_string());
        let google_client_id =
            env::var("DENTCAL_GOOGLE_CLIENT_ID").expect("Missing DENTCAL_GOOGLE_CLIENT_ID");
        let google_client_secret = env::var("DENTCAL_GOOGLE_CLIENT_SECRET")
            .expect("Missing DENTCAL_GOOGLE_CLIENT_SECRET");
        let google_redirect_uri = env::var("DENTCAL_GOOGLE_REDIRECT_URI")
            .unwrap_or_else(|_| "http://localhost:4000/oauth2callback".to_string());
        let google_api_url = env::var("DENTCAL_GOOGLE_API_URL")
            .unwrap_or_else(|_| "https://www.googleapis.com".to_string());
        let google_oauth_url = env::var("DENTCAL_GOOGLE_OAUTH_URL")
            .unwrap_or_else(|_| "https://oauth2.googleapis.com".to_string());
        let shared_calendar_id =
            env::var("DENTCAL_SHARED_CALENDAR_ID").expect("Missing DENTCAL_SHARED_CALENDAR_ID");
        let admin_emails = env::var("DENTCAL_ADMIN_EMAILS")
            .expect("Missing DENTCAL_ADMIN_EMAILS")
            .split(',')
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .collect();
        let secure_cookies = env::var("DENTCAL_ENV")
            .map(|e| e == "production")
            .unwrap_or(false);

        Self {
            db_path,
            client_origin,
            google_client_id,
            google_client_secret,
            google_redirect_uri,
            google_api_url,
            google_oauth_url,
            shared_calendar_id,
            admin_emails,
            secure_cookies,
        }
    }
}
