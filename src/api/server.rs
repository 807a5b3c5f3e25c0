use std::sync::{Arc, RwLock};

use axum::Router;
use http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use super::routes;
use crate::api::state::AppState;
use crate::core::{AppConfig, db::async_db, db::initialize_db};
use crate::tokens;

pub fn app(shared_state: Arc<RwLock<AppState>>) -> Router {
    let client_origin = shared_state.read().unwrap().config.client_origin.clone();

    // Cookies ride along, so the origin must be explicit rather than a
    // wildcard
    let cors = CorsLayer::new()
        .allow_origin(
            client_origin
                .parse::<HeaderValue>()
                .expect("Invalid client origin"),
        )
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        // API routes
        .nest("/api", routes::router())
        // OAuth login flow at the root, where the provider redirects
        .nest("/auth", routes::auth::router())
        .route(
            "/oauth2callback",
            axum::routing::get(routes::auth::oauth2callback_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&shared_state))
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // axum logs rejections from built-in extractors with the `axum::rejection`
                // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
                format! {
                    "{}=debug,tower_http=debug,axum::rejection=trace",
                    env!("CARGO_CRATE_NAME")
                }
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db = async_db(&config.db_path)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await
    .expect("Failed to initialize db");

    let app_state = AppState::new(db.clone(), config.clone());

    // Pick up the shared credential persisted by a previous run
    if tokens::load_shared_calendar(&config, &db, &app_state.shared_calendar).await {
        tracing::info!("Shared calendar ready");
    } else {
        tracing::warn!(
            "Admin login required. Admins: {}",
            config.admin_emails.join(", ")
        );
    }

    let shared_state = Arc::new(RwLock::new(app_state));
    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .unwrap();

    tracing::debug!(
        "Server started. Listening on {}",
        listener.local_addr().unwrap()
    );

    axum::serve(listener, app).await.unwrap();
}
