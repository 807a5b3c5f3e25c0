use std::sync::Arc;

use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::tokens::SharedCalendar;

pub struct AppState {
    pub db: Connection,
    pub config: AppConfig,
    // The one admin-delegated credential, shared by every request
    pub shared_calendar: Arc<SharedCalendar>,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig) -> Self {
        Self {
            db,
            config,
            shared_calendar: Arc::new(SharedCalendar::new()),
        }
    }
}
