//! Public types for the calendar status API
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarStatusResponse {
    pub shared_calendar_configured: bool,
    pub shared_calendar_id: String,
    pub admin_emails: Vec<String>,
    pub message: String,
}
