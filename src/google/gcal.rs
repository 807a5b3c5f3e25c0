//! Google Calendar API client for the shared clinic calendar

use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendarApiError {
    #[error("Event not found")]
    NotFound,
    #[error("Calendar access denied: {0}")]
    AccessDenied(String),
    #[error("Calendar API error: {status} ({body})")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Event start/end from the Calendar API. Timed events carry `dateTime`,
/// all-day events carry `date` only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDateTime {
    #[serde(rename = "dateTime", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventAttendee {
    pub email: String,
    #[serde(rename = "displayName", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventReminderOverride {
    pub method: String,
    pub minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventReminders {
    #[serde(rename = "useDefault")]
    pub use_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overrides: Option<Vec<EventReminderOverride>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<EventAttendee>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminders: Option<EventReminders>,
}

#[derive(Debug, Deserialize)]
pub struct ListEventsResponse {
    pub items: Option<Vec<CalendarEvent>>,
}

fn events_url(api_url: &str, calendar_id: &str) -> String {
    format!(
        "{}/calendar/v3/calendars/{}/events",
        api_url,
        urlencoding::encode(calendar_id)
    )
}

async fn read_success(res: reqwest::Response) -> Result<String, CalendarApiError> {
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if status.is_success() {
        return Ok(text);
    }
    match status.as_u16() {
        404 => Err(CalendarApiError::NotFound),
        401 | 403 => Err(CalendarApiError::AccessDenied(text)),
        _ => Err(CalendarApiError::Api { status, body: text }),
    }
}

/// List events in a time window, expanded to single instances and ordered
/// by start time
pub async fn list_events(
    api_url: &str,
    access_token: &str,
    calendar_id: &str,
    time_min: DateTime<Utc>,
    time_max: DateTime<Utc>,
    max_results: Option<u32>,
) -> Result<Vec<CalendarEvent>, CalendarApiError> {
    let client = Client::new();
    let mut query = vec![
        ("timeMin".to_string(), time_min.to_rfc3339()),
        ("timeMax".to_string(), time_max.to_rfc3339()),
        ("singleEvents".to_string(), "true".to_string()),
        ("orderBy".to_string(), "startTime".to_string()),
    ];
    if let Some(max) = max_results {
        query.push(("maxResults".to_string(), max.to_string()));
    }
    let res = client
        .get(events_url(api_url, calendar_id))
        .query(&query)
        .bearer_auth(access_token)
        .send()
        .await?;
    let text = read_success(res).await?;
    let parsed: ListEventsResponse = serde_json::from_str(&text).map_err(|err| {
        CalendarApiError::Api {
            status: reqwest::StatusCode::OK,
            body: format!("Unparseable list response: {}", err),
        }
    })?;
    Ok(parsed.items.unwrap_or_default())
}

/// Fetch a single event by id
pub async fn get_event(
    api_url: &str,
    access_token: &str,
    calendar_id: &str,
    event_id: &str,
) -> Result<CalendarEvent, CalendarApiError> {
    let client = Client::new();
    let url = format!(
        "{}/{}",
        events_url(api_url, calendar_id),
        urlencoding::encode(event_id)
    );
    let res = client.get(url).bearer_auth(access_token).send().await?;
    let text = read_success(res).await?;
    serde_json::from_str(&text).map_err(|err| CalendarApiError::Api {
        status: reqwest::StatusCode::OK,
        body: format!("Unparseable event response: {}", err),
    })
}

/// Insert a new event, notifying attendees
pub async fn insert_event(
    api_url: &str,
    access_token: &str,
    calendar_id: &str,
    event: &CalendarEvent,
) -> Result<CalendarEvent, CalendarApiError> {
    let client = Client::new();
    let res = client
        .post(events_url(api_url, calendar_id))
        .query(&[("sendUpdates", "all")])
        .bearer_auth(access_token)
        .json(event)
        .send()
        .await?;
    let text = read_success(res).await?;
    serde_json::from_str(&text).map_err(|err| CalendarApiError::Api {
        status: reqwest::StatusCode::OK,
        body: format!("Unparseable event response: {}", err),
    })
}

/// Replace an existing event, notifying attendees
pub async fn update_event(
    api_url: &str,
    access_token: &str,
    calendar_id: &str,
    event_id: &str,
    event: &CalendarEvent,
) -> Result<CalendarEvent, CalendarApiError> {
    let client = Client::new();
    let url = format!(
        "{}/{}",
        events_url(api_url, calendar_id),
        urlencoding::encode(event_id)
    );
    let res = client
        .put(url)
        .query(&[("sendUpdates", "all")])
        .bearer_auth(access_token)
        .json(event)
        .send()
        .await?;
    let text = read_success(res).await?;
    serde_json::from_str(&text).map_err(|err| CalendarApiError::Api {
        status: reqwest::StatusCode::OK,
        body: format!("Unparseable event response: {}", err),
    })
}

/// Delete an event outright, notifying attendees
pub async fn delete_event(
    api_url: &str,
    access_token: &str,
    calendar_id: &str,
    event_id: &str,
) -> Result<(), CalendarApiError> {
    let client = Client::new();
    let url = format!(
        "{}/{}",
        events_url(api_url, calendar_id),
        urlencoding::encode(event_id)
    );
    let res = client
        .delete(url)
        .query(&[("sendUpdates", "all")])
        .bearer_auth(access_token)
        .send()
        .await?;
    read_success(res).await?;
    Ok(())
}
