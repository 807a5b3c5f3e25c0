//! Router for the appointments API: list, create, status updates, delete,
//! and slot availability, all backed by the shared calendar.

use std::sync::{Arc, RwLock};

use axum::Router;
use axum::extract::{Path, State};
use axum::response::Json;
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use tokio_rusqlite::Connection;

use super::public;
use crate::api::public::ApiError;
use crate::api::session::authenticate;
use crate::api::state::AppState;
use crate::booking::codec::{Appointment, decode, encode, is_appointment};
use crate::booking::policy::{creation_status, visible_appointments};
use crate::booking::slots::{SLOT_TIMES, available_slots, booked_slots};
use crate::booking::status::{AppointmentStatus, apply_status};
use crate::booking::clinic_to_utc;
use crate::core::AppConfig;
use crate::google::gcal::{self, CalendarApiError};
use crate::tokens::SharedCalendar;

type SharedState = Arc<RwLock<AppState>>;

/// Listing window around today
const LIST_DAYS_PAST: i64 = 30;
const LIST_DAYS_AHEAD: i64 = 90;
const LIST_MAX_RESULTS: u32 = 100;

fn request_context(state: &SharedState) -> (Connection, AppConfig, Arc<SharedCalendar>) {
    let shared_state = state.read().unwrap();
    (
        shared_state.db.clone(),
        shared_state.config.clone(),
        Arc::clone(&shared_state.shared_calendar),
    )
}

async fn shared_access_token(
    shared_calendar: &SharedCalendar,
    config: &AppConfig,
    db: &Connection,
    error: &str,
    message: &str,
) -> Result<String, ApiError> {
    shared_calendar
        .access_token(config, db)
        .await
        .ok_or_else(|| ApiError::shared_calendar(error, message))
}

async fn list_appointments_handler(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<Json<public::AppointmentsResponse>, ApiError> {
    let (db, config, shared_calendar) = request_context(&state);
    let (caller, _) = authenticate(&jar, &config).await?;

    let access_token = shared_access_token(
        &shared_calendar,
        &config,
        &db,
        "Shared calendar not available",
        "Please ensure an admin has authenticated to enable shared calendar access",
    )
    .await?;

    let now = Utc::now();
    let events = gcal::list_events(
        &config.google_api_url,
        &access_token,
        &config.shared_calendar_id,
        now - Duration::days(LIST_DAYS_PAST),
        now + Duration::days(LIST_DAYS_AHEAD),
        Some(LIST_MAX_RESULTS),
    )
    .await
    .map_err(|err| match err {
        CalendarApiError::AccessDenied(_) => ApiError::shared_calendar(
            "Shared calendar access denied",
            "An admin needs to authenticate first",
        ),
        err => ApiError::Provider(err.into()),
    })?;

    let appointments: Vec<Appointment> = events
        .iter()
        .filter(|event| is_appointment(event))
        .filter_map(decode)
        .collect();
    let appointments = visible_appointments(appointments, caller.role, caller.email());

    Ok(Json(public::AppointmentsResponse { appointments }))
}

async fn create_appointment_handler(
    State(state): State<SharedState>,
    jar: CookieJar,
    Json(body): Json<public::CreateAppointmentRequest>,
) -> Result<Json<public::CreateAppointmentResponse>, ApiError> {
    let (db, config, shared_calendar) = request_context(&state);
    let (caller, _) = authenticate(&jar, &config).await?;

    let access_token = shared_access_token(
        &shared_calendar,
        &config,
        &db,
        "Cannot create appointment",
        "Shared calendar not available. Please contact an administrator.",
    )
    .await?;

    // The booking caller is always the authenticated account, never a
    // client-supplied value
    let appointment = Appointment {
        id: String::new(),
        patient_name: body.patient_name,
        patient_email: body.patient_email,
        patient_phone: body.patient_phone,
        date: body.date,
        time: body.time,
        reason: body.reason,
        status: creation_status(caller.role),
        notes: body.notes,
        booked_by_email: caller.email().to_string(),
    };
    let event = encode(&appointment, caller.email());

    let created = gcal::insert_event(
        &config.google_api_url,
        &access_token,
        &config.shared_calendar_id,
        &event,
    )
    .await
    .map_err(|err| match err {
        CalendarApiError::AccessDenied(message) => {
            ApiError::shared_calendar("Cannot create appointment", &message)
        }
        err => ApiError::Provider(err.into()),
    })?;

    let message = if caller.is_admin() {
        "Appointment confirmed and added to calendar"
    } else {
        "Appointment request sent for admin approval"
    };

    Ok(Json(public::CreateAppointmentResponse {
        success: true,
        message: message.to_string(),
        appointment: Appointment {
            id: created.id.unwrap_or_default(),
            ..appointment
        },
    }))
}

async fn update_status_handler(
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(id): Path<String>,
    Json(body): Json<public::UpdateStatusRequest>,
) -> Result<Json<public::UpdateStatusResponse>, ApiError> {
    let (db, config, shared_calendar) = request_context(&state);
    let (caller, _) = authenticate(&jar, &config).await?;
    if !caller.is_admin() {
        return Err(ApiError::Forbidden);
    }

    let status = AppointmentStatus::parse(&body.status)
        .ok_or_else(|| ApiError::Validation("Invalid status".to_string()))?;

    let access_token = shared_access_token(
        &shared_calendar,
        &config,
        &db,
        "Cannot update appointment",
        "Shared calendar not available",
    )
    .await?;

    let event = gcal::get_event(
        &config.google_api_url,
        &access_token,
        &config.shared_calendar_id,
        &id,
    )
    .await
    .map_err(map_event_error)?;

    let (summary, description) = apply_status(
        event.summary.as_deref().unwrap_or(""),
        event.description.as_deref().unwrap_or(""),
        status,
    );

    let mut updated = event;
    updated.summary = Some(summary.clone());
    updated.description = Some(description);

    let response = gcal::update_event(
        &config.google_api_url,
        &access_token,
        &config.shared_calendar_id,
        &id,
        &updated,
    )
    .await
    .map_err(map_event_error)?;

    Ok(Json(public::UpdateStatusResponse {
        success: true,
        message: format!("Appointment {} successfully", status),
        appointment: public::UpdatedAppointment {
            id: response.id.unwrap_or(id),
            status,
            summary,
        },
    }))
}

async fn delete_appointment_handler(
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Json<public::DeleteAppointmentResponse>, ApiError> {
    let (db, config, shared_calendar) = request_context(&state);
    let (caller, _) = authenticate(&jar, &config).await?;
    if !caller.is_admin() {
        return Err(ApiError::Forbidden);
    }

    let access_token = shared_access_token(
        &shared_calendar,
        &config,
        &db,
        "Cannot delete appointment",
        "Shared calendar not available",
    )
    .await?;

    gcal::delete_event(
        &config.google_api_url,
        &access_token,
        &config.shared_calendar_id,
        &id,
    )
    .await
    .map_err(map_event_error)?;

    Ok(Json(public::DeleteAppointmentResponse {
        success: true,
        message: "Appointment deleted successfully".to_string(),
    }))
}

fn map_event_error(err: CalendarApiError) -> ApiError {
    match err {
        CalendarApiError::NotFound => ApiError::NotFound,
        err => ApiError::Provider(err.into()),
    }
}

/// Slot availability for one day. Degrades to the full slot list with a
/// warning instead of failing when the calendar can't be reached.
async fn slots_handler(
    State(state): State<SharedState>,
    jar: CookieJar,
    Path(date): Path<String>,
) -> Result<Json<public::SlotsResponse>, ApiError> {
    let (db, config, shared_calendar) = request_context(&state);
    let _ = authenticate(&jar, &config).await?;

    let day = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| ApiError::Validation("Invalid date".to_string()))?;

    let all_slots = || SLOT_TIMES.iter().map(|s| s.to_string()).collect();

    let Some(access_token) = shared_calendar.access_token(&config, &db).await else {
        return Ok(Json(public::SlotsResponse {
            date,
            available_slots: all_slots(),
            booked_slots: vec![],
            warning: Some("Calendar unavailable, showing all slots".to_string()),
        }));
    };

    let start_of_day = clinic_to_utc(day.and_time(NaiveTime::MIN));
    let end_of_day = start_of_day + Duration::seconds(24 * 60 * 60 - 1);

    match gcal::list_events(
        &config.google_api_url,
        &access_token,
        &config.shared_calendar_id,
        start_of_day,
        end_of_day,
        None,
    )
    .await
    {
        Ok(events) => {
            let booked = booked_slots(&events);
            let available = available_slots(&booked);
            Ok(Json(public::SlotsResponse {
                date,
                available_slots: available,
                booked_slots: booked,
                warning: None,
            }))
        }
        Err(err) => {
            tracing::error!("Slots error: {}", err);
            Ok(Json(public::SlotsResponse {
                date,
                available_slots: all_slots(),
                booked_slots: vec![],
                warning: Some("Could not check availability".to_string()),
            }))
        }
    }
}

/// Create the appointments router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/",
            axum::routing::get(list_appointments_handler).post(create_appointment_handler),
        )
        .route("/{id}/status", axum::routing::put(update_status_handler))
        .route("/{id}", axum::routing::delete(delete_appointment_handler))
        .route("/slots/{date}", axum::routing::get(slots_handler))
}
