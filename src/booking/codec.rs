//! Bidirectional mapping between appointments and calendar events.
//!
//! The event description is the only persisted structured data: a fixed
//! sequence of `Label: value` lines. The line grammar is a versioned
//! contract — changing it breaks every event already on the calendar.

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::booking::slots::{DEFAULT_SLOT, normalize_time};
use crate::booking::status::AppointmentStatus;
use crate::booking::{CLINIC_TZ, clinic_to_utc};
use crate::google::gcal::{
    CalendarEvent, EventAttendee, EventDateTime, EventReminderOverride, EventReminders,
};

pub const APPOINTMENT_DURATION_MINUTES: i64 = 30;

/// An appointment as derived from a calendar event. Not separately
/// persisted; `id` is the backing event's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub patient_name: String,
    pub patient_email: String,
    pub patient_phone: String,
    pub date: NaiveDate,
    pub time: String,
    pub reason: String,
    pub status: AppointmentStatus,
    pub notes: String,
    pub booked_by_email: String,
}

const REASON_LABELS: [(&str, &str); 7] = [
    ("checkup", "Regular Checkup"),
    ("cleaning", "Teeth Cleaning"),
    ("filling", "Dental Filling"),
    ("extraction", "Tooth Extraction"),
    ("emergency", "Emergency Visit"),
    ("consultation", "Consultation"),
    ("other", "Dental Appointment"),
];

fn known_reason_label(reason: &str) -> Option<&'static str> {
    REASON_LABELS
        .iter()
        .find(|(code, _)| *code == reason)
        .map(|(_, label)| *label)
}

/// Human label for a reason code; unknown codes get the generic label
pub fn reason_label(reason: &str) -> &'static str {
    known_reason_label(reason).unwrap_or("Dental Appointment")
}

/// Reason code for a label. Unrecognized text passes through lower-cased —
/// a deliberate accept-anything policy, not an error.
fn reason_from_label(label: &str) -> String {
    let lower = label.to_lowercase();
    REASON_LABELS
        .iter()
        .find(|(_, l)| l.to_lowercase() == lower)
        .map(|(code, _)| code.to_string())
        .unwrap_or(lower)
}

fn parse_time_or_default(time: &str) -> NaiveTime {
    NaiveTime::parse_from_str(time, "%H:%M")
        .unwrap_or_else(|_| NaiveTime::from_hms_opt(9, 0, 0).unwrap())
}

/// Serialize an appointment into a calendar event: tagged title, the
/// line-per-field description, a fixed 30-minute window in the clinic
/// zone, both attendees, and the two standing email reminders.
pub fn encode(appointment: &Appointment, booked_by_email: &str) -> CalendarEvent {
    let time24 = normalize_time(&appointment.time);
    let start = clinic_to_utc(appointment.date.and_time(parse_time_or_default(&time24)));
    let end = start + Duration::minutes(APPOINTMENT_DURATION_MINUTES);

    let known = known_reason_label(&appointment.reason);
    let title_label = known.unwrap_or("Dental Appointment");
    let reason_line = known.unwrap_or(appointment.reason.as_str());

    let summary = format!(
        "{} {} - {}",
        appointment.status.tag(),
        title_label,
        appointment.patient_name
    );

    let mut description = format!(
        "Patient: {}\nEmail: {}\nPhone: {}\nReason: {}\nStatus: {}\nBookedByEmail: {}",
        appointment.patient_name,
        appointment.patient_email,
        appointment.patient_phone,
        reason_line,
        appointment.status,
        booked_by_email
    );
    if !appointment.notes.is_empty() {
        description.push_str(&format!("\nNotes: {}", appointment.notes));
    }

    CalendarEvent {
        id: None,
        summary: Some(summary),
        description: Some(description),
        start: Some(EventDateTime {
            date_time: Some(start),
            date: None,
            time_zone: Some(CLINIC_TZ.name().to_string()),
        }),
        end: Some(EventDateTime {
            date_time: Some(end),
            date: None,
            time_zone: Some(CLINIC_TZ.name().to_string()),
        }),
        attendees: Some(vec![
            EventAttendee {
                email: appointment.patient_email.clone(),
                display_name: None,
            },
            EventAttendee {
                email: booked_by_email.to_string(),
                display_name: None,
            },
        ]),
        reminders: Some(EventReminders {
            use_default: false,
            overrides: Some(vec![
                EventReminderOverride {
                    method: "email".to_string(),
                    minutes: 24 * 60,
                },
                EventReminderOverride {
                    method: "email".to_string(),
                    minutes: 60,
                },
            ]),
        }),
    }
}

/// Whether a calendar entry is one of ours, as opposed to an unrelated
/// event someone put on the shared calendar.
pub fn is_appointment(event: &CalendarEvent) -> bool {
    let summary = event.summary.clone().unwrap_or_default().to_lowercase();
    let description = event.description.clone().unwrap_or_default().to_lowercase();
    ["dental", "checkup", "cleaning", "appointment"]
        .iter()
        .any(|keyword| summary.contains(keyword))
        || description.contains("patient:")
        || description.contains("bookedbyemail:")
}

/// Parse an appointment back out of a calendar event. Labels are matched
/// case-insensitively, first matching line wins, and the value is
/// everything after the first colon. Returns None only when the event has
/// no usable start date.
pub fn decode(event: &CalendarEvent) -> Option<Appointment> {
    let start = event.start.as_ref()?;

    let description = event.description.clone().unwrap_or_default();
    let lines: Vec<&str> = description
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let field = |name: &str| -> String {
        let prefix = format!("{}:", name.to_lowercase());
        lines
            .iter()
            .find(|line| line.to_lowercase().starts_with(&prefix))
            .map(|line| line.splitn(2, ':').nth(1).unwrap_or("").trim().to_string())
            .unwrap_or_default()
    };
    let field_or = |name: &str, fallback: &str| -> String {
        let value = field(name);
        if value.is_empty() {
            fallback.to_string()
        } else {
            value
        }
    };

    let patient_name = field_or("Patient", "Unknown Patient");
    let patient_email = field("Email");
    let patient_phone = field("Phone");
    let reason = reason_from_label(&field_or("Reason", "other"));
    let notes = field("Notes");
    let booked_by_email = {
        let value = field("BookedByEmail");
        if value.is_empty() {
            // Legacy events never recorded the booking caller
            patient_email.clone()
        } else {
            value
        }
    };

    let summary = event.summary.clone().unwrap_or_default();
    let status = AppointmentStatus::from_title(&summary)
        .or_else(|| AppointmentStatus::parse(&field_or("Status", "pending")))
        .unwrap_or(AppointmentStatus::Pending);

    let (date, time) = if let Some(instant) = start.date_time {
        let local = instant.with_timezone(&CLINIC_TZ);
        (local.date_naive(), local.format("%H:%M").to_string())
    } else if let Some(date) = start.date {
        // All-day event: no time component, use the slot default
        (date, DEFAULT_SLOT.to_string())
    } else {
        return None;
    };

    Some(Appointment {
        id: event.id.clone().unwrap_or_default(),
        patient_name,
        patient_email,
        patient_phone,
        date,
        time,
        reason,
        status,
        notes,
        booked_by_email,
    })
}
