//! Time normalization and the bookable slot enumeration

use crate::booking::CLINIC_TZ;
use crate::google::gcal::CalendarEvent;

/// Fixed bookable start times for a business day: morning and afternoon
/// blocks in 30-minute increments.
pub const SLOT_TIMES: [&str; 12] = [
    "09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "14:00", "14:30", "15:00", "15:30",
    "16:00", "16:30",
];

/// Fallback when a time is missing or unparseable
pub const DEFAULT_SLOT: &str = "09:00";

fn is_24h(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.len() == 5
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[2] == b':'
        && bytes[3].is_ascii_digit()
        && bytes[4].is_ascii_digit()
}

/// Normalize a time to 24-hour `HH:MM`. Accepts `HH:MM` as-is and converts
/// `h:mm AM/PM`; anything else yields the default slot time. Idempotent.
pub fn normalize_time(input: &str) -> String {
    let input = input.trim();
    if input.is_empty() {
        return DEFAULT_SLOT.to_string();
    }
    if is_24h(input) {
        return input.to_string();
    }

    let (time, modifier) = match input.split_once(' ') {
        Some((time, modifier)) => (time, Some(modifier.trim())),
        None => (input, None),
    };
    let Some((hours, minutes)) = time.split_once(':') else {
        return DEFAULT_SLOT.to_string();
    };
    let Ok(mut hours) = hours.trim().parse::<u32>() else {
        return DEFAULT_SLOT.to_string();
    };
    let Ok(minutes) = minutes.trim().parse::<u32>() else {
        return DEFAULT_SLOT.to_string();
    };

    match modifier.map(str::to_uppercase).as_deref() {
        Some("PM") if hours != 12 => hours += 12,
        Some("AM") if hours == 12 => hours = 0,
        _ => {}
    }

    format!("{:02}:{:02}", hours, minutes)
}

/// Start times (clinic time) of events that block a slot: timed, and not
/// marked declined in either the title or the description.
pub fn booked_slots(events: &[CalendarEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| {
            let start = event.start.as_ref()?.date_time?;
            let summary = event.summary.clone().unwrap_or_default().to_lowercase();
            let description = event.description.clone().unwrap_or_default().to_lowercase();
            if summary.contains("[declined]") || description.contains("status: declined") {
                return None;
            }
            Some(start.with_timezone(&CLINIC_TZ).format("%H:%M").to_string())
        })
        .collect()
}

/// The slot enumeration minus booked times, order preserved
pub fn available_slots(booked: &[String]) -> Vec<String> {
    SLOT_TIMES
        .iter()
        .filter(|slot| !booked.iter().any(|b| b == *slot))
        .map(|slot| slot.to_string())
        .collect()
}
