//! Appointment status and the title/description rewrite for transitions

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Declined,
}

impl AppointmentStatus {
    /// Bracketed marker embedded in an event title
    pub fn tag(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "[PENDING]",
            AppointmentStatus::Confirmed => "[CONFIRMED]",
            AppointmentStatus::Declined => "[DECLINED]",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Declined => "declined",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "pending" => Some(AppointmentStatus::Pending),
            "confirmed" => Some(AppointmentStatus::Confirmed),
            "declined" => Some(AppointmentStatus::Declined),
            _ => None,
        }
    }

    /// Status tag embedded anywhere in an event title. A tag in the title
    /// overrides whatever the description says.
    pub fn from_title(title: &str) -> Option<Self> {
        let title = title.to_lowercase();
        if title.contains("[pending]") {
            Some(AppointmentStatus::Pending)
        } else if title.contains("[declined]") {
            Some(AppointmentStatus::Declined)
        } else if title.contains("[confirmed]") {
            Some(AppointmentStatus::Confirmed)
        } else {
            None
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const TAGS: [&str; 3] = ["[pending]", "[declined]", "[confirmed]"];

/// Rewrite an event's title and description for a status transition:
/// strip any leading status tags, prepend the new one, and rewrite the
/// `Status:` description line in place (appending one if missing).
pub fn apply_status(
    summary: &str,
    description: &str,
    status: AppointmentStatus,
) -> (String, String) {
    let mut rest = summary.trim();
    loop {
        let lower = rest.to_lowercase();
        match TAGS.iter().find(|tag| lower.starts_with(*tag)) {
            Some(tag) => rest = rest[tag.len()..].trim_start(),
            None => break,
        }
    }
    let summary = format!("{} {}", status.tag(), rest);

    let status_line = Regex::new(r"(?i)Status:\s*\w+").unwrap();
    let description = if status_line.is_match(description) {
        status_line
            .replace(description, format!("Status: {}", status))
            .to_string()
    } else {
        format!("{}\nStatus: {}", description, status)
    };

    (summary, description)
}
