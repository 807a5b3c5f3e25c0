//! Who may see and mutate which appointments

use serde::{Deserialize, Serialize};

use crate::booking::codec::Appointment;
use crate::booking::status::AppointmentStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Patient,
}

/// Admin iff the verified email is on the allow-list, case-insensitively
pub fn role_for_email(email: &str, admin_emails: &[String]) -> Role {
    if admin_emails
        .iter()
        .any(|admin| admin.eq_ignore_ascii_case(email))
    {
        Role::Admin
    } else {
        Role::Patient
    }
}

/// Admins see everything; patients only appointments they booked or that
/// carry their email as the patient.
pub fn can_view(appointment: &Appointment, role: Role, caller_email: &str) -> bool {
    role == Role::Admin
        || appointment
            .booked_by_email
            .eq_ignore_ascii_case(caller_email)
        || appointment.patient_email.eq_ignore_ascii_case(caller_email)
}

pub fn visible_appointments(
    appointments: Vec<Appointment>,
    role: Role,
    caller_email: &str,
) -> Vec<Appointment> {
    appointments
        .into_iter()
        .filter(|appointment| can_view(appointment, role, caller_email))
        .collect()
}

/// Admin-created appointments start confirmed, everyone else's start
/// pending. The only automatic transition in the system.
pub fn creation_status(role: Role) -> AppointmentStatus {
    match role {
        Role::Admin => AppointmentStatus::Confirmed,
        Role::Patient => AppointmentStatus::Pending,
    }
}
