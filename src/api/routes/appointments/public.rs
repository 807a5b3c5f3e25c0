//! Public types for the appointments API
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::booking::codec::Appointment;
use crate::booking::status::AppointmentStatus;

#[derive(Serialize, Deserialize)]
pub struct AppointmentsResponse {
    pub appointments: Vec<Appointment>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub patient_name: String,
    pub patient_email: String,
    #[serde(default)]
    pub patient_phone: String,
    pub date: NaiveDate,
    pub time: String,
    pub reason: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Serialize, Deserialize)]
pub struct CreateAppointmentResponse {
    pub success: bool,
    pub message: String,
    pub appointment: Appointment,
}

#[derive(Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Serialize, Deserialize)]
pub struct UpdatedAppointment {
    pub id: String,
    pub status: AppointmentStatus,
    pub summary: String,
}

#[derive(Serialize, Deserialize)]
pub struct UpdateStatusResponse {
    pub success: bool,
    pub message: String,
    pub appointment: UpdatedAppointment,
}

#[derive(Serialize, Deserialize)]
pub struct DeleteAppointmentResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotsResponse {
    pub date: String,
    pub available_slots: Vec<String>,
    pub booked_slots: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}
