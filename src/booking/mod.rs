//! Appointment domain: the event codec, slot enumeration, status state
//! machine, and access policy.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

pub mod codec;
pub mod policy;
pub mod slots;
pub mod status;

/// Every calendar timestamp in the system is anchored to the clinic's zone.
pub const CLINIC_TZ: Tz = chrono_tz::America::New_York;

/// Interpret a clinic-local naive datetime as a UTC instant.
pub fn clinic_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    CLINIC_TZ
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}
