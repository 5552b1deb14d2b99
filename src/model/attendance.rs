use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};
use utoipa::ToSchema;

use crate::model::employee::EmployeeSummary;

/// Longest accepted `notes` value, counted in characters.
pub const MAX_NOTES_LEN: usize = 200;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    IntoStaticStr,
    ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Leave,
    Late,
    EarlyLeave,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 5,
        "check_in_time": "2024-01-10T08:00:00",
        "check_out_time": null,
        "status": "Present",
        "notes": null,
        "created_at": "2024-01-10T08:00:03",
        "updated_at": "2024-01-10T08:00:03"
    })
)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,

    #[schema(value_type = String, format = "date-time")]
    pub check_in_time: NaiveDateTime,

    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub check_out_time: Option<NaiveDateTime>,

    pub status: AttendanceStatus,

    #[schema(nullable = true)]
    pub notes: Option<String>,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: NaiveDateTime,
}

impl AttendanceRecord {
    /// Checked in but not yet checked out.
    pub fn is_open(&self) -> bool {
        self.check_out_time.is_none()
    }
}

/// A record that has passed validation but has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendance {
    pub employee_id: u64,
    pub check_in_time: NaiveDateTime,
    pub check_out_time: Option<NaiveDateTime>,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewAttendance {
    pub fn with_id(self, id: u64) -> AttendanceRecord {
        AttendanceRecord {
            id,
            employee_id: self.employee_id,
            check_in_time: self.check_in_time,
            check_out_time: self.check_out_time,
            status: self.status,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Attendance row joined with the employee it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AttendanceDetails {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub employee: EmployeeSummary,
}

/// Half-open `[00:00, next day 00:00)` range of a calendar day.
pub fn day_bounds(day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = day.and_time(NaiveTime::MIN);
    (start, start + Duration::days(1))
}
