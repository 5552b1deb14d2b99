//! Read side: projections of attendance rows. Nothing here mutates state.

use chrono::NaiveDate;
use tracing::error;

use super::error::AttendanceError;
use super::store::{AttendanceFilter, AttendanceRepository};
use crate::model::attendance::{AttendanceDetails, AttendanceStatus};

pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 100;

/// Raw list parameters as they arrive from the caller.
#[derive(Debug, Clone, Default)]
pub struct ListAttendance {
    pub employee_id: Option<u64>,
    pub status: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListAttendance {
    fn into_filter(self) -> Result<AttendanceFilter, AttendanceError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) => Some(s.parse::<AttendanceStatus>().map_err(|_| {
                AttendanceError::Validation(format!("Invalid status filter '{}'", s))
            })?),
        };

        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(AttendanceError::Validation(
                    "from cannot be after to".to_string(),
                ));
            }
        }

        Ok(AttendanceFilter {
            employee_id: self.employee_id,
            status,
            from: self.from,
            to: self.to,
            page: self.page.unwrap_or(1).max(1),
            per_page: self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendancePage {
    pub data: Vec<AttendanceDetails>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

pub struct AttendanceQueries<S> {
    store: S,
}

impl<S: AttendanceRepository> AttendanceQueries<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn get(&self, attendance_id: u64) -> Result<AttendanceDetails, AttendanceError> {
        self.store
            .find_details(attendance_id)
            .await
            .inspect_err(|e| error!(error = %e, attendance_id, "Failed to fetch attendance"))?
            .ok_or_else(|| {
                AttendanceError::NotFound(format!(
                    "Attendance record with id {} was not found",
                    attendance_id
                ))
            })
    }

    pub async fn list(&self, query: ListAttendance) -> Result<AttendancePage, AttendanceError> {
        let filter = query.into_filter()?;

        let (data, total) = self
            .store
            .list(&filter)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to fetch attendance list"))?;

        Ok(AttendancePage {
            data,
            page: filter.page,
            per_page: filter.per_page,
            total,
        })
    }
}
