//! Field and cross-record rules for attendance records.
//!
//! Every rule runs on every call; violations are collected rather than
//! stopping at the first one.

use chrono::{NaiveDate, NaiveDateTime};
use strum::IntoEnumIterator;

use super::error::AttendanceError;
use super::store::{AttendanceLookup, StoreError};
use crate::model::attendance::{AttendanceStatus, MAX_NOTES_LEN};

/// Unchecked field set of a create or update.
#[derive(Debug, Clone, Copy)]
pub struct AttendanceCandidate<'a> {
    pub employee_id: u64,
    pub check_in_time: Option<NaiveDateTime>,
    pub check_out_time: Option<NaiveDateTime>,
    pub status: &'a str,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// `auto_check_in` skips the one-record-per-day rule.
    Create { auto_check_in: bool },
    Update { attendance_id: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleViolation {
    #[error("Employee id must be greater than 0")]
    InvalidEmployeeId,

    #[error("Employee with id {0} was not found")]
    EmployeeNotFound(u64),

    #[error("Attendance record with id {0} was not found")]
    AttendanceNotFound(u64),

    #[error("Check-in time is required")]
    MissingCheckIn,

    #[error("Check-in time cannot be in the future")]
    CheckInInFuture,

    #[error("Check-out time must be later than or equal to check-in time")]
    CheckOutBeforeCheckIn,

    #[error("Check-out time cannot be in the future")]
    CheckOutInFuture,

    #[error("Status is required")]
    MissingStatus,

    #[error("Invalid status '{0}'. Allowed: {allowed}", allowed = allowed_statuses())]
    InvalidStatus(String),

    #[error("Notes cannot exceed {max} characters (got {0})", max = MAX_NOTES_LEN)]
    NotesTooLong(usize),

    #[error("Employee {employee_id} already has an attendance record for {day}")]
    DuplicateForDay { employee_id: u64, day: NaiveDate },
}

impl RuleViolation {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RuleViolation::EmployeeNotFound(_) | RuleViolation::AttendanceNotFound(_)
        )
    }
}

fn allowed_statuses() -> String {
    AttendanceStatus::iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Violations collected by one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<RuleViolation>,
}

impl ValidationReport {
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[RuleViolation] {
        &self.violations
    }

    pub fn message(&self) -> String {
        self.violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn push(&mut self, violation: RuleViolation) {
        self.violations.push(violation);
    }
}

impl From<ValidationReport> for AttendanceError {
    /// A missing referenced entity makes the whole report a not-found failure.
    fn from(report: ValidationReport) -> Self {
        if report.violations.iter().any(RuleViolation::is_not_found) {
            AttendanceError::NotFound(report.message())
        } else {
            AttendanceError::Validation(report.message())
        }
    }
}

/// Fields of a candidate that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAttendance {
    pub employee_id: u64,
    pub check_in_time: NaiveDateTime,
    pub check_out_time: Option<NaiveDateTime>,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

pub struct AttendanceValidator<'a, L> {
    lookup: &'a L,
    now: NaiveDateTime,
}

impl<'a, L: AttendanceLookup> AttendanceValidator<'a, L> {
    pub fn new(lookup: &'a L, now: NaiveDateTime) -> Self {
        Self { lookup, now }
    }

    /// Runs every rule and returns all violations found.
    pub async fn check(
        &self,
        candidate: &AttendanceCandidate<'_>,
        mode: ValidationMode,
    ) -> Result<ValidationReport, StoreError> {
        let mut report = ValidationReport::default();

        if let ValidationMode::Update { attendance_id } = mode {
            if !self.lookup.attendance_exists(attendance_id).await? {
                report.push(RuleViolation::AttendanceNotFound(attendance_id));
            }
        }

        if candidate.employee_id == 0 {
            report.push(RuleViolation::InvalidEmployeeId);
        } else if !self.lookup.employee_exists(candidate.employee_id).await? {
            report.push(RuleViolation::EmployeeNotFound(candidate.employee_id));
        }

        match candidate.check_in_time {
            None => report.push(RuleViolation::MissingCheckIn),
            Some(check_in) if check_in > self.now => report.push(RuleViolation::CheckInInFuture),
            Some(_) => {}
        }

        if let Some(check_out) = candidate.check_out_time {
            if candidate.check_in_time.is_some_and(|check_in| check_out < check_in) {
                report.push(RuleViolation::CheckOutBeforeCheckIn);
            }
            if check_out > self.now {
                report.push(RuleViolation::CheckOutInFuture);
            }
        }

        let status = candidate.status.trim();
        if status.is_empty() {
            report.push(RuleViolation::MissingStatus);
        } else if status.parse::<AttendanceStatus>().is_err() {
            report.push(RuleViolation::InvalidStatus(status.to_string()));
        }

        if let Some(notes) = candidate.notes {
            let len = notes.chars().count();
            if len > MAX_NOTES_LEN {
                report.push(RuleViolation::NotesTooLong(len));
            }
        }

        let skip_same_day_rule = matches!(mode, ValidationMode::Create { auto_check_in: true });
        let exclude_id = match mode {
            ValidationMode::Update { attendance_id } => Some(attendance_id),
            ValidationMode::Create { .. } => None,
        };
        if let Some(check_in) = candidate.check_in_time {
            let day = check_in.date();
            if !skip_same_day_rule
                && candidate.employee_id > 0
                && self
                    .lookup
                    .exists_for_day(candidate.employee_id, day, exclude_id)
                    .await?
            {
                report.push(RuleViolation::DuplicateForDay {
                    employee_id: candidate.employee_id,
                    day,
                });
            }
        }

        Ok(report)
    }

    /// Runs every rule; on success returns the typed field set.
    pub async fn validate(
        &self,
        candidate: &AttendanceCandidate<'_>,
        mode: ValidationMode,
    ) -> Result<ValidAttendance, AttendanceError> {
        let report = self.check(candidate, mode).await?;

        match (candidate.check_in_time, candidate.status.trim().parse::<AttendanceStatus>()) {
            (Some(check_in_time), Ok(status)) if report.is_empty() => Ok(ValidAttendance {
                employee_id: candidate.employee_id,
                check_in_time,
                check_out_time: candidate.check_out_time,
                status,
                notes: candidate.notes.map(str::to_string),
            }),
            _ => Err(report.into()),
        }
    }
}
