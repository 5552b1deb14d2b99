//! Persistence boundary for attendance records.
//!
//! Handlers only see these traits. [`AttendanceLookup`] is the read-only
//! capability the validator needs, [`AttendanceRepository`] adds reads for the
//! handlers and hands out transactions, and [`AttendanceTransaction`] carries
//! the writes. A transaction that is dropped without `commit` is rolled back.

use chrono::NaiveDate;
use std::future::Future;

use crate::model::attendance::{AttendanceDetails, AttendanceRecord, AttendanceStatus, NewAttendance};

pub mod mysql;

#[cfg(test)]
pub mod memory;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("Attendance row {id} is invalid: {reason}")]
    InvalidRow { id: u64, reason: String },

    #[cfg(test)]
    #[error("{0}")]
    Injected(String),
}

/// Normalised list filter; `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub employee_id: Option<u64>,
    pub status: Option<AttendanceStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: u32,
    pub per_page: u32,
}

impl AttendanceFilter {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

pub trait AttendanceLookup: Send + Sync {
    fn employee_exists(&self, employee_id: u64) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn attendance_exists(&self, attendance_id: u64) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Whether `employee_id` has a record whose check-in falls on `day`,
    /// ignoring `exclude_id`.
    fn exists_for_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
        exclude_id: Option<u64>,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

pub trait AttendanceRepository: AttendanceLookup {
    type Tx: AttendanceTransaction;

    fn begin(&self) -> impl Future<Output = Result<Self::Tx, StoreError>> + Send;

    fn find_by_id(&self, attendance_id: u64) -> impl Future<Output = Result<Option<AttendanceRecord>, StoreError>> + Send;

    fn find_details(
        &self,
        attendance_id: u64,
    ) -> impl Future<Output = Result<Option<AttendanceDetails>, StoreError>> + Send;

    /// Latest record of `day` for the employee that has no check-out yet.
    fn find_open_for_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> impl Future<Output = Result<Option<AttendanceRecord>, StoreError>> + Send;

    /// One page of matching rows plus the total match count.
    fn list(
        &self,
        filter: &AttendanceFilter,
    ) -> impl Future<Output = Result<(Vec<AttendanceDetails>, i64), StoreError>> + Send;
}

pub trait AttendanceTransaction: Send {
    /// Inserts the record and returns its assigned id.
    fn add(&mut self, record: &NewAttendance) -> impl Future<Output = Result<u64, StoreError>> + Send;

    fn update(&mut self, record: &AttendanceRecord) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Returns false when no row had that id.
    fn delete(&mut self, attendance_id: u64) -> impl Future<Output = Result<bool, StoreError>> + Send;

    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn rollback(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}
