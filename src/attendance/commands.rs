//! Write side: every mutation of an attendance record goes through here.

use chrono::NaiveDateTime;
use tracing::{error, info, instrument, warn};

use super::error::AttendanceError;
use super::store::{AttendanceLookup, AttendanceRepository, AttendanceTransaction, StoreError};
use super::validator::{AttendanceCandidate, AttendanceValidator, ValidationMode};
use crate::model::attendance::{AttendanceDetails, AttendanceRecord, AttendanceStatus, NewAttendance};
use crate::utils::clock::{Clock, SystemClock};

#[derive(Debug, Clone)]
pub struct CreateAttendance {
    pub employee_id: u64,
    pub check_in_time: Option<NaiveDateTime>,
    pub check_out_time: Option<NaiveDateTime>,
    pub status: String,
    pub notes: Option<String>,
    /// Set by the system check-in path; skips the one-record-per-day rule.
    pub is_auto_check_in: bool,
}

#[derive(Debug, Clone)]
pub struct UpdateAttendance {
    pub attendance_id: u64,
    pub employee_id: u64,
    pub check_in_time: Option<NaiveDateTime>,
    pub check_out_time: Option<NaiveDateTime>,
    pub status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteAttendance {
    pub attendance_id: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct CheckOut {
    pub employee_id: u64,
}

/// Commit on success, roll back on failure; either way the transaction is consumed.
async fn finish<Tx, T>(tx: Tx, outcome: Result<T, StoreError>, operation: &str) -> Result<T, AttendanceError>
where
    Tx: AttendanceTransaction,
{
    match outcome {
        Ok(value) => {
            tx.commit().await.map_err(|e| {
                error!(error = %e, operation, "Commit failed");
                AttendanceError::from(e)
            })?;
            Ok(value)
        }
        Err(e) => {
            error!(error = %e, operation, "Write failed, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, operation, "Rollback failed");
            }
            Err(e.into())
        }
    }
}

pub struct AttendanceCommands<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S, C> AttendanceCommands<S, C>
where
    S: AttendanceRepository,
    C: Clock,
{
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    #[instrument(skip(self, cmd), fields(employee_id = cmd.employee_id, auto = cmd.is_auto_check_in))]
    pub async fn create(&self, cmd: CreateAttendance) -> Result<AttendanceDetails, AttendanceError> {
        let now = self.clock.now();
        let candidate = AttendanceCandidate {
            employee_id: cmd.employee_id,
            check_in_time: cmd.check_in_time,
            check_out_time: cmd.check_out_time,
            status: &cmd.status,
            notes: cmd.notes.as_deref(),
        };
        let mode = ValidationMode::Create {
            auto_check_in: cmd.is_auto_check_in,
        };

        let valid = AttendanceValidator::new(&self.store, now)
            .validate(&candidate, mode)
            .await
            .inspect_err(|e| info!(error = %e, "Attendance create rejected"))?;

        if cmd.is_auto_check_in
            && self
                .store
                .exists_for_day(valid.employee_id, valid.check_in_time.date(), None)
                .await?
        {
            // Same-day duplicates are allowed on this path; make them visible.
            warn!(
                employee_id = valid.employee_id,
                day = %valid.check_in_time.date(),
                "Auto check-in is adding a second record for the same day"
            );
        }

        let new = NewAttendance {
            employee_id: valid.employee_id,
            check_in_time: valid.check_in_time,
            check_out_time: valid.check_out_time,
            status: valid.status,
            notes: valid.notes,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.store.begin().await?;
        let outcome = tx.add(&new).await;
        let attendance_id = finish(tx, outcome, "create").await?;

        info!(attendance_id, "Attendance created");

        self.store
            .find_details(attendance_id)
            .await?
            .ok_or_else(|| not_found(attendance_id))
    }

    /// System check-in for the caller: now, `Present`, same-day rule bypassed.
    pub async fn check_in(&self, employee_id: u64) -> Result<AttendanceDetails, AttendanceError> {
        self.create(CreateAttendance {
            employee_id,
            check_in_time: Some(self.clock.now()),
            check_out_time: None,
            status: AttendanceStatus::Present.to_string(),
            notes: None,
            is_auto_check_in: true,
        })
        .await
    }

    /// Closes today's latest open record. The status is always forced to
    /// `Absent`, whatever it was before.
    #[instrument(skip(self), fields(employee_id = cmd.employee_id))]
    pub async fn check_out(&self, cmd: CheckOut) -> Result<AttendanceRecord, AttendanceError> {
        let now = self.clock.now();

        let mut record = match self.store.find_open_for_day(cmd.employee_id, now.date()).await? {
            Some(record) => record,
            None => {
                info!("No open check-in found for today");
                return Err(AttendanceError::NoOpenCheckIn);
            }
        };

        record.check_out_time = Some(now);
        record.status = AttendanceStatus::Absent;
        record.updated_at = now;

        let mut tx = self.store.begin().await?;
        let outcome = tx.update(&record).await;
        finish(tx, outcome, "check_out").await?;

        info!(attendance_id = record.id, "Checked out");
        Ok(record)
    }

    #[instrument(skip(self, cmd), fields(attendance_id = cmd.attendance_id, employee_id = cmd.employee_id))]
    pub async fn update(&self, cmd: UpdateAttendance) -> Result<AttendanceRecord, AttendanceError> {
        let now = self.clock.now();
        let candidate = AttendanceCandidate {
            employee_id: cmd.employee_id,
            check_in_time: cmd.check_in_time,
            check_out_time: cmd.check_out_time,
            status: &cmd.status,
            notes: cmd.notes.as_deref(),
        };

        let valid = AttendanceValidator::new(&self.store, now)
            .validate(
                &candidate,
                ValidationMode::Update {
                    attendance_id: cmd.attendance_id,
                },
            )
            .await
            .inspect_err(|e| info!(error = %e, "Attendance update rejected"))?;

        let mut record = self
            .store
            .find_by_id(cmd.attendance_id)
            .await?
            .ok_or_else(|| not_found(cmd.attendance_id))?;

        record.employee_id = valid.employee_id;
        record.check_in_time = valid.check_in_time;
        record.check_out_time = valid.check_out_time;
        record.status = valid.status;
        record.notes = valid.notes;
        record.updated_at = now;

        let mut tx = self.store.begin().await?;
        let outcome = tx.update(&record).await;
        finish(tx, outcome, "update").await?;

        info!("Attendance updated");

        self.store
            .find_by_id(cmd.attendance_id)
            .await?
            .ok_or_else(|| not_found(cmd.attendance_id))
    }

    #[instrument(skip(self), fields(attendance_id = cmd.attendance_id))]
    pub async fn delete(&self, cmd: DeleteAttendance) -> Result<bool, AttendanceError> {
        if !self.store.attendance_exists(cmd.attendance_id).await? {
            info!("Attendance record not found");
            return Err(not_found(cmd.attendance_id));
        }

        let mut tx = self.store.begin().await?;
        let outcome = tx.delete(cmd.attendance_id).await;
        let deleted = finish(tx, outcome, "delete").await?;

        info!(deleted, "Attendance deleted");
        Ok(deleted)
    }
}

fn not_found(attendance_id: u64) -> AttendanceError {
    AttendanceError::NotFound(format!(
        "Attendance record with id {} was not found",
        attendance_id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::store::memory::InMemoryStore;
    use crate::utils::clock::FixedClock;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn setup(now: &str) -> (InMemoryStore, AttendanceCommands<InMemoryStore, FixedClock>) {
        let store = InMemoryStore::default()
            .with_employee(5, "John", "Doe")
            .with_employee(6, "Jane", "Roe");
        let commands = AttendanceCommands::new(store.clone(), FixedClock::at(now));
        (store, commands)
    }

    fn create_cmd(employee_id: u64, check_in: &str, status: &str) -> CreateAttendance {
        CreateAttendance {
            employee_id,
            check_in_time: Some(at(check_in)),
            check_out_time: None,
            status: status.to_string(),
            notes: None,
            is_auto_check_in: false,
        }
    }

    #[actix_web::test]
    async fn create_persists_input_fields_and_timestamps() {
        let (store, commands) = setup("2024-01-10T10:00:00");
        let mut cmd = create_cmd(5, "2024-01-10T08:00:00", "Present");
        cmd.notes = Some("front desk".into());

        let created = commands.create(cmd).await.unwrap();

        assert_eq!(created.employee.employee_code, "EMP-005");
        let records = store.records();
        let stored = &records[0];
        assert_eq!(stored, &created.record);
        assert_eq!(stored.employee_id, 5);
        assert_eq!(stored.check_in_time, at("2024-01-10T08:00:00"));
        assert_eq!(stored.status, AttendanceStatus::Present);
        assert_eq!(stored.notes.as_deref(), Some("front desk"));
        assert_eq!(stored.created_at, at("2024-01-10T10:00:00"));
        assert_eq!(stored.updated_at, stored.created_at);
        assert_eq!(store.commits(), 1);
    }

    #[actix_web::test]
    async fn full_day_lifecycle() {
        let (store, commands) = setup("2024-01-10T10:00:00");

        let first = commands
            .create(create_cmd(5, "2024-01-10T08:00:00", "Present"))
            .await
            .unwrap();
        let id = first.record.id;

        let second = commands
            .create(create_cmd(5, "2024-01-10T09:00:00", "Late"))
            .await
            .unwrap_err();
        assert_eq!(
            second,
            AttendanceError::Validation("Employee 5 already has an attendance record for 2024-01-10".into())
        );
        assert_eq!(store.records().len(), 1);

        let closed = commands.check_out(CheckOut { employee_id: 5 }).await.unwrap();
        assert_eq!(closed.id, id);
        assert_eq!(closed.check_out_time, Some(at("2024-01-10T10:00:00")));
        assert_eq!(closed.status, AttendanceStatus::Absent);

        assert!(commands.delete(DeleteAttendance { attendance_id: id }).await.unwrap());
        assert!(store.records().is_empty());
        assert!(matches!(
            commands.delete(DeleteAttendance { attendance_id: id }).await,
            Err(AttendanceError::NotFound(_))
        ));
    }

    #[actix_web::test]
    async fn check_out_without_open_record_changes_nothing() {
        let (store, commands) = setup("2024-01-11T18:00:00");
        commands
            .create(create_cmd(5, "2024-01-10T08:00:00", "Present"))
            .await
            .unwrap();
        let before = store.records();

        let err = commands.check_out(CheckOut { employee_id: 5 }).await.unwrap_err();

        assert_eq!(err, AttendanceError::NoOpenCheckIn);
        assert_eq!(store.records(), before);
    }

    #[actix_web::test]
    async fn check_out_picks_the_latest_open_record_of_today() {
        let (store, commands) = setup("2024-01-10T08:00:00");
        let early = commands.check_in(5).await.unwrap();
        let clock_later = FixedClock::at("2024-01-10T13:00:00");
        let commands = AttendanceCommands::new(store.clone(), clock_later);
        let late = commands.check_in(5).await.unwrap();

        let closed = commands.check_out(CheckOut { employee_id: 5 }).await.unwrap();

        assert_eq!(closed.id, late.record.id);
        let early_now = store
            .records()
            .into_iter()
            .find(|r| r.id == early.record.id)
            .unwrap();
        assert!(early_now.is_open());
    }

    #[actix_web::test]
    async fn auto_check_in_bypasses_the_same_day_rule() {
        let (store, commands) = setup("2024-01-10T09:30:00");
        commands
            .create(create_cmd(5, "2024-01-10T08:00:00", "Present"))
            .await
            .unwrap();

        let auto = commands.check_in(5).await.unwrap();

        assert_eq!(auto.record.check_in_time, at("2024-01-10T09:30:00"));
        assert_eq!(auto.record.status, AttendanceStatus::Present);
        assert_eq!(store.records().len(), 2);
    }

    #[actix_web::test]
    async fn future_times_are_rejected() {
        let (store, commands) = setup("2024-01-10T10:00:00");
        let mut cmd = create_cmd(5, "2024-01-10T08:00:00", "Present");
        cmd.check_out_time = Some(at("2024-01-10T10:00:01"));

        let err = commands.create(cmd).await.unwrap_err();

        assert_eq!(
            err,
            AttendanceError::Validation("Check-out time cannot be in the future".into())
        );
        assert!(store.records().is_empty());
        assert_eq!(store.commits(), 0);
    }

    #[actix_web::test]
    async fn update_with_invalid_status_mutates_nothing() {
        let (store, commands) = setup("2024-01-10T10:00:00");
        let created = commands
            .create(create_cmd(5, "2024-01-10T08:00:00", "Present"))
            .await
            .unwrap();

        let err = commands
            .update(UpdateAttendance {
                attendance_id: created.record.id,
                employee_id: 5,
                check_in_time: Some(at("2024-01-10T08:05:00")),
                check_out_time: None,
                status: "InvalidValue".into(),
                notes: Some("changed".into()),
            })
            .await
            .unwrap_err();

        match err {
            AttendanceError::Validation(msg) => assert!(msg.contains("Invalid status 'InvalidValue'")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.records(), vec![created.record]);
    }

    #[actix_web::test]
    async fn update_applies_fields_and_closes_the_record() {
        let (store, commands) = setup("2024-01-10T10:00:00");
        let created = commands
            .create(create_cmd(5, "2024-01-10T08:00:00", "Present"))
            .await
            .unwrap();
        let commands = AttendanceCommands::new(store.clone(), FixedClock::at("2024-01-10T18:00:00"));

        let updated = commands
            .update(UpdateAttendance {
                attendance_id: created.record.id,
                employee_id: 5,
                check_in_time: Some(at("2024-01-10T08:10:00")),
                check_out_time: Some(at("2024-01-10T16:00:00")),
                status: "EarlyLeave".into(),
                notes: Some("doctor".into()),
            })
            .await
            .unwrap();

        assert_eq!(updated.check_in_time, at("2024-01-10T08:10:00"));
        assert_eq!(updated.check_out_time, Some(at("2024-01-10T16:00:00")));
        assert_eq!(updated.status, AttendanceStatus::EarlyLeave);
        assert_eq!(updated.notes.as_deref(), Some("doctor"));
        assert_eq!(updated.created_at, created.record.created_at);
        assert_eq!(updated.updated_at, at("2024-01-10T18:00:00"));
        assert!(!updated.is_open());
    }

    #[actix_web::test]
    async fn update_cannot_move_onto_a_day_that_is_taken() {
        let (_store, commands) = setup("2024-01-11T10:00:00");
        commands
            .create(create_cmd(5, "2024-01-10T08:00:00", "Present"))
            .await
            .unwrap();
        let other = commands
            .create(create_cmd(5, "2024-01-11T08:00:00", "Present"))
            .await
            .unwrap();

        let err = commands
            .update(UpdateAttendance {
                attendance_id: other.record.id,
                employee_id: 5,
                check_in_time: Some(at("2024-01-10T09:00:00")),
                check_out_time: None,
                status: "Late".into(),
                notes: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AttendanceError::Validation(_)));
    }

    #[actix_web::test]
    async fn update_of_missing_record_is_not_found() {
        let (_store, commands) = setup("2024-01-10T10:00:00");

        let err = commands
            .update(UpdateAttendance {
                attendance_id: 77,
                employee_id: 5,
                check_in_time: Some(at("2024-01-10T08:00:00")),
                check_out_time: None,
                status: "Present".into(),
                notes: None,
            })
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AttendanceError::NotFound("Attendance record with id 77 was not found".into())
        );
    }

    #[actix_web::test]
    async fn create_for_unknown_employee_is_not_found() {
        let (_store, commands) = setup("2024-01-10T10:00:00");

        let err = commands
            .create(create_cmd(404, "2024-01-10T08:00:00", "Present"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            AttendanceError::NotFound("Employee with id 404 was not found".into())
        );
    }

    #[actix_web::test]
    async fn failed_write_rolls_back() {
        let (store, commands) = setup("2024-01-10T10:00:00");
        store.fail_writes(true);

        let err = commands
            .create(create_cmd(5, "2024-01-10T08:00:00", "Present"))
            .await
            .unwrap_err();

        assert_eq!(err, AttendanceError::Persistence("simulated write failure".into()));
        assert_eq!(store.rollbacks(), 1);
        assert!(store.records().is_empty());
    }

    #[actix_web::test]
    async fn failed_commit_leaves_no_partial_write() {
        let (store, commands) = setup("2024-01-10T10:00:00");
        let created = commands
            .create(create_cmd(6, "2024-01-10T08:00:00", "Present"))
            .await
            .unwrap();
        store.fail_commit(true);

        let err = commands
            .delete(DeleteAttendance {
                attendance_id: created.record.id,
            })
            .await
            .unwrap_err();

        assert_eq!(err, AttendanceError::Persistence("simulated commit failure".into()));
        assert_eq!(store.records(), vec![created.record]);
    }
}
