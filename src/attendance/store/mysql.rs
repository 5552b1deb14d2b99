use chrono::{NaiveDate, NaiveDateTime};
use sqlx::{MySql, MySqlPool, Transaction};

use super::{AttendanceFilter, AttendanceLookup, AttendanceRepository, AttendanceTransaction, StoreError};
use crate::model::attendance::{
    AttendanceDetails, AttendanceRecord, AttendanceStatus, NewAttendance, day_bounds,
};
use crate::model::employee::EmployeeSummary;

const DETAILS_SELECT: &str = r#"
    SELECT
        a.id, a.employee_id, a.check_in_time, a.check_out_time, a.status, a.notes,
        a.created_at, a.updated_at,
        e.employee_code, e.first_name, e.last_name, e.email
    FROM attendance_records a
    JOIN employees e ON e.id = a.employee_id
"#;

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: u64,
    employee_id: u64,
    check_in_time: NaiveDateTime,
    check_out_time: Option<NaiveDateTime>,
    status: String,
    notes: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<AttendanceStatus>()
            .map_err(|e| StoreError::InvalidRow {
                id: row.id,
                reason: format!("status '{}': {}", row.status, e),
            })?;

        Ok(AttendanceRecord {
            id: row.id,
            employee_id: row.employee_id,
            check_in_time: row.check_in_time,
            check_out_time: row.check_out_time,
            status,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DetailsRow {
    #[sqlx(flatten)]
    attendance: AttendanceRow,
    employee_code: String,
    first_name: String,
    last_name: String,
    email: String,
}

impl TryFrom<DetailsRow> for AttendanceDetails {
    type Error = StoreError;

    fn try_from(row: DetailsRow) -> Result<Self, Self::Error> {
        let employee = EmployeeSummary {
            id: row.attendance.employee_id,
            employee_code: row.employee_code,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
        };

        Ok(AttendanceDetails {
            record: row.attendance.try_into()?,
            employee,
        })
    }
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(&'static str),
    DateTime(NaiveDateTime),
}

/// MySQL-backed attendance repository.
#[derive(Clone)]
pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

impl AttendanceLookup for MySqlAttendanceStore {
    async fn employee_exists(&self, employee_id: u64) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ? LIMIT 1)",
        )
        .bind(employee_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists > 0)
    }

    async fn attendance_exists(&self, attendance_id: u64) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM attendance_records WHERE id = ? LIMIT 1)",
        )
        .bind(attendance_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists > 0)
    }

    async fn exists_for_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
        exclude_id: Option<u64>,
    ) -> Result<bool, StoreError> {
        let (start, end) = day_bounds(day);

        let exists = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM attendance_records
                WHERE employee_id = ?
                AND check_in_time >= ?
                AND check_in_time < ?
                AND (? IS NULL OR id <> ?)
                LIMIT 1
            )
            "#,
        )
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .bind(exclude_id)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists > 0)
    }
}

impl AttendanceRepository for MySqlAttendanceStore {
    type Tx = MySqlAttendanceTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        Ok(MySqlAttendanceTx {
            tx: self.pool.begin().await?,
        })
    }

    async fn find_by_id(&self, attendance_id: u64) -> Result<Option<AttendanceRecord>, StoreError> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, employee_id, check_in_time, check_out_time, status, notes, created_at, updated_at
            FROM attendance_records
            WHERE id = ?
            "#,
        )
        .bind(attendance_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AttendanceRecord::try_from).transpose()
    }

    async fn find_details(&self, attendance_id: u64) -> Result<Option<AttendanceDetails>, StoreError> {
        let sql = format!("{} WHERE a.id = ?", DETAILS_SELECT);

        let row = sqlx::query_as::<_, DetailsRow>(&sql)
            .bind(attendance_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AttendanceDetails::try_from).transpose()
    }

    async fn find_open_for_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let (start, end) = day_bounds(day);

        let row = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, employee_id, check_in_time, check_out_time, status, notes, created_at, updated_at
            FROM attendance_records
            WHERE employee_id = ?
            AND check_in_time >= ?
            AND check_in_time < ?
            AND check_out_time IS NULL
            ORDER BY check_in_time DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(employee_id)
        .bind(start)
        .bind(end)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AttendanceRecord::try_from).transpose()
    }

    async fn list(&self, filter: &AttendanceFilter) -> Result<(Vec<AttendanceDetails>, i64), StoreError> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(employee_id) = filter.employee_id {
            where_sql.push_str(" AND a.employee_id = ?");
            args.push(FilterValue::U64(employee_id));
        }

        if let Some(status) = filter.status {
            where_sql.push_str(" AND a.status = ?");
            args.push(FilterValue::Str(status.into()));
        }

        if let Some(from) = filter.from {
            where_sql.push_str(" AND a.check_in_time >= ?");
            args.push(FilterValue::DateTime(day_bounds(from).0));
        }

        if let Some(to) = filter.to {
            where_sql.push_str(" AND a.check_in_time < ?");
            args.push(FilterValue::DateTime(day_bounds(to).1));
        }

        let count_sql = format!(
            "SELECT COUNT(*) FROM attendance_records a{}",
            where_sql
        );
        tracing::debug!(sql = %count_sql, "Counting attendance records");

        let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
        for arg in &args {
            count_q = match arg {
                FilterValue::U64(v) => count_q.bind(*v),
                FilterValue::Str(s) => count_q.bind(*s),
                FilterValue::DateTime(d) => count_q.bind(*d),
            };
        }
        let total = count_q.fetch_one(&self.pool).await?;

        let data_sql = format!(
            "{}{} ORDER BY a.check_in_time DESC, a.id DESC LIMIT ? OFFSET ?",
            DETAILS_SELECT, where_sql
        );
        tracing::debug!(sql = %data_sql, page = filter.page, per_page = filter.per_page, "Fetching attendance records");

        let mut data_q = sqlx::query_as::<_, DetailsRow>(&data_sql);
        for arg in args {
            data_q = match arg {
                FilterValue::U64(v) => data_q.bind(v),
                FilterValue::Str(s) => data_q.bind(s),
                FilterValue::DateTime(d) => data_q.bind(d),
            };
        }

        let rows = data_q
            .bind(u64::from(filter.per_page))
            .bind(filter.offset())
            .fetch_all(&self.pool)
            .await?;

        let data = rows
            .into_iter()
            .map(AttendanceDetails::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((data, total))
    }
}

pub struct MySqlAttendanceTx {
    tx: Transaction<'static, MySql>,
}

impl AttendanceTransaction for MySqlAttendanceTx {
    async fn add(&mut self, record: &NewAttendance) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_records
                (employee_id, check_in_time, check_out_time, status, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.employee_id)
        .bind(record.check_in_time)
        .bind(record.check_out_time)
        .bind(record.status.as_ref())
        .bind(record.notes.as_deref())
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.last_insert_id())
    }

    async fn update(&mut self, record: &AttendanceRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE attendance_records
            SET employee_id = ?, check_in_time = ?, check_out_time = ?, status = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(record.employee_id)
        .bind(record.check_in_time)
        .bind(record.check_out_time)
        .bind(record.status.as_ref())
        .bind(record.notes.as_deref())
        .bind(record.updated_at)
        .bind(record.id)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn delete(&mut self, attendance_id: u64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM attendance_records WHERE id = ?")
            .bind(attendance_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
