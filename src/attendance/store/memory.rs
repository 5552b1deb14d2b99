use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{AttendanceFilter, AttendanceLookup, AttendanceRepository, AttendanceTransaction, StoreError};
use crate::model::attendance::{AttendanceDetails, AttendanceRecord, NewAttendance, day_bounds};
use crate::model::employee::EmployeeSummary;

#[derive(Default)]
struct State {
    employees: BTreeMap<u64, EmployeeSummary>,
    records: BTreeMap<u64, AttendanceRecord>,
    last_id: u64,
    fail_writes: bool,
    fail_commit: bool,
    commits: usize,
    rollbacks: usize,
}

impl State {
    fn details(&self, record: &AttendanceRecord) -> Option<AttendanceDetails> {
        self.employees.get(&record.employee_id).map(|employee| AttendanceDetails {
            record: record.clone(),
            employee: employee.clone(),
        })
    }
}

/// Shared in-memory repository; clones see the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("in-memory store poisoned")
    }

    pub fn with_employee(self, id: u64, first_name: &str, last_name: &str) -> Self {
        self.lock().employees.insert(
            id,
            EmployeeSummary {
                id,
                employee_code: format!("EMP-{:03}", id),
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                email: format!("{}.{}@company.com", first_name, last_name).to_lowercase(),
            },
        );
        self
    }

    /// Stores a record as-is, bypassing validation.
    pub fn seed(&self, record: AttendanceRecord) {
        let mut state = self.lock();
        state.last_id = state.last_id.max(record.id);
        state.records.insert(record.id, record);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn fail_commit(&self, fail: bool) {
        self.lock().fail_commit = fail;
    }

    pub fn records(&self) -> Vec<AttendanceRecord> {
        self.lock().records.values().cloned().collect()
    }

    pub fn commits(&self) -> usize {
        self.lock().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.lock().rollbacks
    }
}

impl AttendanceLookup for InMemoryStore {
    async fn employee_exists(&self, employee_id: u64) -> Result<bool, StoreError> {
        Ok(self.lock().employees.contains_key(&employee_id))
    }

    async fn attendance_exists(&self, attendance_id: u64) -> Result<bool, StoreError> {
        Ok(self.lock().records.contains_key(&attendance_id))
    }

    async fn exists_for_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
        exclude_id: Option<u64>,
    ) -> Result<bool, StoreError> {
        let (start, end) = day_bounds(day);
        Ok(self.lock().records.values().any(|r| {
            r.employee_id == employee_id
                && r.check_in_time >= start
                && r.check_in_time < end
                && Some(r.id) != exclude_id
        }))
    }
}

impl AttendanceRepository for InMemoryStore {
    type Tx = InMemoryTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        Ok(InMemoryTx {
            state: self.state.clone(),
            pending: Vec::new(),
        })
    }

    async fn find_by_id(&self, attendance_id: u64) -> Result<Option<AttendanceRecord>, StoreError> {
        Ok(self.lock().records.get(&attendance_id).cloned())
    }

    async fn find_details(&self, attendance_id: u64) -> Result<Option<AttendanceDetails>, StoreError> {
        let state = self.lock();
        Ok(state
            .records
            .get(&attendance_id)
            .and_then(|record| state.details(record)))
    }

    async fn find_open_for_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let (start, end) = day_bounds(day);
        Ok(self
            .lock()
            .records
            .values()
            .filter(|r| {
                r.employee_id == employee_id
                    && r.check_in_time >= start
                    && r.check_in_time < end
                    && r.is_open()
            })
            .max_by_key(|r| (r.check_in_time, r.id))
            .cloned())
    }

    async fn list(&self, filter: &AttendanceFilter) -> Result<(Vec<AttendanceDetails>, i64), StoreError> {
        let state = self.lock();
        let mut matching: Vec<&AttendanceRecord> = state
            .records
            .values()
            .filter(|r| filter.employee_id.is_none_or(|id| r.employee_id == id))
            .filter(|r| filter.status.is_none_or(|s| r.status == s))
            .filter(|r| filter.from.is_none_or(|d| r.check_in_time >= day_bounds(d).0))
            .filter(|r| filter.to.is_none_or(|d| r.check_in_time < day_bounds(d).1))
            .collect();
        matching.sort_by_key(|r| std::cmp::Reverse((r.check_in_time, r.id)));

        let total = matching.len() as i64;
        let data = matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.per_page as usize)
            .filter_map(|r| state.details(r))
            .collect();

        Ok((data, total))
    }
}

enum Op {
    Insert(AttendanceRecord),
    Update(AttendanceRecord),
    Delete(u64),
}

/// Buffers writes and applies them on commit; dropping discards them.
pub struct InMemoryTx {
    state: Arc<Mutex<State>>,
    pending: Vec<Op>,
}

impl InMemoryTx {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("in-memory store poisoned")
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.lock().fail_writes {
            return Err(StoreError::Injected("simulated write failure".into()));
        }
        Ok(())
    }
}

impl AttendanceTransaction for InMemoryTx {
    async fn add(&mut self, record: &NewAttendance) -> Result<u64, StoreError> {
        self.check_writable()?;
        let id = {
            let mut state = self.lock();
            state.last_id += 1;
            state.last_id
        };
        self.pending.push(Op::Insert(record.clone().with_id(id)));
        Ok(id)
    }

    async fn update(&mut self, record: &AttendanceRecord) -> Result<(), StoreError> {
        self.check_writable()?;
        self.pending.push(Op::Update(record.clone()));
        Ok(())
    }

    async fn delete(&mut self, attendance_id: u64) -> Result<bool, StoreError> {
        self.check_writable()?;
        let exists = self.lock().records.contains_key(&attendance_id);
        self.pending.push(Op::Delete(attendance_id));
        Ok(exists)
    }

    async fn commit(self) -> Result<(), StoreError> {
        let mut state = self.lock();
        if state.fail_commit {
            return Err(StoreError::Injected("simulated commit failure".into()));
        }
        for op in &self.pending {
            match op {
                Op::Insert(record) | Op::Update(record) => {
                    state.records.insert(record.id, record.clone());
                }
                Op::Delete(id) => {
                    state.records.remove(id);
                }
            }
        }
        state.commits += 1;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.lock().rollbacks += 1;
        Ok(())
    }
}
