//! Attendance check-in / check-out lifecycle.
//!
//! Commands (`commands`) validate and mutate records inside a transaction,
//! queries (`queries`) only read. Both sit on the `store` traits.

pub mod commands;
pub mod error;
pub mod queries;
pub mod store;
pub mod validator;

pub use error::AttendanceError;
