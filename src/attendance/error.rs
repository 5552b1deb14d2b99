use super::store::StoreError;

/// Failure of an attendance command or query.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttendanceError {
    /// One or more rule violations, joined into one message.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("No open check-in found for today")]
    NoOpenCheckIn,

    /// Storage failed; any open transaction was rolled back.
    #[error("{0}")]
    Persistence(String),
}

impl From<StoreError> for AttendanceError {
    fn from(err: StoreError) -> Self {
        AttendanceError::Persistence(err.to_string())
    }
}
