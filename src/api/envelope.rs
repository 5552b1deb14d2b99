use actix_web::{HttpResponse, ResponseError, error::InternalError, http::StatusCode};
use serde::Serialize;

use crate::attendance::AttendanceError;

/// Uniform `{ isSuccess, data, error }` body of every attendance endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub is_success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            is_success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl Envelope<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            data: None,
            error: Some(ErrorBody {
                message: message.into(),
            }),
        }
    }
}

/// 400 carrying `message` in a failure envelope; used for request parse errors.
pub fn bad_request(message: String) -> actix_web::Error {
    let response = HttpResponse::BadRequest().json(Envelope::failure(message.clone()));
    InternalError::from_response(message, response).into()
}

impl ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::Validation(_) | AttendanceError::NoOpenCheckIn => StatusCode::BAD_REQUEST,
            AttendanceError::NotFound(_) => StatusCode::NOT_FOUND,
            AttendanceError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(Envelope::failure(self.to_string()))
    }
}
