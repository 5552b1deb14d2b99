use crate::api::envelope::Envelope;
use crate::attendance::commands::{
    AttendanceCommands, CheckOut, CreateAttendance, DeleteAttendance, UpdateAttendance,
};
use crate::attendance::queries::{AttendanceQueries, ListAttendance};
use crate::attendance::store::AttendanceRepository;
use crate::auth::auth::AuthUser;
use crate::model::attendance::AttendanceDetails;
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Body of manual create and of update.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AttendanceRequest {
    #[schema(example = 5)]
    pub employee_id: u64,

    #[schema(example = "2024-01-10T08:00:00", value_type = Option<String>, format = "date-time")]
    pub check_in_time: Option<NaiveDateTime>,

    #[schema(example = "2024-01-10T17:00:00", value_type = Option<String>, format = "date-time")]
    pub check_out_time: Option<NaiveDateTime>,

    #[serde(default)]
    #[schema(example = "Present")]
    /// One of Present, Absent, Leave, Late, EarlyLeave
    pub status: String,

    #[schema(example = "Badge reader offline", max_length = 200)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceListQuery {
    #[schema(example = 5)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = "Late")]
    /// Filter by status
    pub status: Option<String>,
    #[schema(example = "2024-01-01", value_type = Option<String>, format = "date")]
    /// First day (inclusive) of check-in
    pub from: Option<NaiveDate>,
    #[schema(example = "2024-01-31", value_type = Option<String>, format = "date")]
    /// Last day (inclusive) of check-in
    pub to: Option<NaiveDate>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    #[schema(example = 20)]
    /// Pagination per page number
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceDetails>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/// Manual attendance entry (HR/Admin)
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = AttendanceRequest,
    responses(
        (status = 200, description = "Attendance created", body = Object, example = json!({
            "isSuccess": true,
            "data": {
                "id": 1, "employee_id": 5,
                "check_in_time": "2024-01-10T08:00:00", "check_out_time": null,
                "status": "Present", "notes": null,
                "created_at": "2024-01-10T10:00:00", "updated_at": "2024-01-10T10:00:00",
                "employee": { "id": 5, "employee_code": "EMP-005", "first_name": "John", "last_name": "Doe", "email": "john.doe@company.com" }
            },
            "error": null
        })),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "isSuccess": false, "data": null,
            "error": { "message": "Employee 5 already has an attendance record for 2024-01-10" }
        })),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn create_attendance<S: AttendanceRepository + 'static>(
    auth: AuthUser,
    commands: web::Data<AttendanceCommands<S>>,
    payload: web::Json<AttendanceRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let body = payload.into_inner();
    let created = commands
        .create(CreateAttendance {
            employee_id: body.employee_id,
            check_in_time: body.check_in_time,
            check_out_time: body.check_out_time,
            status: body.status,
            notes: body.notes,
            is_auto_check_in: false,
        })
        .await?;

    Ok(HttpResponse::Ok().json(Envelope::success(created)))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "isSuccess": true,
            "data": { "id": 7, "employee_id": 5, "check_in_time": "2024-01-10T08:02:11", "status": "Present" },
            "error": null
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in<S: AttendanceRepository + 'static>(
    auth: AuthUser,
    commands: web::Data<AttendanceCommands<S>>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    let created = commands.check_in(employee_id).await?;

    Ok(HttpResponse::Ok().json(Envelope::success(created)))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "isSuccess": true,
            "data": { "id": 7, "employee_id": 5, "check_out_time": "2024-01-10T17:30:00", "status": "Absent" },
            "error": null
        })),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "isSuccess": false, "data": null,
            "error": { "message": "No open check-in found for today" }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out<S: AttendanceRepository + 'static>(
    auth: AuthUser,
    commands: web::Data<AttendanceCommands<S>>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    let record = commands.check_out(CheckOut { employee_id }).await?;

    Ok(HttpResponse::Ok().json(Envelope::success(record)))
}

/// Update attendance (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/attendance/{attendance_id}",
    params(
        ("attendance_id" = u64, Path, description = "Attendance record ID")
    ),
    request_body = AttendanceRequest,
    responses(
        (status = 200, description = "Attendance updated", body = Object),
        (status = 400, description = "Validation failed", body = Object, example = json!({
            "isSuccess": false, "data": null,
            "error": { "message": "Invalid status 'InvalidValue'. Allowed: Present, Absent, Leave, Late, EarlyLeave" }
        })),
        (status = 404, description = "Attendance record or employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn update_attendance<S: AttendanceRepository + 'static>(
    auth: AuthUser,
    commands: web::Data<AttendanceCommands<S>>,
    path: web::Path<u64>,
    payload: web::Json<AttendanceRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let body = payload.into_inner();
    let record = commands
        .update(UpdateAttendance {
            attendance_id: path.into_inner(),
            employee_id: body.employee_id,
            check_in_time: body.check_in_time,
            check_out_time: body.check_out_time,
            status: body.status,
            notes: body.notes,
        })
        .await?;

    Ok(HttpResponse::Ok().json(Envelope::success(record)))
}

/// Delete attendance (HR/Admin)
#[utoipa::path(
    delete,
    path = "/api/attendance/{attendance_id}",
    params(
        ("attendance_id" = u64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "isSuccess": true, "data": true, "error": null
        })),
        (status = 404, description = "Attendance record not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn delete_attendance<S: AttendanceRepository + 'static>(
    auth: AuthUser,
    commands: web::Data<AttendanceCommands<S>>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let deleted = commands
        .delete(DeleteAttendance {
            attendance_id: path.into_inner(),
        })
        .await?;

    Ok(HttpResponse::Ok().json(Envelope::success(deleted)))
}

/// Attendance record details
#[utoipa::path(
    get,
    path = "/api/attendance/{attendance_id}",
    params(
        ("attendance_id" = u64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Attendance record found", body = AttendanceDetails),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Attendance record not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn get_attendance<S: AttendanceRepository + 'static>(
    auth: AuthUser,
    queries: web::Data<AttendanceQueries<S>>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let details = queries.get(path.into_inner()).await?;

    if !auth.can_view_employee(details.record.employee_id) {
        return Err(actix_web::error::ErrorForbidden("Not your attendance record"));
    }

    Ok(HttpResponse::Ok().json(Envelope::success(details)))
}

/// Attendance list; employees only see their own rows
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceListQuery),
    responses(
        (status = 200, description = "Paginated attendance list", body = AttendanceListResponse),
        (status = 400, description = "Invalid filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance<S: AttendanceRepository + 'static>(
    auth: AuthUser,
    queries: web::Data<AttendanceQueries<S>>,
    query: web::Query<AttendanceListQuery>,
) -> actix_web::Result<impl Responder> {
    let query = query.into_inner();

    let employee_id = if auth.role.manages_attendance() {
        query.employee_id
    } else {
        Some(auth.require_employee_id()?)
    };

    let page = queries
        .list(ListAttendance {
            employee_id,
            status: query.status,
            from: query.from,
            to: query.to,
            page: query.page,
            per_page: query.per_page,
        })
        .await?;

    Ok(HttpResponse::Ok().json(Envelope::success(AttendanceListResponse {
        data: page.data,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
    })))
}
