use crate::api::attendance::{AttendanceListQuery, AttendanceListResponse, AttendanceRequest};
use crate::model::attendance::{AttendanceDetails, AttendanceRecord, AttendanceStatus};
use crate::model::employee::EmployeeSummary;
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Attendance API",
        version = "1.0.0",
        description = r#"
## Attendance Management

Check-in / check-out tracking for the **Human Resource Management (HRM)** system.

### 🔹 Key Features
- **Self service**
  - Check in and check out for the logged-in employee
- **HR / Admin**
  - Enter, correct and delete attendance records for any employee
  - Browse attendance with filters and pagination

### 📏 Rules
- One attendance record per employee per calendar day
- Check-in and check-out times cannot be in the future
- Check-out cannot precede check-in
- Notes are limited to 200 characters

### 🔐 Security
Every endpoint requires a **JWT Bearer** access token.

### 📦 Response Format
Every response is wrapped as `{ "isSuccess": bool, "data": ..., "error": { "message": string } }`.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::create_attendance,
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::update_attendance,
        crate::api::attendance::delete_attendance,
        crate::api::attendance::get_attendance,
        crate::api::attendance::list_attendance
    ),
    components(
        schemas(
            AttendanceRequest,
            AttendanceListQuery,
            AttendanceListResponse,
            AttendanceDetails,
            AttendanceRecord,
            AttendanceStatus,
            EmployeeSummary
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_attendance_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        assert_eq!(
            paths,
            vec![
                "/api/attendance",
                "/api/attendance/check-in",
                "/api/attendance/check-out",
                "/api/attendance/{attendance_id}",
            ]
        );
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer_auth"));
    }
}
