use serde::Serialize;
use utoipa::ToSchema;

/// The slice of an employee that attendance responses carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 5,
        "employee_code": "EMP-005",
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com"
    })
)]
pub struct EmployeeSummary {
    #[schema(example = 5)]
    pub id: u64,

    #[schema(example = "EMP-005")]
    pub employee_code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,
}
