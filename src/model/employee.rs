use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP-001",
        "first_name": "Arun",
        "last_name": "Kumar",
        "email": "arun.kumar@company.com",
        "phone": "+919876543210",
        "date_of_joining": "2024-01-01",
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "Arun")]
    pub first_name: String,

    #[schema(example = "Kumar")]
    pub last_name: String,

    #[schema(example = "arun.kumar@company.com")]
    pub email: String,

    #[schema(example = "+919876543210", nullable = true)]
    pub phone: Option<String>,

    /// Days before this date never count toward attendance totals.
    #[schema(
        example = "2024-01-01",
        value_type = String,
        format = "date"
    )]
    pub date_of_joining: NaiveDate,

    /// "pending" until the registration is approved.
    #[schema(example = "active")]
    pub status: String,
}
