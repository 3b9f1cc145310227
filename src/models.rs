use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Self-registration payload. The account stays inactive until an admin
/// approves it.
#[derive(Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "arun.kumar")]
    pub username: String,
    pub password: String,

    #[schema(example = "EMP-001")]
    pub employee_code: String,
    #[schema(example = "Arun")]
    pub first_name: String,
    #[schema(example = "Kumar")]
    pub last_name: String,
    #[schema(example = "arun.kumar@company.com", format = "email", value_type = String)]
    pub email: String,
    #[schema(example = "+919876543210", nullable = true)]
    pub phone: Option<String>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date_of_joining: NaiveDate,
}

#[derive(Deserialize)]
pub struct LoginReqDto {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
