use actix_web::{HttpResponse, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Failures the attendance pipeline can surface to a caller. One request
/// maps to at most one of these; nothing is retried.
#[derive(Debug, Display)]
pub enum AttendanceError {
    #[display(fmt = "Invalid location: {}", _0)]
    InvalidLocation(String),

    #[display(fmt = "Invalid location format: {}", _0)]
    InvalidLocationFormat(String),

    #[display(fmt = "Already checked in")]
    DuplicateCheckIn,

    #[display(fmt = "No open check-in")]
    NoOpenCheckIn,

    #[display(fmt = "Employee not found")]
    EmployeeNotFound,

    #[display(fmt = "Storage failure: {}", _0)]
    Persistence(sqlx::Error),
}

impl std::error::Error for AttendanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AttendanceError::Persistence(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AttendanceError {
    fn from(e: sqlx::Error) -> Self {
        AttendanceError::Persistence(e)
    }
}

impl actix_web::ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::InvalidLocation(_) | AttendanceError::InvalidLocationFormat(_) => {
                StatusCode::BAD_REQUEST
            }
            AttendanceError::DuplicateCheckIn | AttendanceError::NoOpenCheckIn => {
                StatusCode::CONFLICT
            }
            AttendanceError::EmployeeNotFound => StatusCode::NOT_FOUND,
            AttendanceError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Storage details stay in the logs, not in the response body.
        let message = match self {
            AttendanceError::Persistence(_) => "Internal Server Error".to_string(),
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            AttendanceError::InvalidLocation("latitude 91 out of range".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AttendanceError::InvalidLocationFormat("bogus".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AttendanceError::DuplicateCheckIn.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AttendanceError::NoOpenCheckIn.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AttendanceError::EmployeeNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AttendanceError::Persistence(sqlx::Error::PoolClosed).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn persistence_response_hides_the_cause() {
        let resp = AttendanceError::Persistence(sqlx::Error::PoolClosed).error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
