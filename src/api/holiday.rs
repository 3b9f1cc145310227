use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::holiday::Holiday;

#[derive(Deserialize, ToSchema)]
pub struct CreateHoliday {
    #[schema(example = "2026-01-26", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "Republic Day")]
    pub name: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct HolidayQuery {
    /// Defaults to the current year.
    #[schema(example = 2026)]
    pub year: Option<i32>,
}

/// Holiday calendar for a year
#[utoipa::path(
    get,
    path = "/api/v1/holidays",
    params(HolidayQuery),
    responses(
        (status = 200, description = "Holidays for the year", body = [Holiday]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn list_holidays(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<HolidayQuery>,
) -> actix_web::Result<impl Responder> {
    let year = query.year.unwrap_or_else(|| Local::now().year());

    let holidays = sqlx::query_as::<_, Holiday>(
        r#"
        SELECT id, date, name
        FROM holidays
        WHERE YEAR(date) = ?
        ORDER BY date
        "#,
    )
    .bind(year)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, year, "Failed to fetch holidays");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(holidays))
}

/// Add a holiday
#[utoipa::path(
    post,
    path = "/api/v1/holidays",
    request_body = CreateHoliday,
    responses(
        (status = 201, description = "Holiday created", body = Object, example = json!({
            "message": "Holiday created"
        })),
        (status = 409, description = "Holiday already exists for that date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn create_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateHoliday>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let result = sqlx::query("INSERT INTO holidays (date, name) VALUES (?, ?)")
        .bind(payload.date)
        .bind(&payload.name)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(_) => Ok(HttpResponse::Created().json(json!({
            "message": "Holiday created"
        }))),
        Err(e) => {
            // Unique index on date
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Holiday already exists for that date"
                    })));
                }
            }

            tracing::error!(error = %e, "Failed to create holiday");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Remove a holiday
#[utoipa::path(
    delete,
    path = "/api/v1/holidays/{holiday_id}",
    params(
        ("holiday_id" = u64, Path, description = "Holiday ID")
    ),
    responses(
        (status = 200, description = "Holiday deleted", body = Object, example = json!({
            "message": "Holiday deleted"
        })),
        (status = 404, description = "Holiday not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Holiday"
)]
pub async fn delete_holiday(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let holiday_id = path.into_inner();

    let result = sqlx::query("DELETE FROM holidays WHERE id = ?")
        .bind(holiday_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, holiday_id, "Failed to delete holiday");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Holiday not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Holiday deleted"
    })))
}
