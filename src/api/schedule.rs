use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::api::attendance::fetch_schedule;
use crate::auth::auth::AuthUser;
use crate::model::schedule::{ScheduleEntry, WeeklySchedule};

#[derive(Deserialize, ToSchema)]
pub struct ReplaceSchedule {
    /// All seven weekday entries (0 = Monday .. 6 = Sunday).
    pub entries: Vec<ScheduleEntry>,
}

fn validate_entries(entries: &[ScheduleEntry]) -> Result<(), String> {
    if entries.len() != 7 {
        return Err("Schedule must contain exactly 7 entries".to_string());
    }

    let mut seen = [false; 7];
    for entry in entries {
        let Some(slot) = seen.get_mut(entry.weekday as usize) else {
            return Err(format!("Invalid weekday: {}", entry.weekday));
        };
        if *slot {
            return Err(format!("Duplicate weekday: {}", entry.weekday));
        }
        *slot = true;

        if !entry.is_leave_day {
            match (entry.start_time, entry.end_time) {
                (Some(start), Some(end)) if start < end => {}
                (Some(_), Some(_)) => {
                    return Err(format!(
                        "start_time must be before end_time on weekday {}",
                        entry.weekday
                    ));
                }
                _ => {
                    return Err(format!(
                        "Working weekday {} needs both start_time and end_time",
                        entry.weekday
                    ));
                }
            }
        }
    }

    Ok(())
}

/// Weekly schedule for an employee
#[utoipa::path(
    get,
    path = "/api/v1/employee/{employee_id}/schedule",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Weekly schedule", body = WeeklySchedule),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn get_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.resolve_target_employee(Some(path.into_inner()))?;

    let schedule = fetch_schedule(pool.get_ref(), employee_id).await?;

    Ok(HttpResponse::Ok().json(schedule))
}

/// Replace an employee's weekly schedule
#[utoipa::path(
    put,
    path = "/api/v1/employee/{employee_id}/schedule",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body = ReplaceSchedule,
    responses(
        (status = 200, description = "Schedule updated", body = Object, example = json!({
            "message": "Schedule updated"
        })),
        (status = 400, description = "Invalid schedule"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Schedule"
)]
pub async fn put_schedule(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<ReplaceSchedule>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let employee_id = path.into_inner();

    if let Err(reason) = validate_entries(&payload.entries) {
        return Ok(HttpResponse::BadRequest().json(json!({ "message": reason })));
    }

    // Replace the whole week in one transaction so aggregation never sees
    // a half-written schedule.
    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to open schedule transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    sqlx::query("DELETE FROM weekly_schedules WHERE employee_id = ?")
        .bind(employee_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to clear schedule");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    for entry in &payload.entries {
        sqlx::query(
            r#"
            INSERT INTO weekly_schedules
                (employee_id, weekday, start_time, end_time, is_leave_day)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(employee_id)
        .bind(entry.weekday)
        .bind(entry.start_time)
        .bind(entry.end_time)
        .bind(entry.is_leave_day)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to write schedule entry");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
    }

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to commit schedule");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tracing::info!(employee_id, "Weekly schedule replaced");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Schedule updated"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn working(weekday: u8) -> ScheduleEntry {
        ScheduleEntry {
            weekday,
            start_time: NaiveTime::from_hms_opt(9, 0, 0),
            end_time: NaiveTime::from_hms_opt(18, 0, 0),
            is_leave_day: false,
        }
    }

    fn off(weekday: u8) -> ScheduleEntry {
        ScheduleEntry {
            weekday,
            start_time: None,
            end_time: None,
            is_leave_day: true,
        }
    }

    fn full_week() -> Vec<ScheduleEntry> {
        vec![
            working(0),
            working(1),
            working(2),
            working(3),
            working(4),
            off(5),
            off(6),
        ]
    }

    #[test]
    fn full_week_is_valid() {
        assert!(validate_entries(&full_week()).is_ok());
    }

    #[test]
    fn missing_day_is_rejected() {
        let mut entries = full_week();
        entries.pop();
        assert!(validate_entries(&entries).is_err());
    }

    #[test]
    fn duplicate_weekday_is_rejected() {
        let mut entries = full_week();
        entries[6] = working(0);
        assert!(validate_entries(&entries).is_err());
    }

    #[test]
    fn working_day_without_hours_is_rejected() {
        let mut entries = full_week();
        entries[0].start_time = None;
        assert!(validate_entries(&entries).is_err());
    }

    #[test]
    fn inverted_hours_are_rejected() {
        let mut entries = full_week();
        entries[0].start_time = NaiveTime::from_hms_opt(19, 0, 0);
        assert!(validate_entries(&entries).is_err());
    }
}
