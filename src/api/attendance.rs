use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::attendance::error::AttendanceError;
use crate::attendance::geo::{GeoPoint, office_tag};
use crate::attendance::presence::{
    DayClassification, MonthlyPresenceSummary, PresenceRules, classify_month, format_worked_duration,
    month_end, summarize,
};
use crate::attendance::sites::OfficeSite;
use crate::attendance::status::CheckState;
use crate::auth::auth::AuthUser;
use crate::model::attendance::{AttendanceEvent, EventType};
use crate::model::schedule::{ScheduleEntry, WeeklySchedule};
use crate::utils::summary_cache::SummaryCache;

#[derive(Deserialize, ToSchema)]
pub struct PunchRequest {
    /// "lat,lon" in decimal degrees, as reported by the device.
    #[schema(example = "12.94198577,80.21012198")]
    pub location: String,

    /// Reference returned by the photo store for the selfie.
    #[schema(example = "selfie/2026/08/03/1000-090241.jpg")]
    pub photo_ref: String,
}

#[derive(Serialize, ToSchema)]
pub struct PunchResponse {
    #[schema(example = "Checked in successfully")]
    pub message: String,

    #[schema(example = true)]
    pub in_office: bool,

    #[schema(example = "Pallikaranai")]
    pub office_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct CheckStatusResponse {
    #[schema(example = "out")]
    pub state: String,

    #[schema(example = "check_in")]
    pub next_action: EventType,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct MonthQuery {
    /// Defaults to the caller's own employee profile; HR/Admin may query
    /// anyone.
    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 8)]
    pub month: u32,
}

#[derive(Serialize, ToSchema)]
pub struct DayLogEntry {
    #[serde(flatten)]
    pub day: DayClassification,

    /// Worked duration as "Xh Ym" (hours truncated).
    #[schema(example = "8h 45m", nullable = true)]
    pub worked: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DayLogResponse {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 8)]
    pub month: u32,
    pub days: Vec<DayLogEntry>,
}

#[derive(Serialize, ToSchema)]
pub struct SummaryResponse {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 2026)]
    pub year: i32,
    #[schema(example = 8)]
    pub month: u32,

    #[serde(flatten)]
    pub summary: MonthlyPresenceSummary,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct RecentQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 20)]
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct RecentAttendanceResponse {
    pub data: Vec<AttendanceEvent>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

fn validate_month(month: u32) -> actix_web::Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(actix_web::error::ErrorBadRequest("month must be 1..=12"))
    }
}

/* =========================
Shared loaders
========================= */

pub async fn fetch_schedule(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<WeeklySchedule, AttendanceError> {
    let entries = sqlx::query_as::<_, ScheduleEntry>(
        r#"
        SELECT weekday, start_time, end_time, is_leave_day
        FROM weekly_schedules
        WHERE employee_id = ?
        ORDER BY weekday
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    if entries.is_empty() {
        Ok(WeeklySchedule::default_template())
    } else {
        Ok(WeeklySchedule::from_entries(entries))
    }
}

pub async fn fetch_holidays(
    pool: &MySqlPool,
    year: i32,
    month: u32,
) -> Result<Vec<NaiveDate>, AttendanceError> {
    let Some(start) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Ok(Vec::new());
    };
    let end = month_end(year, month);

    let dates = sqlx::query_scalar::<_, NaiveDate>(
        r#"
        SELECT date
        FROM holidays
        WHERE date BETWEEN ? AND ?
        ORDER BY date
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(dates)
}

pub async fn fetch_month_events(
    pool: &MySqlPool,
    employee_id: u64,
    year: i32,
    month: u32,
) -> Result<Vec<AttendanceEvent>, AttendanceError> {
    let Some(start) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Ok(Vec::new());
    };
    let end = month_end(year, month);

    let events = sqlx::query_as::<_, AttendanceEvent>(
        r#"
        SELECT id, employee_id, event_type, recorded_at, latitude, longitude, office_name, photo_ref
        FROM attendance_events
        WHERE employee_id = ?
        AND recorded_at >= ?
        AND recorded_at < ? + INTERVAL 1 DAY
        ORDER BY recorded_at ASC
        "#,
    )
    .bind(employee_id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(events)
}

pub async fn fetch_date_of_joining(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<NaiveDate, AttendanceError> {
    sqlx::query_scalar::<_, NaiveDate>("SELECT date_of_joining FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AttendanceError::EmployeeNotFound)
}

/// Computes one employee's monthly summary straight from the store. The
/// cache layer sits on top of this; warmup calls it directly.
pub async fn load_monthly_summary(
    pool: &MySqlPool,
    rules: PresenceRules,
    employee_id: u64,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Result<MonthlyPresenceSummary, AttendanceError> {
    let joined = fetch_date_of_joining(pool, employee_id).await?;
    let schedule = fetch_schedule(pool, employee_id).await?;
    let holidays = fetch_holidays(pool, year, month).await?;
    let events = fetch_month_events(pool, employee_id, year, month).await?;

    Ok(summarize(
        year,
        month,
        today,
        Some(joined),
        &schedule,
        &holidays,
        &events,
        &rules,
    ))
}

/* =========================
Check-in / check-out
========================= */

/// One punch: parse location, resolve the office tag, append the ledger
/// row and advance the per-employee state, all inside one transaction.
/// The compare-and-swap UPDATE on `attendance_status` is what rejects
/// out-of-order punches, including two concurrent check-ins.
async fn submit_punch(
    pool: &MySqlPool,
    sites: &[OfficeSite],
    cache: &SummaryCache,
    employee_id: u64,
    event_type: EventType,
    payload: &PunchRequest,
) -> Result<PunchResponse, AttendanceError> {
    let point = GeoPoint::parse(&payload.location)?;
    let office_name = office_tag(&point, sites);
    let in_office = office_name != crate::attendance::geo::OUTSIDE_OFFICE;

    let recorded_at = Local::now().naive_local();

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to open punch transaction");
        AttendanceError::Persistence(e)
    })?;

    // Seed the status row on first ever punch.
    sqlx::query(
        r#"
        INSERT IGNORE INTO attendance_status (employee_id, open_event_id)
        VALUES (?, NULL)
        "#,
    )
    .bind(employee_id)
    .execute(&mut *tx)
    .await?;

    let inserted = sqlx::query(
        r#"
        INSERT INTO attendance_events
            (employee_id, event_type, recorded_at, latitude, longitude, office_name, photo_ref)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(event_type.to_string())
    .bind(recorded_at)
    .bind(point.latitude)
    .bind(point.longitude)
    .bind(&office_name)
    .bind(&payload.photo_ref)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to append attendance event");
        AttendanceError::Persistence(e)
    })?;

    let event_id = inserted.last_insert_id();

    let cas = match event_type {
        EventType::CheckIn => {
            sqlx::query(
                r#"
                UPDATE attendance_status
                SET open_event_id = ?
                WHERE employee_id = ?
                AND open_event_id IS NULL
                "#,
            )
            .bind(event_id)
            .bind(employee_id)
            .execute(&mut *tx)
            .await?
        }
        EventType::CheckOut => {
            sqlx::query(
                r#"
                UPDATE attendance_status
                SET open_event_id = NULL
                WHERE employee_id = ?
                AND open_event_id IS NOT NULL
                "#,
            )
            .bind(employee_id)
            .execute(&mut *tx)
            .await?
        }
    };

    if cas.rows_affected() == 0 {
        // Roll the appended event back: rejected punches leave no trace.
        tx.rollback().await.ok();

        return Err(match event_type {
            EventType::CheckIn => AttendanceError::DuplicateCheckIn,
            EventType::CheckOut => AttendanceError::NoOpenCheckIn,
        });
    }

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to commit punch");
        AttendanceError::Persistence(e)
    })?;

    let date = recorded_at.date();
    cache
        .invalidate(&(employee_id, date.year(), date.month()))
        .await;

    tracing::info!(
        employee_id,
        event = %event_type,
        office = %office_name,
        "Punch recorded"
    );

    let message = match event_type {
        EventType::CheckIn => "Checked in successfully",
        EventType::CheckOut => "Checked out successfully",
    };

    Ok(PunchResponse {
        message: message.to_string(),
        in_office,
        office_name,
    })
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = PunchRequest,
    responses(
        (status = 200, description = "Checked in successfully", body = PunchResponse),
        (status = 400, description = "Malformed or out-of-range location"),
        (status = 409, description = "Already checked in", body = Object, example = json!({
            "message": "Already checked in"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    sites: web::Data<Vec<OfficeSite>>,
    cache: web::Data<SummaryCache>,
    payload: web::Json<PunchRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    let response = submit_punch(
        pool.get_ref(),
        sites.get_ref(),
        cache.get_ref(),
        employee_id,
        EventType::CheckIn,
        &payload,
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-out",
    request_body = PunchRequest,
    responses(
        (status = 200, description = "Checked out successfully", body = PunchResponse),
        (status = 400, description = "Malformed or out-of-range location"),
        (status = 409, description = "No open check-in", body = Object, example = json!({
            "message": "No open check-in"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    sites: web::Data<Vec<OfficeSite>>,
    cache: web::Data<SummaryCache>,
    payload: web::Json<PunchRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    let response = submit_punch(
        pool.get_ref(),
        sites.get_ref(),
        cache.get_ref(),
        employee_id,
        EventType::CheckOut,
        &payload,
    )
    .await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Current punch state, for the client's default action
#[utoipa::path(
    get,
    path = "/api/v1/attendance/status",
    responses(
        (status = 200, description = "Current punch state", body = CheckStatusResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn current_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    let open_event_id = sqlx::query_scalar::<_, Option<u64>>(
        "SELECT open_event_id FROM attendance_status WHERE employee_id = ?",
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch punch state");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?
    .flatten();

    let state = CheckState::from_open_event(open_event_id);

    Ok(HttpResponse::Ok().json(CheckStatusResponse {
        state: state.to_string(),
        next_action: state.next_action(),
    }))
}

/// Day-by-day classification for one month
#[utoipa::path(
    get,
    path = "/api/v1/attendance/log",
    params(MonthQuery),
    responses(
        (status = 200, description = "Day-by-day attendance log", body = DayLogResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_log(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    rules: web::Data<PresenceRules>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    validate_month(query.month)?;
    let employee_id = auth.resolve_target_employee(query.employee_id)?;

    let today = Local::now().date_naive();

    let joined = fetch_date_of_joining(pool.get_ref(), employee_id).await?;
    let schedule = fetch_schedule(pool.get_ref(), employee_id).await?;
    let holidays = fetch_holidays(pool.get_ref(), query.year, query.month).await?;
    let events = fetch_month_events(pool.get_ref(), employee_id, query.year, query.month).await?;

    let days = classify_month(
        query.year,
        query.month,
        today,
        Some(joined),
        &schedule,
        &holidays,
        &events,
        rules.get_ref(),
    )
    .into_iter()
    .map(|day| DayLogEntry {
        worked: day.worked_minutes.map(format_worked_duration),
        day,
    })
    .collect();

    Ok(HttpResponse::Ok().json(DayLogResponse {
        employee_id,
        year: query.year,
        month: query.month,
        days,
    }))
}

/// Monthly presence summary
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary",
    params(MonthQuery),
    responses(
        (status = 200, description = "Monthly presence summary", body = SummaryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    rules: web::Data<PresenceRules>,
    cache: web::Data<SummaryCache>,
    query: web::Query<MonthQuery>,
) -> actix_web::Result<impl Responder> {
    validate_month(query.month)?;
    let employee_id = auth.resolve_target_employee(query.employee_id)?;

    let today = Local::now().date_naive();
    let key = (employee_id, query.year, query.month);

    let summary = match cache.get(&key).await {
        Some(hit) => hit,
        None => {
            let computed = load_monthly_summary(
                pool.get_ref(),
                *rules.get_ref(),
                employee_id,
                query.year,
                query.month,
                today,
            )
            .await?;

            cache.insert(key, computed).await;
            computed
        }
    };

    Ok(HttpResponse::Ok().json(SummaryResponse {
        employee_id,
        year: query.year,
        month: query.month,
        summary,
    }))
}

/// Today's punches across the organisation (admin dashboard feed)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/recent",
    params(RecentQuery),
    responses(
        (status = 200, description = "Today's attendance events", body = RecentAttendanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn recent_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<RecentQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance_events WHERE DATE(recorded_at) = CURDATE()",
    )
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to count today's events");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data = sqlx::query_as::<_, AttendanceEvent>(
        r#"
        SELECT id, employee_id, event_type, recorded_at, latitude, longitude, office_name, photo_ref
        FROM attendance_events
        WHERE DATE(recorded_at) = CURDATE()
        ORDER BY recorded_at DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(per_page as i64)
    .bind(offset as i64)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch today's events");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(RecentAttendanceResponse {
        data,
        page,
        per_page,
        total,
    }))
}
