use crate::auth::auth::AuthUser;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{MySqlPool, prelude::FromRow};
use utoipa::{IntoParams, ToSchema};

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeaveType {
    Casual,
    Sick,
    Earned,
}

impl LeaveType {
    fn as_str(&self) -> &str {
        match self {
            LeaveType::Casual => "casual",
            LeaveType::Sick => "sick",
            LeaveType::Earned => "earned",
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2026-08-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-08-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "sick")]
    pub leave_type: LeaveType, // enum ensures Swagger dropdown
    #[schema(example = "Fever", nullable = true)]
    pub reason: Option<String>,
}

#[derive(Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-08-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-08-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "sick", value_type = String)]
    pub leave_type: String,
    #[schema(example = "Fever", nullable = true)]
    pub reason: Option<String>,
    #[schema(example = "pending", value_type = String)]
    pub status: Option<String>,
    #[schema(example = "2026-08-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveResponse>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by employee ID
    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
    /// Filter by leave status
    #[schema(example = "pending")]
    pub status: Option<String>,
    /// Pagination page number (start with 1)
    #[schema(example = 1)]
    pub page: Option<u64>,
    /// Pagination per page number
    #[schema(example = 10)]
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

/* =========================
Apply for leave
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted successfully",
         body = Object,
         example = json!({
            "message": "Leave request submitted",
            "status": "pending"
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee_id()?;

    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, start_date, end_date, leave_type, reason)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.leave_type.as_str())
    .bind(&payload.reason)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request submitted",
        "status": "pending"
    })))
}

/* =========================
Decide leave (HR/Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/{decision}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request"),
        ("decision" = String, Path, description = "approve or reject")
    ),
    responses(
        (status = 200, description = "Leave decision recorded", body = Object, example = json!({
            "message": "Leave approved"
        })),
        (status = 400, description = "Leave request not found or already processed", body = Object, example = json!({
            "message": "Leave request not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn decide_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<(u64, String)>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let (leave_id, decision) = path.into_inner();

    let new_status = match decision.as_str() {
        "approve" => "approved",
        "reject" => "rejected",
        _ => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Decision must be 'approve' or 'reject'"
            })));
        }
    };

    // Only pending requests may be decided; the WHERE guard makes the
    // decision idempotent under concurrent admins.
    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(new_status)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Leave decision failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Leave {}", new_status)
    })))
}

/// Leave request details
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let leave = sqlx::query_as::<_, LeaveResponse>(
        r#"
        SELECT
            id,
            employee_id,
            start_date,
            end_date,
            leave_type,
            reason,
            status,
            created_at
        FROM leave_requests
        WHERE id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match leave {
        Some(data) => {
            // Employees may only see their own requests.
            if auth.employee_id != Some(data.employee_id) {
                auth.require_hr_or_admin()?;
            }
            Ok(HttpResponse::Ok().json(data))
        }
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found"
        }))),
    }
}

/// Paginated leave listing
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    // Employees see their own history; HR/Admin may filter freely.
    let employee_filter = match auth.require_hr_or_admin() {
        Ok(()) => query.employee_id,
        Err(_) => Some(auth.require_employee_id()?),
    };

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = employee_filter {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error=%e, "Failed to count leave requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT id, employee_id, start_date, end_date, leave_type, reason, status, created_at
        FROM leave_requests
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveResponse>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error=%e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let response = LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}
