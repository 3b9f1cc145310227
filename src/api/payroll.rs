use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

use crate::api::attendance::load_monthly_summary;
use crate::attendance::presence::{MonthlyPresenceSummary, PresenceRules};
use crate::auth::auth::AuthUser;

#[derive(Deserialize, ToSchema)]
pub struct GeneratePayslip {
    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = 2026)]
    pub year: i32,

    #[schema(example = 7)]
    pub month: u32,

    #[schema(example = 50000.0)]
    pub base_salary: f64,

    #[schema(example = 5000.0)]
    pub bonus: f64,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct PayslipResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = "2026-07-01", value_type = String, format = "date")]
    pub month: NaiveDate,

    #[schema(example = 50000.0)]
    pub base_salary: f64,
    #[schema(example = 5000.0)]
    pub bonus: f64,
    #[schema(example = 3409.09)]
    pub deductions: f64,
    #[schema(example = 51590.91)]
    pub net_salary: f64,

    #[schema(example = 22)]
    pub working_days: u32,
    #[schema(example = 20)]
    pub present_days: u32,
    #[schema(example = 3)]
    pub late_days: u32,
    #[schema(example = 1)]
    pub half_days: u32,
    #[schema(example = 2)]
    pub absent_days: u32,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayslipQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,

    #[schema(example = 1000)]
    pub employee_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedPayslipResponse {
    pub data: Vec<PayslipResponse>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Absence deductions for one month: each absent day costs one per-day
/// rate, each half day costs half of it. Late days carry no deduction.
fn absence_deductions(base_salary: f64, summary: &MonthlyPresenceSummary) -> f64 {
    if summary.working_days == 0 {
        return 0.0;
    }

    let per_day = base_salary / summary.working_days as f64;
    per_day * (summary.absent_days as f64 + summary.half_days as f64 * 0.5)
}

/// Generate a payslip from the month's presence summary
#[utoipa::path(
    post,
    path = "/api/v1/payroll/generate",
    request_body = GeneratePayslip,
    responses(
        (status = 201, description = "Payslip generated", body = PayslipResponse),
        (status = 400, description = "Month not finished or invalid"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Payslip already generated for that month"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn generate_payslip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    rules: web::Data<PresenceRules>,
    payload: web::Json<GeneratePayslip>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if !(1..=12).contains(&payload.month) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "month must be 1..=12"
        })));
    }

    let today = Local::now().date_naive();
    let month_start = NaiveDate::from_ymd_opt(payload.year, payload.month, 1)
        .ok_or_else(|| actix_web::error::ErrorBadRequest("Invalid year/month"))?;

    // Payslips are only cut for finished months.
    if (today.year(), today.month()) <= (payload.year, payload.month) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Cannot generate a payslip before the month has ended"
        })));
    }

    let summary = load_monthly_summary(
        pool.get_ref(),
        *rules.get_ref(),
        payload.employee_id,
        payload.year,
        payload.month,
        today,
    )
    .await?;

    let deductions = absence_deductions(payload.base_salary, &summary);
    let net_salary = payload.base_salary + payload.bonus - deductions;

    let result = sqlx::query(
        r#"
        INSERT INTO payroll
            (employee_id, month, base_salary, bonus, deductions, net_salary,
             working_days, present_days, late_days, half_days, absent_days)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(month_start)
    .bind(payload.base_salary)
    .bind(payload.bonus)
    .bind(deductions)
    .bind(net_salary)
    .bind(summary.working_days)
    .bind(summary.present_days)
    .bind(summary.late_days)
    .bind(summary.half_days)
    .bind(summary.absent_days)
    .execute(pool.get_ref())
    .await;

    let payslip_id = match result {
        Ok(res) => res.last_insert_id(),
        Err(e) => {
            // Unique (employee_id, month) index
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(serde_json::json!({
                        "message": "Payslip already generated for that month"
                    })));
                }
            }

            tracing::error!(error = %e, employee_id = payload.employee_id, "Failed to store payslip");
            return Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ));
        }
    };

    tracing::info!(
        employee_id = payload.employee_id,
        payslip_id,
        year = payload.year,
        month = payload.month,
        "Payslip generated"
    );

    Ok(HttpResponse::Created().json(PayslipResponse {
        id: payslip_id,
        employee_id: payload.employee_id,
        month: month_start,
        base_salary: payload.base_salary,
        bonus: payload.bonus,
        deductions,
        net_salary,
        working_days: summary.working_days,
        present_days: summary.present_days,
        late_days: summary.late_days,
        half_days: summary.half_days,
        absent_days: summary.absent_days,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll/{payslip_id}",
    params(
        ("payslip_id", description = "Payslip ID")
    ),
    responses(
        (status = 200, body = PayslipResponse),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payslip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let payslip_id = path.into_inner();

    let payslip = sqlx::query_as::<_, PayslipResponse>(
        r#"
        SELECT id, employee_id, month, base_salary, bonus, deductions, net_salary,
               working_days, present_days, late_days, half_days, absent_days
        FROM payroll
        WHERE id = ?
        "#,
    )
    .bind(payslip_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, payslip_id, "Failed to fetch payslip");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match payslip {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Payslip not found"
        }))),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PayslipQuery),
    responses(
        (status = 200, body = PaginatedPayslipResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payslips(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PayslipQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let (where_sql, employee_bind) = match query.employee_id {
        Some(id) => (" WHERE employee_id = ?", Some(id)),
        None => ("", None),
    };

    let count_sql = format!("SELECT COUNT(*) FROM payroll{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(id) = employee_bind {
        count_q = count_q.bind(id);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count payslips");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, month, base_salary, bonus, deductions, net_salary,
               working_days, present_days, late_days, half_days, absent_days
        FROM payroll
        {}
        ORDER BY month DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, PayslipResponse>(&data_sql);
    if let Some(id) = employee_bind {
        data_q = data_q.bind(id);
    }

    let data = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch payslip list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(PaginatedPayslipResponse {
        data,
        page,
        per_page,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(working: u32, absent: u32, half: u32) -> MonthlyPresenceSummary {
        MonthlyPresenceSummary {
            total_days: working,
            working_days: working,
            present_days: working - absent,
            absent_days: absent,
            half_days: half,
            ..Default::default()
        }
    }

    #[test]
    fn full_attendance_deducts_nothing() {
        let d = absence_deductions(44000.0, &summary(22, 0, 0));
        assert_eq!(d, 0.0);
    }

    #[test]
    fn absent_days_deduct_a_full_day_rate() {
        // 22 working days at 44000 => 2000 per day.
        let d = absence_deductions(44000.0, &summary(22, 2, 0));
        assert!((d - 4000.0).abs() < 1e-9);
    }

    #[test]
    fn half_days_deduct_half_a_day_rate() {
        let d = absence_deductions(44000.0, &summary(22, 0, 3));
        assert!((d - 3000.0).abs() < 1e-9);
    }

    #[test]
    fn zero_working_days_deducts_nothing() {
        let d = absence_deductions(44000.0, &summary(0, 0, 0));
        assert_eq!(d, 0.0);
    }
}
