use crate::api::attendance::{
    CheckStatusResponse, DayLogEntry, DayLogResponse, MonthQuery, PunchRequest, PunchResponse,
    RecentAttendanceResponse, RecentQuery, SummaryResponse,
};
use crate::api::employee::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::holiday::{CreateHoliday, HolidayQuery};
use crate::api::leave_request::{
    CreateLeave, LeaveFilter, LeaveListResponse, LeaveResponse, LeaveType,
};
use crate::api::payroll::{
    GeneratePayslip, PaginatedPayslipResponse, PayslipQuery, PayslipResponse,
};
use crate::api::schedule::ReplaceSchedule;
use crate::attendance::presence::{DayClassification, DayStatus, MonthlyPresenceSummary};
use crate::attendance::sites::OfficeSite;
use crate::auth::handlers::PendingUserResponse;
use crate::model::attendance::{AttendanceEvent, EventType};
use crate::model::employee::Employee;
use crate::model::holiday::Holiday;
use crate::model::schedule::{ScheduleEntry, WeeklySchedule};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "GeoAttend API",
        version = "1.0.0",
        description = r#"
## Geofenced Attendance & HR Administration

This API powers an employee attendance system with geofenced check-in and
the HR administration around it.

### 🔹 Key Features
- **Attendance Tracking**
  - Check-in/check-out with GPS location and selfie photo reference
  - Office matching against registered sites (haversine geofence)
  - Day-by-day presence log and monthly summaries (present/late/half-day/absent/leave)
- **Employee Management**
  - Self-registration with admin approval, profile CRUD
- **Schedules & Holidays**
  - Per-employee weekly schedules and a global holiday calendar
- **Leave Management**
  - Apply for leave, approve/reject requests
- **Payroll**
  - Payslips derived from monthly attendance aggregates

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Only authorized roles such as **Admin** or **HR** can access sensitive operations.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::current_status,
        crate::api::attendance::attendance_log,
        crate::api::attendance::attendance_summary,
        crate::api::attendance::recent_attendance,

        crate::auth::handlers::pending_users,
        crate::auth::handlers::approve_user,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::schedule::get_schedule,
        crate::api::schedule::put_schedule,

        crate::api::holiday::list_holidays,
        crate::api::holiday::create_holiday,
        crate::api::holiday::delete_holiday,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::decide_leave,

        crate::api::payroll::generate_payslip,
        crate::api::payroll::get_payslip,
        crate::api::payroll::list_payslips
    ),
    components(
        schemas(
            PunchRequest,
            PunchResponse,
            CheckStatusResponse,
            MonthQuery,
            DayLogEntry,
            DayLogResponse,
            SummaryResponse,
            RecentQuery,
            RecentAttendanceResponse,
            AttendanceEvent,
            EventType,
            DayClassification,
            DayStatus,
            MonthlyPresenceSummary,
            OfficeSite,
            PendingUserResponse,
            CreateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            Employee,
            ScheduleEntry,
            WeeklySchedule,
            ReplaceSchedule,
            Holiday,
            CreateHoliday,
            HolidayQuery,
            LeaveType,
            LeaveFilter,
            LeaveResponse,
            LeaveListResponse,
            CreateLeave,
            GeneratePayslip,
            PayslipResponse,
            PaginatedPayslipResponse,
            PayslipQuery
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Geofenced check-in/check-out and presence reporting"),
        (name = "Users", description = "Registration approval APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Schedule", description = "Weekly schedule APIs"),
        (name = "Holiday", description = "Holiday calendar APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Payroll", description = "Payroll management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
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
