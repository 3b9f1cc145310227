use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

use crate::model::attendance::{AttendanceEvent, EventType};
use crate::model::schedule::WeeklySchedule;

/// Lateness rules, defined in exactly one place. A check-in is measured
/// against the scheduled start plus `grace_minutes`; once the overshoot
/// reaches `half_day_threshold_minutes` the day degrades to a half day.
#[derive(Debug, Clone, Copy)]
pub struct PresenceRules {
    pub grace_minutes: i64,
    pub half_day_threshold_minutes: i64,
}

impl Default for PresenceRules {
    fn default() -> Self {
        Self {
            grace_minutes: 10,
            half_day_threshold_minutes: 60,
        }
    }
}

/// Derived status of one elapsed calendar day. `Late` and `HalfDay` still
/// count as present for the monthly totals; `Late` is a sub-flag of
/// presence, not an absence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, ToSchema)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DayStatus {
    Present,
    Late,
    HalfDay,
    Absent,
    Leave,
}

/// Classification of a single day, computed on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DayClassification {
    #[schema(example = "2026-08-03", value_type = String, format = "date")]
    pub date: NaiveDate,

    pub status: DayStatus,

    pub check_in: Option<AttendanceEvent>,

    pub check_out: Option<AttendanceEvent>,

    /// Whole minutes between check-in and check-out, when both exist.
    #[schema(example = 525, nullable = true)]
    pub worked_minutes: Option<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct MonthlyPresenceSummary {
    #[schema(example = 22)]
    pub total_days: u32,
    #[schema(example = 20)]
    pub working_days: u32,
    #[schema(example = 18)]
    pub present_days: u32,
    #[schema(example = 2)]
    pub absent_days: u32,
    #[schema(example = 2)]
    pub leave_days: u32,
    #[schema(example = 3)]
    pub late_days: u32,
    #[schema(example = 1)]
    pub half_days: u32,
}

/// Classifies one calendar day from its raw events plus the weekly
/// schedule and the holiday calendar. Pure and deterministic: identical
/// input always yields an identical classification.
pub fn classify_day(
    date: NaiveDate,
    schedule: &WeeklySchedule,
    holidays: &[NaiveDate],
    day_events: &[AttendanceEvent],
    rules: &PresenceRules,
) -> DayClassification {
    let entry = schedule.entry_for(date.weekday());

    let check_in = day_events
        .iter()
        .filter(|e| e.event_type == EventType::CheckIn)
        .min_by_key(|e| e.recorded_at)
        .cloned();
    let check_out = day_events
        .iter()
        .filter(|e| e.event_type == EventType::CheckOut)
        .max_by_key(|e| e.recorded_at)
        .cloned();

    let worked_minutes = match (&check_in, &check_out) {
        (Some(cin), Some(cout)) => Some(
            (cout.recorded_at - cin.recorded_at)
                .num_minutes()
                .max(0),
        ),
        _ => None,
    };

    let status = if holidays.contains(&date) || entry.is_leave_day {
        DayStatus::Leave
    } else {
        match &check_in {
            None => DayStatus::Absent,
            Some(cin) => match entry.start_time {
                None => DayStatus::Present,
                Some(start) => {
                    let scheduled = date.and_time(start)
                        + chrono::Duration::minutes(rules.grace_minutes);
                    let diff_minutes = (cin.recorded_at - scheduled).num_minutes();

                    if diff_minutes >= rules.half_day_threshold_minutes {
                        DayStatus::HalfDay
                    } else if diff_minutes > 0 {
                        DayStatus::Late
                    } else {
                        DayStatus::Present
                    }
                }
            },
        }
    };

    DayClassification {
        date,
        status,
        check_in,
        check_out,
        worked_minutes,
    }
}

/// Classifies every elapsed day of the month: from the later of the month
/// start and `date_of_joining`, up to the earlier of the month end and
/// `today`. Future days are not emitted at all.
pub fn classify_month(
    year: i32,
    month: u32,
    today: NaiveDate,
    date_of_joining: Option<NaiveDate>,
    schedule: &WeeklySchedule,
    holidays: &[NaiveDate],
    events: &[AttendanceEvent],
    rules: &PresenceRules,
) -> Vec<DayClassification> {
    let Some(month_start) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };

    let mut start = month_start;
    if let Some(joined) = date_of_joining {
        start = start.max(joined);
    }
    let end = month_end(year, month).min(today);

    let mut days = Vec::new();
    let mut date = start;
    while date <= end {
        let day_events: Vec<AttendanceEvent> = events
            .iter()
            .filter(|e| e.recorded_at.date() == date)
            .cloned()
            .collect();

        days.push(classify_day(date, schedule, holidays, &day_events, rules));

        match date.succ_opt() {
            Some(next) => date = next,
            None => break,
        }
    }

    days
}

/// Rolls a month of classifications up into summary counts. The counts
/// satisfy `present + absent == working` and `working + leave == total`.
pub fn summarize(
    year: i32,
    month: u32,
    today: NaiveDate,
    date_of_joining: Option<NaiveDate>,
    schedule: &WeeklySchedule,
    holidays: &[NaiveDate],
    events: &[AttendanceEvent],
    rules: &PresenceRules,
) -> MonthlyPresenceSummary {
    let days = classify_month(
        year,
        month,
        today,
        date_of_joining,
        schedule,
        holidays,
        events,
        rules,
    );

    let mut summary = MonthlyPresenceSummary {
        total_days: days.len() as u32,
        ..Default::default()
    };

    for day in &days {
        match day.status {
            DayStatus::Leave => summary.leave_days += 1,
            DayStatus::Absent => summary.absent_days += 1,
            DayStatus::Present => summary.present_days += 1,
            DayStatus::Late => {
                summary.present_days += 1;
                summary.late_days += 1;
            }
            DayStatus::HalfDay => {
                summary.present_days += 1;
                summary.half_days += 1;
            }
        }
    }

    summary.working_days = summary.total_days - summary.leave_days;
    summary
}

/// Last calendar day of the given month.
pub fn month_end(year: i32, month: u32) -> NaiveDate {
    let next_month_start = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    next_month_start
        .and_then(|d| d.pred_opt())
        .expect("valid month")
}

/// Formats a worked duration as "Xh Ym"; hours truncate, never round.
pub fn format_worked_duration(minutes: i64) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn event(id: u64, event_type: EventType, at: &str) -> AttendanceEvent {
        AttendanceEvent {
            id,
            employee_id: 1000,
            event_type,
            recorded_at: NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M:%S").unwrap(),
            latitude: 12.94198577,
            longitude: 80.21012198,
            office_name: "Pallikaranai".to_string(),
            photo_ref: "selfie/test.jpg".to_string(),
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn rules() -> PresenceRules {
        PresenceRules::default()
    }

    // 2025-09-01 is a Monday; September 2025 has exactly 22 weekdays.
    const YEAR: i32 = 2025;
    const MONTH: u32 = 9;

    #[test]
    fn check_in_within_grace_is_present() {
        let schedule = WeeklySchedule::default_template();
        let events = vec![event(1, EventType::CheckIn, "2025-09-01 09:05:00")];

        let day = classify_day(date("2025-09-01"), &schedule, &[], &events, &rules());
        assert_eq!(day.status, DayStatus::Present);
    }

    #[test]
    fn check_in_past_grace_is_late() {
        let schedule = WeeklySchedule::default_template();
        let events = vec![event(1, EventType::CheckIn, "2025-09-01 09:25:00")];

        let day = classify_day(date("2025-09-01"), &schedule, &[], &events, &rules());
        assert_eq!(day.status, DayStatus::Late);
    }

    #[test]
    fn check_in_an_hour_past_grace_is_half_day() {
        let schedule = WeeklySchedule::default_template();
        let events = vec![event(1, EventType::CheckIn, "2025-09-01 10:15:00")];

        let day = classify_day(date("2025-09-01"), &schedule, &[], &events, &rules());
        assert_eq!(day.status, DayStatus::HalfDay);
    }

    #[test]
    fn no_check_in_on_working_day_is_absent() {
        let schedule = WeeklySchedule::default_template();
        let day = classify_day(date("2025-09-01"), &schedule, &[], &[], &rules());
        assert_eq!(day.status, DayStatus::Absent);
    }

    #[test]
    fn holiday_wins_over_everything() {
        let schedule = WeeklySchedule::default_template();
        let holidays = vec![date("2025-09-01")];
        let events = vec![event(1, EventType::CheckIn, "2025-09-01 09:00:00")];

        let day = classify_day(date("2025-09-01"), &schedule, &holidays, &events, &rules());
        assert_eq!(day.status, DayStatus::Leave);
    }

    #[test]
    fn rest_day_is_leave() {
        let schedule = WeeklySchedule::default_template();
        // 2025-09-06 is a Saturday.
        let day = classify_day(date("2025-09-06"), &schedule, &[], &[], &rules());
        assert_eq!(day.status, DayStatus::Leave);
    }

    #[test]
    fn worked_minutes_span_first_in_to_last_out() {
        let schedule = WeeklySchedule::default_template();
        let events = vec![
            event(1, EventType::CheckIn, "2025-09-01 09:02:00"),
            event(2, EventType::CheckOut, "2025-09-01 13:00:00"),
            event(3, EventType::CheckIn, "2025-09-01 14:00:00"),
            event(4, EventType::CheckOut, "2025-09-01 18:17:00"),
        ];

        let day = classify_day(date("2025-09-01"), &schedule, &[], &events, &rules());
        assert_eq!(day.check_in.as_ref().unwrap().id, 1);
        assert_eq!(day.check_out.as_ref().unwrap().id, 4);
        assert_eq!(day.worked_minutes, Some(9 * 60 + 15));
    }

    #[test]
    fn classify_day_is_idempotent() {
        let schedule = WeeklySchedule::default_template();
        let events = vec![
            event(1, EventType::CheckIn, "2025-09-01 09:40:00"),
            event(2, EventType::CheckOut, "2025-09-01 18:00:00"),
        ];

        let first = classify_day(date("2025-09-01"), &schedule, &[], &events, &rules());
        let second = classify_day(date("2025-09-01"), &schedule, &[], &events, &rules());
        assert_eq!(first, second);
    }

    #[test]
    fn month_with_no_events_is_fully_absent() {
        let schedule = WeeklySchedule::default_template();
        let today = date("2025-10-15"); // month fully elapsed

        let summary = summarize(YEAR, MONTH, today, None, &schedule, &[], &[], &rules());

        assert_eq!(summary.total_days, 30);
        assert_eq!(summary.working_days, 22);
        assert_eq!(summary.present_days, 0);
        assert_eq!(summary.absent_days, 22);
        assert_eq!(summary.leave_days, 8);
    }

    #[test]
    fn current_month_counts_only_elapsed_days() {
        let schedule = WeeklySchedule::default_template();
        let today = date("2025-09-10");

        let summary = summarize(YEAR, MONTH, today, None, &schedule, &[], &[], &rules());
        assert_eq!(summary.total_days, 10);
    }

    #[test]
    fn days_before_joining_are_excluded() {
        let schedule = WeeklySchedule::default_template();
        let today = date("2025-10-15");
        let joined = date("2025-09-15");

        let summary = summarize(
            YEAR,
            MONTH,
            today,
            Some(joined),
            &schedule,
            &[],
            &[],
            &rules(),
        );

        // 15th..30th inclusive.
        assert_eq!(summary.total_days, 16);
        assert_eq!(summary.working_days + summary.leave_days, summary.total_days);
    }

    #[test]
    fn summary_identities_hold() {
        let schedule = WeeklySchedule::default_template();
        let today = date("2025-10-15");
        let holidays = vec![date("2025-09-05")];
        let events = vec![
            event(1, EventType::CheckIn, "2025-09-01 09:05:00"),
            event(2, EventType::CheckOut, "2025-09-01 18:00:00"),
            event(3, EventType::CheckIn, "2025-09-02 09:45:00"), // late
            event(4, EventType::CheckOut, "2025-09-02 18:00:00"),
            event(5, EventType::CheckIn, "2025-09-03 11:00:00"), // half day
            event(6, EventType::CheckOut, "2025-09-03 18:00:00"),
        ];

        let summary = summarize(
            YEAR,
            MONTH,
            today,
            None,
            &schedule,
            &holidays,
            &events,
            &rules(),
        );

        assert_eq!(
            summary.present_days + summary.absent_days,
            summary.working_days
        );
        assert_eq!(summary.working_days + summary.leave_days, summary.total_days);

        assert_eq!(summary.present_days, 3);
        assert_eq!(summary.late_days, 1);
        assert_eq!(summary.half_days, 1);
        assert_eq!(summary.leave_days, 9); // 8 weekend days + 1 holiday
        assert_eq!(summary.working_days, 21);
        assert_eq!(summary.absent_days, 18);
    }

    #[test]
    fn events_on_leave_days_do_not_create_working_days() {
        let schedule = WeeklySchedule::default_template();
        let today = date("2025-10-15");
        // Check-in on a Saturday.
        let events = vec![event(1, EventType::CheckIn, "2025-09-06 10:00:00")];

        let summary = summarize(YEAR, MONTH, today, None, &schedule, &[], &events, &rules());
        assert_eq!(summary.present_days, 0);
        assert_eq!(summary.working_days, 22);
    }

    #[test]
    fn month_end_handles_december() {
        assert_eq!(month_end(2025, 12), date("2025-12-31"));
        assert_eq!(month_end(2024, 2), date("2024-02-29"));
        assert_eq!(month_end(2025, 9), date("2025-09-30"));
    }

    #[test]
    fn duration_formatting_truncates() {
        assert_eq!(format_worked_duration(0), "0h 0m");
        assert_eq!(format_worked_duration(59), "0h 59m");
        assert_eq!(format_worked_duration(525), "8h 45m");
        assert_eq!(format_worked_duration(9 * 60 + 59), "9h 59m");
    }
}
