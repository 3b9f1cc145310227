use chrono::{NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Working hours for one weekday. `weekday` is 0 = Monday .. 6 = Sunday,
/// matching `Weekday::num_days_from_monday`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct ScheduleEntry {
    #[schema(example = 0, minimum = 0, maximum = 6)]
    pub weekday: u8,

    #[schema(example = "09:00:00", value_type = String, format = "time", nullable = true)]
    pub start_time: Option<NaiveTime>,

    #[schema(example = "18:00:00", value_type = String, format = "time", nullable = true)]
    pub end_time: Option<NaiveTime>,

    #[schema(example = false)]
    pub is_leave_day: bool,
}

/// One employee's weekly working pattern. Weekdays without a stored entry
/// fall back to the default template, so a sparse schedule still covers
/// all seven days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WeeklySchedule {
    pub entries: Vec<ScheduleEntry>,
}

impl WeeklySchedule {
    /// Company default: Monday to Friday 09:00-18:00, weekend off.
    pub fn default_template() -> Self {
        let mut entries: Vec<ScheduleEntry> = (0..5u8)
            .map(|weekday| ScheduleEntry {
                weekday,
                start_time: NaiveTime::from_hms_opt(9, 0, 0),
                end_time: NaiveTime::from_hms_opt(18, 0, 0),
                is_leave_day: false,
            })
            .collect();

        for weekday in 5..7u8 {
            entries.push(ScheduleEntry {
                weekday,
                start_time: None,
                end_time: None,
                is_leave_day: true,
            });
        }

        Self { entries }
    }

    pub fn from_entries(entries: Vec<ScheduleEntry>) -> Self {
        Self { entries }
    }

    pub fn entry_for(&self, weekday: Weekday) -> ScheduleEntry {
        let idx = weekday.num_days_from_monday() as u8;

        self.entries
            .iter()
            .find(|e| e.weekday == idx)
            .cloned()
            .unwrap_or_else(|| {
                Self::default_template()
                    .entries
                    .into_iter()
                    .find(|e| e.weekday == idx)
                    .unwrap_or(ScheduleEntry {
                        weekday: idx,
                        start_time: None,
                        end_time: None,
                        is_leave_day: true,
                    })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_covers_all_seven_days() {
        let schedule = WeeklySchedule::default_template();
        assert_eq!(schedule.entries.len(), 7);

        let monday = schedule.entry_for(Weekday::Mon);
        assert!(!monday.is_leave_day);
        assert_eq!(monday.start_time, NaiveTime::from_hms_opt(9, 0, 0));

        assert!(schedule.entry_for(Weekday::Sat).is_leave_day);
        assert!(schedule.entry_for(Weekday::Sun).is_leave_day);
    }

    #[test]
    fn missing_weekday_falls_back_to_template() {
        // Only Monday stored; the rest should come from the template.
        let schedule = WeeklySchedule::from_entries(vec![ScheduleEntry {
            weekday: 0,
            start_time: NaiveTime::from_hms_opt(10, 0, 0),
            end_time: NaiveTime::from_hms_opt(19, 0, 0),
            is_leave_day: false,
        }]);

        assert_eq!(
            schedule.entry_for(Weekday::Mon).start_time,
            NaiveTime::from_hms_opt(10, 0, 0)
        );
        assert_eq!(
            schedule.entry_for(Weekday::Tue).start_time,
            NaiveTime::from_hms_opt(9, 0, 0)
        );
        assert!(schedule.entry_for(Weekday::Sun).is_leave_day);
    }
}
