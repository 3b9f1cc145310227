use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::mysql::MySqlRow;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Punch direction, stored as a string column in `attendance_events`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    CheckIn,
    CheckOut,
}

/// One row of the append-only attendance ledger. Rows are never updated
/// or deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceEvent {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1000)]
    pub employee_id: u64,

    #[schema(example = "check_in")]
    pub event_type: EventType,

    #[schema(example = "2026-08-03T09:02:41", value_type = String, format = "date-time")]
    pub recorded_at: NaiveDateTime,

    #[schema(example = 12.94198577)]
    pub latitude: f64,

    #[schema(example = 80.21012198)]
    pub longitude: f64,

    /// Matched site name, or "Outside Office".
    #[schema(example = "Pallikaranai")]
    pub office_name: String,

    /// Opaque reference into the photo store.
    #[schema(example = "selfie/2026/08/03/1000-090241.jpg")]
    pub photo_ref: String,
}

impl<'r> sqlx::FromRow<'r, MySqlRow> for AttendanceEvent {
    fn from_row(row: &'r MySqlRow) -> Result<Self, sqlx::Error> {
        let event_type: String = row.try_get("event_type")?;
        let event_type = event_type
            .parse::<EventType>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "event_type".to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            employee_id: row.try_get("employee_id")?,
            event_type,
            recorded_at: row.try_get("recorded_at")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            office_name: row.try_get("office_name")?,
            photo_ref: row.try_get("photo_ref")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_db_string_round_trip() {
        assert_eq!(EventType::CheckIn.to_string(), "check_in");
        assert_eq!(EventType::CheckOut.to_string(), "check_out");
        assert_eq!("check_in".parse::<EventType>().unwrap(), EventType::CheckIn);
        assert_eq!(
            "check_out".parse::<EventType>().unwrap(),
            EventType::CheckOut
        );
        assert!("checked_in".parse::<EventType>().is_err());
    }

    #[test]
    fn event_type_serde_snake_case() {
        let t: EventType = serde_json::from_str("\"check_out\"").unwrap();
        assert_eq!(t, EventType::CheckOut);
        assert_eq!(
            serde_json::to_value(EventType::CheckIn).unwrap(),
            serde_json::json!("check_in")
        );
    }
}
