use strum_macros::{Display, EnumString};

use crate::attendance::error::AttendanceError;
use crate::model::attendance::EventType;

/// Per-employee punch state. Persisted as `attendance_status.open_event_id`
/// (NULL = Out) and advanced with a compare-and-swap UPDATE so concurrent
/// punches from the same employee cannot both commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum CheckState {
    Out,
    In,
}

impl CheckState {
    pub fn from_open_event(open_event_id: Option<u64>) -> Self {
        if open_event_id.is_some() {
            CheckState::In
        } else {
            CheckState::Out
        }
    }

    /// The transition an incoming event requests. Out-of-order events are
    /// rejected rather than recorded.
    pub fn apply(self, event: EventType) -> Result<CheckState, AttendanceError> {
        match (self, event) {
            (CheckState::Out, EventType::CheckIn) => Ok(CheckState::In),
            (CheckState::In, EventType::CheckOut) => Ok(CheckState::Out),
            (CheckState::In, EventType::CheckIn) => Err(AttendanceError::DuplicateCheckIn),
            (CheckState::Out, EventType::CheckOut) => Err(AttendanceError::NoOpenCheckIn),
        }
    }

    /// Default next action shown to the employee.
    pub fn next_action(self) -> EventType {
        match self {
            CheckState::Out => EventType::CheckIn,
            CheckState::In => EventType::CheckOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_cycle_is_accepted() {
        let state = CheckState::Out;
        let state = state.apply(EventType::CheckIn).unwrap();
        assert_eq!(state, CheckState::In);
        let state = state.apply(EventType::CheckOut).unwrap();
        assert_eq!(state, CheckState::Out);
    }

    #[test]
    fn double_check_in_is_rejected() {
        let state = CheckState::In;
        match state.apply(EventType::CheckIn) {
            Err(AttendanceError::DuplicateCheckIn) => {}
            other => panic!("expected DuplicateCheckIn, got {:?}", other),
        }
    }

    #[test]
    fn check_out_without_open_check_in_is_rejected() {
        let state = CheckState::Out;
        match state.apply(EventType::CheckOut) {
            Err(AttendanceError::NoOpenCheckIn) => {}
            other => panic!("expected NoOpenCheckIn, got {:?}", other),
        }
    }

    #[test]
    fn state_derives_from_persisted_open_event() {
        assert_eq!(CheckState::from_open_event(None), CheckState::Out);
        assert_eq!(CheckState::from_open_event(Some(42)), CheckState::In);
    }

    #[test]
    fn next_action_flips_with_state() {
        assert_eq!(CheckState::Out.next_action(), EventType::CheckIn);
        assert_eq!(CheckState::In.next_action(), EventType::CheckOut);
    }
}
