use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An event overlapping the target date, as seen by the forecast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub name: String,
    pub impact_percent: i32,
}

/// Inclusive date interval; an absent end means the event is open-ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWindow {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl EventWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && self.end.map_or(true, |end| date <= end)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::EventWindow;

    fn day(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let window = EventWindow { start: day("2024-12-20"), end: Some(day("2024-12-24")) };

        assert!(window.contains(day("2024-12-20")));
        assert!(window.contains(day("2024-12-24")));
        assert!(!window.contains(day("2024-12-25")));
        assert!(!window.contains(day("2024-12-19")));
    }

    #[test]
    fn open_window_never_ends() {
        let window = EventWindow { start: day("2024-06-01"), end: None };

        assert!(window.contains(day("2031-01-01")));
        assert!(!window.contains(day("2024-05-31")));
    }
}
