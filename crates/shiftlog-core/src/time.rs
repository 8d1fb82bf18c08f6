use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Month key in `YYYY-MM` form, zero-padded. Records and goals are
/// joined on this key.
pub fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Weekday {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sun,
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Sun => "Sun",
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
        }
    }

    /// Bucket index with Sunday at 0.
    pub fn index(self) -> usize {
        match self {
            Weekday::Sun => 0,
            Weekday::Mon => 1,
            Weekday::Tue => 2,
            Weekday::Wed => 3,
            Weekday::Thu => 4,
            Weekday::Fri => 5,
            Weekday::Sat => 6,
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Sun => Weekday::Sun,
            chrono::Weekday::Mon => Weekday::Mon,
            chrono::Weekday::Tue => Weekday::Tue,
            chrono::Weekday::Wed => Weekday::Wed,
            chrono::Weekday::Thu => Weekday::Thu,
            chrono::Weekday::Fri => Weekday::Fri,
            chrono::Weekday::Sat => Weekday::Sat,
        }
    }
}

/// Shift length in hours. An end time earlier than the start means the
/// shift crossed midnight, so a nominal day is added before differencing.
/// Identical times are a legal zero-length shift.
pub fn shift_duration_hours(start: NaiveTime, end: NaiveTime) -> f64 {
    let mut seconds = (end - start).num_seconds();
    if seconds < 0 {
        seconds += 86_400;
    }
    seconds as f64 / 3600.0
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeCategory {
    LateNight,
    Morning,
    Afternoon,
    Evening,
}

impl TimeCategory {
    /// Contiguous partition of [0,24): [0,6) [6,12) [12,17) [17,24).
    pub fn from_start_hour(hour: u32) -> Self {
        if hour < 6 {
            TimeCategory::LateNight
        } else if hour < 12 {
            TimeCategory::Morning
        } else if hour < 17 {
            TimeCategory::Afternoon
        } else {
            TimeCategory::Evening
        }
    }

    pub fn of(start: NaiveTime) -> Self {
        Self::from_start_hour(start.hour())
    }
}
