use core::fmt;

use serde::{Deserialize, Serialize};

// Accepted time zone offsets in whole hours
pub const MIN_TIME_ZONE_OFFSET: i32 = -12;
pub const MAX_TIME_ZONE_OFFSET: i32 = 14;

/// A calendar date and wall-clock time as reported by the navigation module.
///
/// Fields are kept as plain signed integers. A local time derived from UTC
/// may carry a day of 0 or one past the end of the month, since shifting the
/// hour only ever moves the day by one and never touches month or year.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateTime {
    pub year: i32,
    pub month: i32,
    pub day: i32,
    pub hour: i32,
    pub minute: i32,
    pub second: i32,
}

impl DateTime {
    pub fn new(year: i32, month: i32, day: i32, hour: i32, minute: i32, second: i32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }
}

/// Console form: `HH:MM:SS DD/MM/YY`
impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02} {:02}/{:02}/{:02}",
            self.hour,
            self.minute,
            self.second,
            self.day,
            self.month,
            self.year.rem_euclid(100)
        )
    }
}

/// User settings that survive a power cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Hours east of UTC
    pub time_zone_offset: i32,
    pub is_summer_time: bool,
}

impl Settings {
    pub const fn is_valid_offset(offset: i32) -> bool {
        offset >= MIN_TIME_ZONE_OFFSET && offset <= MAX_TIME_ZONE_OFFSET
    }

    pub const fn is_valid(&self) -> bool {
        Self::is_valid_offset(self.time_zone_offset)
    }
}

/// UTC+2 without daylight saving
impl Default for Settings {
    fn default() -> Self {
        Self {
            time_zone_offset: 2,
            is_summer_time: false,
        }
    }
}

/// What the console shows each refresh. The 7-segment display always shows
/// local time regardless of the mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Echo every byte from the navigation module
    Raw,
    #[default]
    Clock,
    OffsetReport,
    DaylightReport,
}

impl Mode {
    pub fn prints_time(&self) -> bool {
        !matches!(self, Mode::Raw)
    }
}
