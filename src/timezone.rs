use common::DateTime;

/// Shift a UTC reading into local time.
///
/// Only the hour wraps. The day moves by at most one in either direction and
/// is never checked against the month length, so the result may carry day 0
/// or day 32.
pub fn local_date_time(utc: DateTime, offset: i32, is_summer: bool) -> DateTime {
    let mut local = utc;
    local.hour += offset + i32::from(is_summer);

    if local.hour >= 24 {
        local.hour -= 24;
        local.day += 1;
    } else if local.hour < 0 {
        local.hour += 24;
        local.day -= 1;
    }

    local
}
