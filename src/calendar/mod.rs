//! Calendar value types.
//!
//! Naive local time on the proleptic Gregorian calendar: no time zones, no
//! daylight saving, no leap seconds. Dates run from 2000-01-01 to
//! 2105-12-31 23:59:59; conversions and arithmetic clamp to that range.

pub mod datetime;
pub mod timespan;

pub use datetime::DateTime;
pub use timespan::TimeSpan;

/// Seconds between 1970-01-01 and 2000-01-01.
pub const SECONDS_FROM_1970_TO_2000: u32 = 946_684_800;

pub(crate) const SECONDS_PER_DAY: u32 = 86_400;

const DAYS_IN_MONTH: [u8; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Gregorian leap year rule.
pub const fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Days in `month` (1-12) of `year`. Returns 0 for an invalid month.
pub const fn days_in_month(year: u16, month: u8) -> u8 {
    if month == 0 || month > 12 {
        return 0;
    }

    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS_IN_MONTH[month as usize - 1]
    }
}

pub(crate) const fn days_in_year(year: u16) -> u16 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Days from 2000-01-01 to the given (valid) date.
pub(crate) fn date_to_days(year: u16, month: u8, day: u8) -> u32 {
    let mut days = u32::from(day) - 1;

    for m in 1..month {
        days += u32::from(days_in_month(year, m));
    }

    for y in 2000..year {
        days += u32::from(days_in_year(y));
    }

    days
}
