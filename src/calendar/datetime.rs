//! Absolute date and time.

use core::fmt::{self, Write};
use core::ops::{Add, Sub};

use super::{
    SECONDS_FROM_1970_TO_2000, SECONDS_PER_DAY, TimeSpan, date_to_days, days_in_month,
    days_in_year,
};
use crate::error::ClockError;

/// Earliest representable year.
pub const MIN_YEAR: u16 = 2000;

/// Latest year accepted by [`DateTime::new`]; every instant in it has a
/// 32-bit Unix time.
pub const MAX_YEAR: u16 = 2105;

/// Seconds from 2000-01-01 to the last second of [`MAX_YEAR`].
const MAX_SECONDSTIME: u32 = 3_345_062_399;

/// Naive date and time with one-second resolution.
///
/// Ordering is chronological.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime {
    // field order drives the derived ordering
    year_offset: u8,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
}

impl DateTime {
    /// 2000-01-01 00:00:00
    pub const EPOCH_2000: DateTime = DateTime {
        year_offset: 0,
        month: 1,
        day: 1,
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Build from explicit fields, validating each one.
    pub fn new(
        year: u16,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
    ) -> Result<Self, ClockError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ClockError::YearOutOfRange(year));
        }

        if !(1..=12).contains(&month) {
            return Err(ClockError::InvalidMonth(month));
        }

        if day == 0 || day > days_in_month(year, month) {
            return Err(ClockError::InvalidDay { month, day });
        }

        if hour > 23 || minute > 59 || second > 59 {
            return Err(ClockError::InvalidTime {
                hour,
                minute,
                second,
            });
        }

        Ok(Self {
            year_offset: (year - MIN_YEAR) as u8,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// Midnight at the start of the given date.
    pub fn from_date(year: u16, month: u8, day: u8) -> Result<Self, ClockError> {
        Self::new(year, month, day, 0, 0, 0)
    }

    /// Build from seconds since 1970-01-01. Instants before 2000 clamp to
    /// [`DateTime::EPOCH_2000`], instants after [`MAX_YEAR`] to its last
    /// second.
    pub fn from_unixtime(unixtime: u32) -> Self {
        Self::from_secondstime(unixtime.saturating_sub(SECONDS_FROM_1970_TO_2000))
    }

    /// Build from seconds since 2000-01-01, clamped to the end of
    /// [`MAX_YEAR`] so the result always round-trips through
    /// [`unixtime`](DateTime::unixtime).
    pub fn from_secondstime(secondstime: u32) -> Self {
        let secondstime = secondstime.min(MAX_SECONDSTIME);
        let second = (secondstime % 60) as u8;
        let minutes = secondstime / 60;
        let minute = (minutes % 60) as u8;
        let hours = minutes / 60;
        let hour = (hours % 24) as u8;
        let mut days = hours / 24;

        let mut year = MIN_YEAR;
        loop {
            let year_len = u32::from(days_in_year(year));
            if days < year_len {
                break;
            }
            days -= year_len;
            year += 1;
        }

        let mut month = 1;
        loop {
            let month_len = u32::from(days_in_month(year, month));
            if days < month_len {
                break;
            }
            days -= month_len;
            month += 1;
        }

        Self {
            year_offset: (year - MIN_YEAR) as u8,
            month,
            day: days as u8 + 1,
            hour,
            minute,
            second,
        }
    }

    /// Four-digit year.
    pub const fn year(&self) -> u16 {
        MIN_YEAR + self.year_offset as u16
    }

    /// Month, 1-12.
    pub const fn month(&self) -> u8 {
        self.month
    }

    /// Day of month, 1-31.
    pub const fn day(&self) -> u8 {
        self.day
    }

    /// Hour, 0-23.
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute, 0-59.
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    /// Second, 0-59.
    pub const fn second(&self) -> u8 {
        self.second
    }

    /// Day of the week, 0 = Sunday.
    pub fn day_of_week(&self) -> u8 {
        // 2000-01-01 was a Saturday
        ((self.days_since_2000() + 6) % 7) as u8
    }

    /// Seconds since 2000-01-01.
    pub fn secondstime(&self) -> u32 {
        self.days_since_2000() * SECONDS_PER_DAY
            + u32::from(self.hour) * 3600
            + u32::from(self.minute) * 60
            + u32::from(self.second)
    }

    /// Seconds since 1970-01-01.
    pub fn unixtime(&self) -> u32 {
        self.secondstime().saturating_add(SECONDS_FROM_1970_TO_2000)
    }

    /// `YYYY-MM-DDThh:mm:ss`
    pub fn format_iso8601(&self) -> heapless::String<19> {
        let mut out = heapless::String::new();
        // four-digit years always fit
        let _ = write!(
            out,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year(),
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second
        );
        out
    }

    fn days_since_2000(&self) -> u32 {
        date_to_days(self.year(), self.month, self.day)
    }

    fn offset_by(self, seconds: i64) -> Self {
        let target = i64::from(self.unixtime()).saturating_add(seconds).clamp(
            i64::from(SECONDS_FROM_1970_TO_2000),
            i64::from(MAX_SECONDSTIME + SECONDS_FROM_1970_TO_2000),
        );
        Self::from_unixtime(target as u32)
    }
}

impl Default for DateTime {
    fn default() -> Self {
        Self::EPOCH_2000
    }
}

impl Add<TimeSpan> for DateTime {
    type Output = DateTime;

    fn add(self, span: TimeSpan) -> DateTime {
        self.offset_by(span.total_seconds())
    }
}

impl Sub<TimeSpan> for DateTime {
    type Output = DateTime;

    fn sub(self, span: TimeSpan) -> DateTime {
        self.offset_by(span.total_seconds().saturating_neg())
    }
}

impl Sub for DateTime {
    type Output = TimeSpan;

    fn sub(self, rhs: DateTime) -> TimeSpan {
        TimeSpan::from_seconds(i64::from(self.unixtime()) - i64::from(rhs.unixtime()))
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year(),
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second
        )
    }
}
