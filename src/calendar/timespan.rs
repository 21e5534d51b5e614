//! Signed time differences with one-second resolution.

use core::fmt;
use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use super::SECONDS_PER_DAY;

/// A signed span of whole seconds.
///
/// Only the total is stored; the day/hour/minute/second views are computed
/// and carry the sign of the span.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSpan {
    seconds: i64,
}

impl TimeSpan {
    /// Span of zero length.
    pub const ZERO: TimeSpan = TimeSpan { seconds: 0 };

    /// Build a span from its components. Components need not be normalised:
    /// `TimeSpan::new(0, 0, 0, 90)` is a minute and a half.
    pub const fn new(days: i16, hours: i8, minutes: i8, seconds: i8) -> Self {
        Self {
            seconds: days as i64 * SECONDS_PER_DAY as i64
                + hours as i64 * 3600
                + minutes as i64 * 60
                + seconds as i64,
        }
    }

    /// Build a span from a number of seconds.
    pub const fn from_seconds(seconds: i64) -> Self {
        Self { seconds }
    }

    /// Whole days.
    pub const fn days(&self) -> i32 {
        (self.seconds / SECONDS_PER_DAY as i64) as i32
    }

    /// Hours past the whole days (-23..=23).
    pub const fn hours(&self) -> i8 {
        (self.seconds / 3600 % 24) as i8
    }

    /// Minutes past the whole hours (-59..=59).
    pub const fn minutes(&self) -> i8 {
        (self.seconds / 60 % 60) as i8
    }

    /// Seconds past the whole minutes (-59..=59).
    pub const fn seconds(&self) -> i8 {
        (self.seconds % 60) as i8
    }

    /// The whole span in seconds.
    pub const fn total_seconds(&self) -> i64 {
        self.seconds
    }

    /// Whether the span points backwards in time.
    pub const fn is_negative(&self) -> bool {
        self.seconds < 0
    }
}

impl Add for TimeSpan {
    type Output = TimeSpan;

    fn add(self, rhs: TimeSpan) -> TimeSpan {
        TimeSpan::from_seconds(self.seconds.saturating_add(rhs.seconds))
    }
}

impl Sub for TimeSpan {
    type Output = TimeSpan;

    fn sub(self, rhs: TimeSpan) -> TimeSpan {
        TimeSpan::from_seconds(self.seconds.saturating_sub(rhs.seconds))
    }
}

impl Neg for TimeSpan {
    type Output = TimeSpan;

    fn neg(self) -> TimeSpan {
        TimeSpan::from_seconds(self.seconds.saturating_neg())
    }
}

impl AddAssign for TimeSpan {
    fn add_assign(&mut self, rhs: TimeSpan) {
        self.seconds = self.seconds.saturating_add(rhs.seconds);
    }
}

impl SubAssign for TimeSpan {
    fn sub_assign(&mut self, rhs: TimeSpan) {
        self.seconds = self.seconds.saturating_sub(rhs.seconds);
    }
}

impl fmt::Display for TimeSpan {
    /// `[-]Dd HH:MM:SS`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let total = self.seconds.unsigned_abs();

        write!(
            f,
            "{}{}d {:02}:{:02}:{:02}",
            sign,
            total / u64::from(SECONDS_PER_DAY),
            total / 3600 % 24,
            total / 60 % 60,
            total % 60
        )
    }
}
