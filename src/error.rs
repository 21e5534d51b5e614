//! Error types for clock configuration and calendar construction.
//!
//! The engine itself never fails: an invalid periodic request degrades to
//! "callback disabled". `ClockError` is what callers get when they ask up
//! front (see [`Timekeeper::check_interval`](crate::Timekeeper::check_interval))
//! or build a [`DateTime`](crate::DateTime) from explicit fields.

use core::fmt;

/// Clock error type.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClockError {
    /// Periodic interval of zero seconds
    ZeroInterval,

    /// Periodic interval requested without a callback
    MissingCallback,

    /// Periodic interval beyond what the compare register can express
    IntervalTooLong {
        /// Requested interval in seconds
        requested: u16,
        /// Longest interval the backend accepts
        max: u16,
    },

    /// Year outside 2000..=2105
    YearOutOfRange(u16),

    /// Month outside 1..=12
    InvalidMonth(u8),

    /// Day not present in the given month
    InvalidDay {
        /// Month (1-12)
        month: u8,
        /// Rejected day
        day: u8,
    },

    /// Hour, minute or second out of range
    InvalidTime {
        /// Hour (0-23)
        hour: u8,
        /// Minute (0-59)
        minute: u8,
        /// Second (0-59)
        second: u8,
    },
}

impl fmt::Display for ClockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClockError::ZeroInterval => write!(f, "Interval must be at least one second"),
            ClockError::MissingCallback => write!(f, "No callback given"),
            ClockError::IntervalTooLong { requested, max } => {
                write!(f, "Interval of {}s exceeds maximum of {}s", requested, max)
            }
            ClockError::YearOutOfRange(year) => write!(f, "Year {} out of range", year),
            ClockError::InvalidMonth(month) => write!(f, "Invalid month {}", month),
            ClockError::InvalidDay { month, day } => {
                write!(f, "Invalid day {} for month {}", day, month)
            }
            ClockError::InvalidTime {
                hour,
                minute,
                second,
            } => write!(f, "Invalid time {:02}:{:02}:{:02}", hour, minute, second),
        }
    }
}
