//! Periodic callback bookkeeping shared by both backends.
//!
//! The compare interrupt is armed to fire every N whole seconds. On each match
//! the backend drains the counter into its accumulator first, so a callback
//! that reads the clock sees an exact value, and only then invokes the user's
//! function.
//!
//! The next match is relative to the post-drain counter. A delayed interrupt
//! yields a single call; missed intervals are not caught up.

use crate::error::ClockError;

/// User function run from the compare interrupt.
///
/// Runs in interrupt context, after the critical section has been released,
/// so it may read the clock.
pub type PeriodicCallback = fn();

/// Armed periodic callback. Absent by default.
#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct Schedule {
    armed: Option<(PeriodicCallback, u16)>,
}

impl Schedule {
    /// Nothing armed.
    pub(crate) const fn disarmed() -> Self {
        Self { armed: None }
    }

    /// Validate a request and build the resulting schedule.
    ///
    /// Invalid requests (no callback, zero, or more than `max` seconds) are
    /// reported as errors; callers degrade them to [`Schedule::disarmed`].
    pub(crate) fn arm(
        callback: Option<PeriodicCallback>,
        every_seconds: u16,
        max: u16,
    ) -> Result<Self, ClockError> {
        let callback = callback.ok_or(ClockError::MissingCallback)?;
        check_interval(every_seconds, max)?;

        Ok(Self {
            armed: Some((callback, every_seconds)),
        })
    }

    /// Resolve a caller's request, degrading anything invalid to disarmed.
    pub(crate) fn request(
        callback: Option<PeriodicCallback>,
        every_seconds: u16,
        max: u16,
    ) -> Self {
        match Self::arm(callback, every_seconds, max) {
            Ok(schedule) => {
                debug!("periodic callback every {} s", every_seconds);
                schedule
            }
            Err(_) if callback.is_none() => {
                debug!("periodic callback cleared");
                Self::disarmed()
            }
            Err(err) => {
                warn!("periodic callback disabled: {}", err);
                Self::disarmed()
            }
        }
    }

    pub(crate) fn callback(&self) -> Option<PeriodicCallback> {
        self.armed.map(|(callback, _)| callback)
    }

    pub(crate) fn interval_seconds(&self) -> Option<u16> {
        self.armed.map(|(_, seconds)| seconds)
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed.is_some()
    }
}

/// Check an interval against a backend's compare range.
pub(crate) fn check_interval(every_seconds: u16, max: u16) -> Result<(), ClockError> {
    if every_seconds == 0 {
        return Err(ClockError::ZeroInterval);
    }

    if every_seconds > max {
        return Err(ClockError::IntervalTooLong {
            requested: every_seconds,
            max,
        });
    }

    Ok(())
}

/// Compare register value for an interval at the given tick rate.
pub(crate) const fn compare_ticks(every_seconds: u16, tick_rate_hz: u32) -> u32 {
    every_seconds as u32 * tick_rate_hz
}
