//! Timekeeping engine.
//!
//! The hardware counter runs freely without a tick interrupt. Software keeps a
//! wide accumulator and only folds ("reconciles") the counter into it when:
//!
//! - the clock is read and the counter has grown large,
//! - the counter overflows (overflow interrupt),
//! - a periodic callback fires (compare interrupt),
//! - the periodic callback is (re)configured.
//!
//! Every read-modify-write of the accumulator, the hardware counter and the
//! callback handle happens inside `critical_section::with`, from foreground
//! and interrupt code alike.
//!
//! Two backends implement [`Timekeeper`]:
//! - [`NarrowClock`] - 16-bit counter at 1 kHz, millisecond accumulator
//! - [`WideClock`] - 32-bit battery-backed counter at 1024 Hz, seconds accumulator

use core::time::Duration;

use crate::error::ClockError;

// Sub-modules
pub mod periodic;

#[cfg(feature = "narrow")]
pub mod narrow;

#[cfg(feature = "wide")]
pub mod wide;

// Re-export key types
pub use periodic::PeriodicCallback;

#[cfg(feature = "narrow")]
pub use narrow::NarrowClock;

#[cfg(feature = "wide")]
pub use wide::WideClock;

/// Common contract of both clock backends.
///
/// All methods take `&self` so a backend can live in a `static` shared with
/// the interrupt handlers. The board's overflow ISR must call
/// [`on_overflow`](Timekeeper::on_overflow) and its compare ISR
/// [`on_compare`](Timekeeper::on_compare).
pub trait Timekeeper {
    /// Counter ticks per second.
    const TICK_RATE_HZ: u32;

    /// Longest periodic interval the compare register can express.
    const MAX_PERIODIC_INTERVAL_SECONDS: u16;

    /// Drain the hardware counter into the accumulator.
    ///
    /// Calling it twice with no ticks in between changes nothing.
    fn reconcile(&self);

    /// Milliseconds since the engine epoch, full width.
    ///
    /// Cheap while the counter is small or a periodic callback is keeping it
    /// small; otherwise reconciles first so an upcoming overflow can't be
    /// counted twice.
    fn elapsed_millis(&self) -> u64;

    /// Reset the accumulator and counter to the engine epoch.
    fn zero_clock(&self);

    /// Arm (or disarm) the periodic callback.
    ///
    /// `None`, zero, or an interval above
    /// [`MAX_PERIODIC_INTERVAL_SECONDS`](Timekeeper::MAX_PERIODIC_INTERVAL_SECONDS)
    /// all disarm; use [`check_interval`](Timekeeper::check_interval) first
    /// for a diagnosis.
    fn set_periodic_callback(&self, callback: Option<PeriodicCallback>, every_seconds: u16);

    /// Overflow interrupt entry point.
    fn on_overflow(&self);

    /// Compare interrupt entry point.
    fn on_compare(&self);

    /// Whether startup had to discard the previous time base.
    fn was_reset_at_powerup(&self) -> bool;

    /// Disarm the periodic callback.
    fn clear_periodic_callback(&self) {
        self.set_periodic_callback(None, 0);
    }

    /// Validate a periodic interval without touching the hardware.
    fn check_interval(&self, every_seconds: u16) -> Result<(), ClockError> {
        periodic::check_interval(every_seconds, Self::MAX_PERIODIC_INTERVAL_SECONDS)
    }

    /// Milliseconds since the engine epoch, wrapping at 32 bits.
    fn millis(&self) -> u32 {
        self.elapsed_millis() as u32
    }

    /// Microseconds since the engine epoch, wrapping at 32 bits.
    ///
    /// Derived from [`millis`](Timekeeper::millis): neither counter resolves
    /// below a millisecond, so the last three digits are always zero.
    fn micros(&self) -> u32 {
        self.millis().wrapping_mul(1000)
    }

    /// Whole seconds since the engine epoch.
    fn seconds(&self) -> u64 {
        self.elapsed_millis() / 1000
    }

    /// Time since the engine epoch.
    fn uptime(&self) -> Duration {
        Duration::from_millis(self.elapsed_millis())
    }
}
