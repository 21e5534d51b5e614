//! Wall-clock facade over a [`Timekeeper`].
//!
//! The engine counts from an arbitrary epoch. `Device` keeps a signed offset
//! such that `unix seconds = offset + engine seconds`, so setting the time
//! never needs to touch the counter's origin.

use core::cell::Cell;
use core::fmt;
use core::time::Duration;

use critical_section::Mutex;

use crate::calendar::DateTime;
use crate::clock::{PeriodicCallback, Timekeeper};

/// Real-time clock bound to one backend.
///
/// Generic over:
/// - `K`: the [`Timekeeper`] backend (chosen at compile time)
pub struct Device<K> {
    clock: K,
    offset: Mutex<Cell<i64>>,
}

impl<K: fmt::Debug> fmt::Debug for Device<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("clock", &self.clock)
            .field("offset", &self.offset())
            .finish()
    }
}

impl<K> Device<K> {
    /// Wrap a backend. Until [`adjust`](Device::adjust) is called the offset
    /// is zero and [`now`](Device::now) stays pinned near 2000-01-01.
    pub const fn new(clock: K) -> Self {
        Self {
            clock,
            offset: Mutex::new(Cell::new(0)),
        }
    }

    /// Backend access, e.g. for forwarding interrupts.
    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// Seconds to add to the engine time to get Unix time.
    pub fn offset(&self) -> i64 {
        critical_section::with(|cs| self.offset.borrow(cs).get())
    }
}

impl<K: Timekeeper> Device<K> {
    /// Current date and time.
    pub fn now(&self) -> DateTime {
        let seconds = i64::try_from(self.clock.seconds()).unwrap_or(i64::MAX);
        let unixtime = self.offset().saturating_add(seconds);
        DateTime::from_unixtime(unixtime.clamp(0, i64::from(u32::MAX)) as u32)
    }

    /// Set the current date and time.
    ///
    /// With `reset_counter` the engine is zeroed first, which keeps the
    /// offset small and aligns whole seconds with the counter.
    pub fn adjust(&self, datetime: &DateTime, reset_counter: bool) {
        if reset_counter {
            self.clock.zero_clock();
        }

        let seconds = i64::try_from(self.clock.seconds()).unwrap_or(i64::MAX);
        let offset = i64::from(datetime.unixtime()) - seconds;
        critical_section::with(|cs| self.offset.borrow(cs).set(offset));

        debug!("clock adjusted, offset {} s", offset);
    }

    /// Fold elapsed engine time into the offset and restart the engine from
    /// zero. Returns the wall time that was carried over.
    pub fn rebase_counter(&self) -> DateTime {
        let now = self.now();
        self.adjust(&now, true);
        now
    }

    /// Whether the backend discarded its previous time base at boot.
    pub fn was_reset_at_powerup(&self) -> bool {
        self.clock.was_reset_at_powerup()
    }

    /// Call `callback` every `every_seconds` seconds from the compare
    /// interrupt. Invalid intervals disable the callback instead.
    pub fn set_periodic_callback(&self, callback: PeriodicCallback, every_seconds: u16) {
        self.clock.set_periodic_callback(Some(callback), every_seconds);
    }

    /// Stop the periodic callback.
    pub fn clear_periodic_callback(&self) {
        self.clock.clear_periodic_callback();
    }

    /// Time since the engine epoch.
    pub fn uptime(&self) -> Duration {
        self.clock.uptime()
    }
}
