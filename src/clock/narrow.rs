//! 16-bit RTC backend.
//!
//! The counter ticks at ~1 kHz and each tick is counted as one millisecond.
//! Nothing survives a power cycle: the clock restarts at the engine epoch on
//! every boot.

use core::cell::RefCell;
use core::fmt;
use core::marker::PhantomData;

use critical_section::Mutex;

use super::Timekeeper;
use super::periodic::{self, PeriodicCallback, Schedule};
use crate::config::{ClockConfig, DefaultConfig};
use crate::peripheral::{InterruptLevel, Rtc16, wait_until_ready16};

/// Longest period the counter supports.
const MAX_PERIOD_TICKS: u16 = 0xFFFF;

/// Ticks per overflow (the counter visits `0..=PER`).
const OVERFLOW_TICKS: u64 = MAX_PERIOD_TICKS as u64 + 1;

/// Below this the counter is far enough from wrapping to be read without a
/// reconcile.
const SMALL_COUNT: u16 = 0x4000;

/// Clock backed by a 16-bit RTC.
///
/// Construct in a `static`, call [`init`](NarrowClock::init) once at boot and
/// forward the RTC overflow and compare interrupts to
/// [`Timekeeper::on_overflow`] and [`Timekeeper::on_compare`].
///
/// Sub-millisecond resolution is not available from this counter, so
/// [`Timekeeper::micros`] is always a multiple of 1000.
pub struct NarrowClock<T, C = DefaultConfig> {
    state: Mutex<RefCell<State<T>>>,
    _config: PhantomData<C>,
}

struct State<T> {
    rtc: T,
    /// Milliseconds drained from the counter since the engine epoch
    millis: u64,
    schedule: Schedule,
    initialized: bool,
}

impl<T: Rtc16> State<T> {
    /// Move the counter into the accumulator.
    fn shift(&mut self) {
        self.rtc.stop();
        wait_until_ready16(&self.rtc);

        self.millis += u64::from(self.rtc.count());
        self.rtc.set_count(0);

        self.rtc.start();
    }
}

impl<T, C> fmt::Debug for NarrowClock<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (millis, armed) = critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);
            (state.millis, state.schedule.is_armed())
        });

        f.debug_struct("NarrowClock")
            .field("millis", &millis)
            .field("periodic", &armed)
            .finish_non_exhaustive()
    }
}

impl<T, C> NarrowClock<T, C> {
    /// Wrap an RTC. Nothing is touched until [`init`](NarrowClock::init).
    pub const fn new(rtc: T) -> Self {
        Self {
            state: Mutex::new(RefCell::new(State {
                rtc,
                millis: 0,
                schedule: Schedule::disarmed(),
                initialized: false,
            })),
            _config: PhantomData,
        }
    }

    /// Give the RTC back.
    pub fn free(self) -> T {
        self.state.into_inner().into_inner().rtc
    }
}

impl<T: Rtc16, C: ClockConfig> NarrowClock<T, C> {
    /// Configure the counter for free-running operation.
    ///
    /// Maximum period, counter and compare at zero, overflow interrupt on,
    /// compare interrupt off. Runs once; later calls are ignored.
    pub fn init(&self) {
        let started = critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if state.initialized {
                return false;
            }

            wait_until_ready16(&state.rtc);

            state.rtc.set_period(MAX_PERIOD_TICKS);
            state.rtc.set_count(0);
            state.rtc.set_compare(0);
            state.rtc.start();
            state
                .rtc
                .set_interrupts(C::INTERRUPT_LEVEL, InterruptLevel::Off);

            state.millis = 0;
            state.initialized = true;
            true
        });

        if started {
            info!("narrow clock started");
        } else {
            warn!("narrow clock already initialized");
        }
    }
}

impl<T: Rtc16, C: ClockConfig> Timekeeper for NarrowClock<T, C> {
    const TICK_RATE_HZ: u32 = 1000;
    const MAX_PERIODIC_INTERVAL_SECONDS: u16 = MAX_PERIOD_TICKS / 1000;

    fn reconcile(&self) {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).shift());
    }

    fn elapsed_millis(&self) -> u64 {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            wait_until_ready16(&state.rtc);

            let count = state.rtc.count();
            if state.schedule.is_armed() || count < SMALL_COUNT {
                // compare interrupts keep the counter short when armed
                state.millis + u64::from(count)
            } else {
                state.shift();
                state.millis
            }
        })
    }

    fn zero_clock(&self) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.rtc.stop();
            wait_until_ready16(&state.rtc);

            state.rtc.set_count(0);
            state.millis = 0;

            state.rtc.start();
        });

        debug!("narrow clock zeroed");
    }

    fn set_periodic_callback(&self, callback: Option<PeriodicCallback>, every_seconds: u16) {
        let schedule =
            Schedule::request(callback, every_seconds, Self::MAX_PERIODIC_INTERVAL_SECONDS);

        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            wait_until_ready16(&state.rtc);

            match schedule.interval_seconds() {
                Some(seconds) => {
                    // compare counts from a freshly drained counter
                    state.shift();
                    let ticks = periodic::compare_ticks(seconds, Self::TICK_RATE_HZ);
                    state.rtc.set_compare(ticks as u16);
                    state
                        .rtc
                        .set_interrupts(C::INTERRUPT_LEVEL, C::INTERRUPT_LEVEL);
                }
                None => {
                    state.rtc.set_compare(0);
                    state
                        .rtc
                        .set_interrupts(C::INTERRUPT_LEVEL, InterruptLevel::Off);
                }
            }

            state.schedule = schedule;
        });
    }

    fn on_overflow(&self) {
        critical_section::with(|cs| {
            self.state.borrow_ref_mut(cs).millis += OVERFLOW_TICKS;
        });

        trace!("narrow clock overflow");
    }

    fn on_compare(&self) {
        let callback = critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let callback = state.schedule.callback()?;
            state.shift();
            Some(callback)
        });

        trace!("narrow clock compare");

        // outside the critical section: the callback may read the clock
        if let Some(callback) = callback {
            callback();
        }
    }

    fn was_reset_at_powerup(&self) -> bool {
        true
    }
}
