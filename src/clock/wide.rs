//! 32-bit battery-backed RTC backend.
//!
//! The counter runs at 1024 Hz from a crystal in the backup power domain and
//! keeps counting while main power is gone. Software accumulates whole
//! seconds; the sub-second remainder stays in the counter so no precision is
//! lost when draining.
//!
//! The seconds count is mirrored into the domain's two backup cells (in
//! blocks of [`ClockConfig::BACKUP_INTERVAL_SECONDS`]) so it can be rebuilt
//! after a main power interruption. At boot [`WideClock::init`] decides
//! whether the domain can be trusted:
//!
//! - no status flag raised: restore seconds from the backup cells, leave the
//!   counter and its configuration untouched
//! - any flag raised: reset the domain, clear the cells, restart at zero
//!
//! A domain reset requires a working battery on VBAT and brown-out detection
//! configured in the fuses; without it every boot looks like a power loss.

use core::cell::RefCell;
use core::fmt;
use core::marker::PhantomData;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;

use super::Timekeeper;
use super::periodic::{self, PeriodicCallback, Schedule};
use crate::config::{ClockConfig, DefaultConfig};
use crate::peripheral::{BatteryBackup, InterruptLevel, Rtc32, wait_until_ready32};

/// log2 of the tick rate.
const TICK_SHIFT: u32 = 10;

/// 1024 Hz.
const TICK_RATE: u32 = 1 << TICK_SHIFT;

const SUBSECOND_MASK: u32 = TICK_RATE - 1;

const MAX_PERIOD_TICKS: u32 = 0xFFFF_FFFF;

/// Seconds per overflow: 2^32 ticks at 1024 Hz (about 48.5 days).
const OVERFLOW_SECONDS: u32 = 1 << (32 - TICK_SHIFT);

/// Keeps `count * 1000` inside 32 bits while reads skip draining.
const MAX_INTERVAL_SECONDS: u16 = 66 * 60;

/// Block value written once the seconds count no longer fits the cells.
const SATURATED_BLOCK: u16 = u16::MAX;

/// Clock backed by a 32-bit RTC in a battery-backed domain.
///
/// Construct in a `static`, call [`init`](WideClock::init) once at boot before
/// anything else touches the peripheral, and forward the RTC overflow and
/// compare interrupts to [`Timekeeper::on_overflow`] and
/// [`Timekeeper::on_compare`].
pub struct WideClock<T, B, C = DefaultConfig> {
    state: Mutex<RefCell<State<T, B, C>>>,
}

struct State<T, B, C> {
    rtc: T,
    backup: B,
    /// Whole seconds drained from the counter since the engine epoch
    seconds: u32,
    /// Last block number written to the backup cells
    persisted_block: Option<u16>,
    schedule: Schedule,
    reset_at_powerup: bool,
    initialized: bool,
    _config: PhantomData<C>,
}

/// Backup cells hold `seconds / interval` as a little-endian 16-bit value.
fn encode_block(block: u16) -> [u8; 2] {
    block.to_le_bytes()
}

fn decode_block(cells: [u8; 2]) -> u16 {
    u16::from_le_bytes(cells)
}

impl<T: Rtc32, B: BatteryBackup, C: ClockConfig> State<T, B, C> {
    const BACKUP_INTERVAL: u32 = if C::BACKUP_INTERVAL_SECONDS == 0 {
        1
    } else {
        C::BACKUP_INTERVAL_SECONDS
    };

    /// Latch and read the counter.
    fn fetch_count(&mut self) -> u32 {
        self.rtc.request_count_sync();
        wait_until_ready32(&self.rtc);
        self.rtc.count()
    }

    /// Rewrite the counter. The RTC must be stopped for the write to land.
    fn write_count(&mut self, count: u32) {
        self.rtc.disable();
        wait_until_ready32(&self.rtc);

        self.rtc.set_count(count);

        self.rtc.enable();
        wait_until_ready32(&self.rtc);
    }

    /// Move whole seconds out of `count` into the accumulator.
    ///
    /// Returns the sub-second remainder left in the counter.
    fn drain(&mut self, count: u32) -> u32 {
        let whole = count >> TICK_SHIFT;
        if whole == 0 {
            return count;
        }

        let remainder = count & SUBSECOND_MASK;
        self.seconds = self.seconds.wrapping_add(whole);
        self.write_count(remainder);
        self.persist();

        remainder
    }

    /// Mirror the seconds count into the backup cells when it enters a new block.
    ///
    /// The stored value rounds down, so a restore never runs ahead of the
    /// real elapsed time. Past the cell range it sticks at [`SATURATED_BLOCK`].
    fn persist(&mut self) {
        let block =
            u16::try_from(self.seconds / Self::BACKUP_INTERVAL).unwrap_or(SATURATED_BLOCK);
        if self.persisted_block != Some(block) {
            self.backup.write_backup(encode_block(block));
            self.persisted_block = Some(block);
        }
    }

    /// Rebuild the seconds count from the backup cells.
    ///
    /// Returns `false` without touching the accumulator if the cells hold a
    /// saturated block, which no longer says how much time has passed.
    fn restore(&mut self) -> bool {
        self.backup.enable_access();

        let block = decode_block(self.backup.read_backup());
        if block == SATURATED_BLOCK {
            return false;
        }

        self.seconds = u32::from(block) * Self::BACKUP_INTERVAL;
        self.persisted_block = Some(block);

        // compare setup survives in the domain, the callback does not
        self.rtc
            .set_interrupts(C::INTERRUPT_LEVEL, InterruptLevel::Off);
        self.rtc.clear_interrupt_flags(false, true);

        true
    }

    /// Bring the backup domain back to a known state.
    fn reset_domain<D: DelayNs>(&mut self, delay: &mut D) {
        self.rtc.power_up();
        self.rtc.disable();
        wait_until_ready32(&self.rtc);

        self.backup.enable_access();
        self.backup.write_backup([0, 0]);
        self.backup.reset();
        self.backup.enable_failure_detection();

        delay.delay_us(C::OSCILLATOR_SETTLE_MICROS);

        self.backup.enable_oscillator();
        while !self.backup.oscillator_ready() {
            core::hint::spin_loop();
        }

        self.seconds = 0;
        self.persisted_block = Some(0);
    }

    /// Free-running configuration from zero.
    fn start_counter(&mut self) {
        self.rtc.set_period(MAX_PERIOD_TICKS);
        self.rtc.set_count(0);
        wait_until_ready32(&self.rtc);

        self.rtc
            .set_interrupts(C::INTERRUPT_LEVEL, InterruptLevel::Off);
        self.rtc.clear_interrupt_flags(true, false);

        self.rtc.enable();
        wait_until_ready32(&self.rtc);
    }
}

impl<T, B, C> fmt::Debug for WideClock<T, B, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (seconds, armed, reset) = critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);
            (state.seconds, state.schedule.is_armed(), state.reset_at_powerup)
        });

        f.debug_struct("WideClock")
            .field("seconds", &seconds)
            .field("periodic", &armed)
            .field("reset_at_powerup", &reset)
            .finish_non_exhaustive()
    }
}

impl<T, B, C> WideClock<T, B, C> {
    /// Wrap the RTC and its backup domain. Nothing is touched until
    /// [`init`](WideClock::init).
    pub const fn new(rtc: T, backup: B) -> Self {
        Self {
            state: Mutex::new(RefCell::new(State {
                rtc,
                backup,
                seconds: 0,
                persisted_block: None,
                schedule: Schedule::disarmed(),
                reset_at_powerup: true,
                initialized: false,
                _config: PhantomData,
            })),
        }
    }

    /// Give the peripherals back.
    pub fn free(self) -> (T, B) {
        let state = self.state.into_inner().into_inner();
        (state.rtc, state.backup)
    }
}

impl<T: Rtc32, B: BatteryBackup, C: ClockConfig> WideClock<T, B, C> {
    /// Decide between restoring and resetting the time base.
    ///
    /// Must run once, before any other method. `delay` provides the
    /// oscillator settle time on the reset path. Later calls are ignored.
    ///
    /// The backup cells cover `65534 * BACKUP_INTERVAL_SECONDS` seconds of
    /// engine time (about 36 h with [`DefaultConfig`]). A boot after the
    /// engine ran longer than that without a [`Timekeeper::zero_clock`]
    /// resets the domain as if power had been lost. The trust path leaves
    /// the counter running but disables the compare interrupt; re-arm the
    /// periodic callback after boot.
    pub fn init<D: DelayNs>(&self, delay: &mut D) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if state.initialized {
                warn!("wide clock already initialized");
                return;
            }
            state.initialized = true;

            let status = state.backup.status();
            if status.needs_reset() {
                warn!("backup domain state lost ({}), restarting clock", status);
            } else if state.restore() {
                state.reset_at_powerup = false;
                info!("restored {} s from backup domain", state.seconds);
                return;
            } else {
                warn!("backup cells saturated, restarting clock");
            }

            state.reset_domain(delay);
            state.start_counter();
            state.reset_at_powerup = true;
        });
    }
}

impl<T: Rtc32, B: BatteryBackup, C: ClockConfig> Timekeeper for WideClock<T, B, C> {
    const TICK_RATE_HZ: u32 = TICK_RATE;
    const MAX_PERIODIC_INTERVAL_SECONDS: u16 = MAX_INTERVAL_SECONDS;

    fn reconcile(&self) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let count = state.fetch_count();
            state.drain(count);
        });
    }

    fn elapsed_millis(&self) -> u64 {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);

            let mut count = state.fetch_count();
            if !state.schedule.is_armed() && count >= TICK_RATE {
                count = state.drain(count);
            }

            u64::from(state.seconds) * 1000 + ((u64::from(count) * 1000) >> TICK_SHIFT)
        })
    }

    fn zero_clock(&self) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.seconds = 0;
            state.write_count(0);
            state.persist();
        });

        debug!("wide clock zeroed");
    }

    fn set_periodic_callback(&self, callback: Option<PeriodicCallback>, every_seconds: u16) {
        let schedule =
            Schedule::request(callback, every_seconds, Self::MAX_PERIODIC_INTERVAL_SECONDS);

        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);

            // compare counts from a drained counter
            let count = state.fetch_count();
            state.drain(count);

            state.rtc.disable();
            wait_until_ready32(&state.rtc);

            match schedule.interval_seconds() {
                Some(seconds) => {
                    let ticks = periodic::compare_ticks(seconds, Self::TICK_RATE_HZ);
                    state.rtc.set_compare(ticks);
                    state
                        .rtc
                        .set_interrupts(C::INTERRUPT_LEVEL, C::INTERRUPT_LEVEL);
                    state.rtc.clear_interrupt_flags(true, true);
                }
                None => {
                    state
                        .rtc
                        .set_interrupts(C::INTERRUPT_LEVEL, InterruptLevel::Off);
                    state.rtc.clear_interrupt_flags(true, false);
                }
            }

            state.schedule = schedule;

            state.rtc.enable();
            wait_until_ready32(&state.rtc);
        });
    }

    fn on_overflow(&self) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.seconds = state.seconds.wrapping_add(OVERFLOW_SECONDS);
            state.persist();
        });

        trace!("wide clock overflow");
    }

    fn on_compare(&self) {
        let callback = critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let count = state.fetch_count();
            state.drain(count);
            state.schedule.callback()
        });

        trace!("wide clock compare");

        // outside the critical section: the callback may read the clock
        if let Some(callback) = callback {
            callback();
        }
    }

    fn was_reset_at_powerup(&self) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).reset_at_powerup)
    }
}
