//! Shared test helpers to reduce duplication across integration tests.
//!
//! The simulated counters never tick by themselves. `advance*` moves them
//! forward event by event and raises the overflow and compare interrupts the
//! way the hardware would, with the register lock released so handlers and
//! callbacks can touch the peripheral.

#![allow(dead_code)]

#[allow(clippy::duplicate_mod)]
#[path = "fixtures/mod.rs"]
mod fixtures;

pub use fixtures::*;

use realtime_clock::Timekeeper;

#[cfg(feature = "narrow")]
use realtime_clock::NarrowClock;

#[cfg(feature = "wide")]
use realtime_clock::{DefaultConfig, WideClock};

/// Interrupt raised while advancing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    Overflow,
    Compare,
}

/// Distance to the next event, or `u64::MAX` if it can't happen.
fn ticks_until(count: u64, target: u64) -> u64 {
    if target > count { target - count } else { u64::MAX }
}

// ============================================================================
// Clock Creation Helpers
// ============================================================================

#[cfg(feature = "narrow")]
/// Initialised narrow clock plus a handle on its registers.
pub fn create_narrow_clock() -> (NarrowClock<SimRtc16>, SimRtc16) {
    let rtc = SimRtc16::new();
    let clock = NarrowClock::new(rtc.clone());
    clock.init();
    (clock, rtc)
}

#[cfg(feature = "wide")]
/// Wide clock that went through a full domain reset at boot.
pub fn create_wide_clock() -> (WideClock<SimRtc32, SimBattery>, SimRtc32, SimBattery) {
    create_wide_clock_with(SimRtc32::new(), SimBattery::power_lost([0, 0]))
}

#[cfg(feature = "wide")]
/// Wide clock initialised against the given peripheral state.
pub fn create_wide_clock_with(
    rtc: SimRtc32,
    battery: SimBattery,
) -> (WideClock<SimRtc32, SimBattery>, SimRtc32, SimBattery) {
    let clock: WideClock<_, _, DefaultConfig> = WideClock::new(rtc.clone(), battery.clone());
    clock.init(&mut RecordingDelay::default());
    (clock, rtc, battery)
}

// ============================================================================
// Time Advancement
// ============================================================================

/// Let `ticks` pass on the 16-bit counter, dispatching interrupts to `clock`.
///
/// Returns the interrupts raised, in order.
pub fn advance16<K: Timekeeper>(rtc: &SimRtc16, clock: &K, mut ticks: u64) -> Vec<Event> {
    let mut events = Vec::new();

    while ticks > 0 {
        let event = {
            let mut regs = rtc.regs();
            if !regs.running {
                break;
            }

            let count = u64::from(regs.count);
            let to_overflow = u64::from(regs.period) + 1 - count;
            let to_compare = if regs.compare_level.is_enabled() {
                ticks_until(count, u64::from(regs.compare))
            } else {
                u64::MAX
            };

            let step = ticks.min(to_overflow).min(to_compare);
            ticks -= step;

            if step == to_overflow {
                regs.count = 0;
                regs.overflow_level.is_enabled().then_some(Event::Overflow)
            } else {
                regs.count = (count + step) as u16;
                (step == to_compare).then_some(Event::Compare)
            }
        };

        if let Some(event) = event {
            dispatch(clock, event);
            events.push(event);
        }
    }

    events
}

/// Let `ticks` pass on the 32-bit counter, dispatching interrupts to `clock`.
pub fn advance32<K: Timekeeper>(rtc: &SimRtc32, clock: &K, mut ticks: u64) -> Vec<Event> {
    let mut events = Vec::new();

    while ticks > 0 {
        let event = {
            let mut regs = rtc.regs();
            if !regs.enabled {
                break;
            }

            let count = u64::from(regs.count);
            let to_overflow = u64::from(regs.period) + 1 - count;
            let to_compare = if regs.compare_level.is_enabled() {
                ticks_until(count, u64::from(regs.compare))
            } else {
                u64::MAX
            };

            let step = ticks.min(to_overflow).min(to_compare);
            ticks -= step;

            if step == to_overflow {
                regs.count = 0;
                regs.overflow_level.is_enabled().then_some(Event::Overflow)
            } else {
                regs.count = (count + step) as u32;
                (step == to_compare).then_some(Event::Compare)
            }
        };

        if let Some(event) = event {
            dispatch(clock, event);
            events.push(event);
        }
    }

    events
}

/// Let whole seconds pass on the narrow clock.
pub fn advance16_seconds<K: Timekeeper>(rtc: &SimRtc16, clock: &K, seconds: u64) -> Vec<Event> {
    advance16(rtc, clock, seconds * 1000)
}

/// Let whole seconds pass on the wide clock.
pub fn advance32_seconds<K: Timekeeper>(rtc: &SimRtc32, clock: &K, seconds: u64) -> Vec<Event> {
    advance32(rtc, clock, seconds * 1024)
}

fn dispatch<K: Timekeeper>(clock: &K, event: Event) {
    match event {
        Event::Overflow => clock.on_overflow(),
        Event::Compare => clock.on_compare(),
    }
}

/// Count occurrences of `event`.
pub fn count_events(events: &[Event], event: Event) -> usize {
    events.iter().filter(|e| **e == event).count()
}
