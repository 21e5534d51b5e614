//! Configuration traits and implementations for clock tuning.
//!
//! The `ClockConfig` trait allows compile-time configuration of interrupt
//! priority and backup behaviour without runtime overhead.

use crate::peripheral::InterruptLevel;

/// Clock configuration trait defining interrupt priority and backup timing.
///
/// All values are const (zero runtime cost). Both backends are generic over
/// a `ClockConfig`, defaulting to [`DefaultConfig`].
pub trait ClockConfig {
    /// Priority used for both the overflow and compare interrupts (default: Low)
    const INTERRUPT_LEVEL: InterruptLevel;

    /// Granularity of the seconds count kept in battery-backed storage (default: 2)
    ///
    /// Only used by the wide backend. Larger values stretch the 16-bit backup
    /// range at the cost of losing up to this many seconds on power loss.
    const BACKUP_INTERVAL_SECONDS: u32;

    /// Settle time between backup-domain reset and oscillator enable (default: 220)
    const OSCILLATOR_SETTLE_MICROS: u32;
}

/// Default configuration for typical battery-backed boards.
///
/// - INTERRUPT_LEVEL: Low
/// - BACKUP_INTERVAL_SECONDS: 2
/// - OSCILLATOR_SETTLE_MICROS: 220
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DefaultConfig;

impl ClockConfig for DefaultConfig {
    const INTERRUPT_LEVEL: InterruptLevel = InterruptLevel::Low;
    const BACKUP_INTERVAL_SECONDS: u32 = 2;
    const OSCILLATOR_SETTLE_MICROS: u32 = 220;
}

/// Configuration for applications where timekeeping must preempt everything.
///
/// - INTERRUPT_LEVEL: High
/// - BACKUP_INTERVAL_SECONDS: 1
/// - OSCILLATOR_SETTLE_MICROS: 500
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UrgentConfig;

impl ClockConfig for UrgentConfig {
    const INTERRUPT_LEVEL: InterruptLevel = InterruptLevel::High;
    const BACKUP_INTERVAL_SECONDS: u32 = 1;
    const OSCILLATOR_SETTLE_MICROS: u32 = 500;
}
