//! Register-level abstraction of the RTC peripherals.
//!
//! The board crate implements these traits on top of its PAC. Every method
//! maps to one or two register accesses; none of them may block except where
//! stated. Callers are responsible for polling [`Rtc16::is_busy`] /
//! [`Rtc32::is_busy`] before touching counter registers.
//!
//! NOTE: the busy poll has no timeout. If the RTC clock source is missing the
//! poll never finishes; that is a board misconfiguration, not something this
//! crate detects.

/// Interrupt priority level for the overflow and compare sources.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum InterruptLevel {
    /// Interrupt source disabled
    #[default]
    Off = 0,
    /// Low priority
    Low = 1,
    /// Medium priority
    Medium = 2,
    /// High priority
    High = 3,
}

impl InterruptLevel {
    /// Whether the source can fire at all.
    pub const fn is_enabled(self) -> bool {
        !matches!(self, InterruptLevel::Off)
    }
}

/// 16-bit RTC running from a ~1 kHz source. Loses its count on power-down.
pub trait Rtc16 {
    /// Register synchronisation in progress.
    fn is_busy(&self) -> bool;

    /// Current counter value.
    fn count(&self) -> u16;

    /// Overwrite the counter.
    fn set_count(&mut self, count: u16);

    /// Top value; the counter wraps to zero on the tick after reaching it.
    fn set_period(&mut self, period: u16);

    /// Compare match value.
    fn set_compare(&mut self, compare: u16);

    /// Run the prescaler (count at full rate).
    fn start(&mut self);

    /// Gate the prescaler off. The counter holds its value.
    fn stop(&mut self);

    /// Program both interrupt levels at once.
    fn set_interrupts(&mut self, overflow: InterruptLevel, compare: InterruptLevel);
}

/// 32-bit RTC in the battery-backed domain, clocked at 1024 Hz.
pub trait Rtc32 {
    /// Register synchronisation in progress.
    fn is_busy(&self) -> bool;

    /// Ask the peripheral to latch the counter into the readable register.
    ///
    /// [`count`](Rtc32::count) is only valid once [`is_busy`](Rtc32::is_busy)
    /// returns `false` after this call.
    fn request_count_sync(&mut self);

    /// Latched counter value.
    fn count(&self) -> u32;

    /// Overwrite the counter. Only valid while disabled.
    fn set_count(&mut self, count: u32);

    /// Top value; the counter wraps to zero on the tick after reaching it.
    fn set_period(&mut self, period: u32);

    /// Compare match value.
    fn set_compare(&mut self, compare: u32);

    /// Start counting.
    fn enable(&mut self);

    /// Stop counting.
    fn disable(&mut self);

    /// Program both interrupt levels at once.
    fn set_interrupts(&mut self, overflow: InterruptLevel, compare: InterruptLevel);

    /// Acknowledge pending interrupt flags.
    fn clear_interrupt_flags(&mut self, overflow: bool, compare: bool);

    /// Take the peripheral out of power reduction.
    fn power_up(&mut self);
}

/// Status flags of the backup battery domain, sampled at startup.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct BackupStatus {
    /// Backup domain lost battery power
    pub power_lost: bool,
    /// Backup domain went through its own power-on reset
    pub power_on_reset: bool,
    /// Backup domain brown-out detected
    pub brown_out: bool,
    /// 32 kHz crystal failure detected
    pub oscillator_failed: bool,
}

impl BackupStatus {
    /// Whether the domain's state is in doubt.
    ///
    /// Any single flag is enough: a possibly-corrupt seconds count is worse
    /// than starting over.
    pub const fn needs_reset(&self) -> bool {
        self.power_lost || self.power_on_reset || self.brown_out || self.oscillator_failed
    }
}

/// Battery-backed power domain hosting the 32-bit RTC and its oscillator.
pub trait BatteryBackup {
    /// Sample the status flags.
    fn status(&self) -> BackupStatus;

    /// Unlock access to the domain's registers.
    fn enable_access(&mut self);

    /// Reset the domain (protected write sequence).
    fn reset(&mut self);

    /// Arm crystal failure detection.
    fn enable_failure_detection(&mut self);

    /// Start the crystal oscillator with its 1024 Hz output selected.
    fn enable_oscillator(&mut self);

    /// Oscillator running and stable.
    fn oscillator_ready(&self) -> bool;

    /// Read the two backup cells.
    fn read_backup(&self) -> [u8; 2];

    /// Write the two backup cells.
    fn write_backup(&mut self, cells: [u8; 2]);
}

/// Spin until the 16-bit RTC finishes synchronising.
#[inline]
pub(crate) fn wait_until_ready16<T: Rtc16>(rtc: &T) {
    while rtc.is_busy() {
        core::hint::spin_loop();
    }
}

/// Spin until the 32-bit RTC finishes synchronising.
#[inline]
pub(crate) fn wait_until_ready32<T: Rtc32>(rtc: &T) {
    while rtc.is_busy() {
        core::hint::spin_loop();
    }
}
