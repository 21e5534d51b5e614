//! Test fixtures for realtime-clock testing.
//!
//! Provides:
//! - `SimRtc16`: register-level model of the 16-bit RTC
//! - `SimRtc32`: register-level model of the 32-bit RTC
//! - `SimBattery`: model of the battery-backed domain
//! - `RecordingDelay`: `DelayNs` that just adds up requested time
//!
//! Simulators hand out cheap clones sharing the same registers, so a test can
//! keep one handle while the clock owns another.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use embedded_hal::delay::DelayNs;
use realtime_clock::{BackupStatus, BatteryBackup, InterruptLevel, Rtc16, Rtc32};

/// Number of `is_busy` polls that report busy after a synchronised write.
pub const SYNC_POLLS: u32 = 2;

// ============================================================================
// SimRtc16 - 16-bit RTC model
// ============================================================================

/// Register file of the 16-bit RTC.
#[derive(Debug, Default)]
pub struct Rtc16Registers {
    pub count: u16,
    pub period: u16,
    pub compare: u16,
    pub running: bool,
    pub overflow_level: InterruptLevel,
    pub compare_level: InterruptLevel,

    /// Polls left before the current sync completes
    pub busy_polls_left: u32,
    /// Total `is_busy` calls that returned true
    pub busy_polls_seen: u32,
}

/// Shared handle to a simulated 16-bit RTC.
#[derive(Debug, Clone, Default)]
pub struct SimRtc16(Arc<Mutex<Rtc16Registers>>);

impl SimRtc16 {
    /// Fresh, stopped RTC with all registers zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the register file.
    pub fn regs(&self) -> MutexGuard<'_, Rtc16Registers> {
        self.0.lock().unwrap()
    }

    fn start_sync(&self) {
        self.regs().busy_polls_left = SYNC_POLLS;
    }
}

impl Rtc16 for SimRtc16 {
    fn is_busy(&self) -> bool {
        let mut regs = self.regs();
        if regs.busy_polls_left > 0 {
            regs.busy_polls_left -= 1;
            regs.busy_polls_seen += 1;
            true
        } else {
            false
        }
    }

    fn count(&self) -> u16 {
        self.regs().count
    }

    fn set_count(&mut self, count: u16) {
        self.regs().count = count;
        self.start_sync();
    }

    fn set_period(&mut self, period: u16) {
        self.regs().period = period;
        self.start_sync();
    }

    fn set_compare(&mut self, compare: u16) {
        self.regs().compare = compare;
    }

    fn start(&mut self) {
        self.regs().running = true;
        self.start_sync();
    }

    fn stop(&mut self) {
        self.regs().running = false;
        self.start_sync();
    }

    fn set_interrupts(&mut self, overflow: InterruptLevel, compare: InterruptLevel) {
        let mut regs = self.regs();
        regs.overflow_level = overflow;
        regs.compare_level = compare;
    }
}

// ============================================================================
// SimRtc32 - 32-bit RTC model
// ============================================================================

/// Register file of the 32-bit RTC.
#[derive(Debug, Default)]
pub struct Rtc32Registers {
    pub count: u32,
    pub period: u32,
    pub compare: u32,
    pub enabled: bool,
    pub powered: bool,
    pub overflow_level: InterruptLevel,
    pub compare_level: InterruptLevel,

    /// Count latched by the last sync request
    pub latched: u32,
    pub busy_polls_left: u32,
    /// Total counter sync requests
    pub sync_requests: u32,
    /// Writes to the counter register
    pub count_writes: u32,
    /// Times a counter write happened while enabled (lost on real hardware)
    pub writes_while_enabled: u32,
    pub flags_cleared: u32,
}

/// Shared handle to a simulated 32-bit RTC.
#[derive(Debug, Clone, Default)]
pub struct SimRtc32(Arc<Mutex<Rtc32Registers>>);

impl SimRtc32 {
    /// Fresh, disabled RTC with all registers zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// RTC that kept running in the backup domain while the MCU was off.
    pub fn running(count: u32) -> Self {
        let sim = Self::new();
        {
            let mut regs = sim.regs();
            regs.count = count;
            regs.period = u32::MAX;
            regs.enabled = true;
            regs.powered = true;
            regs.overflow_level = InterruptLevel::Low;
        }
        sim
    }

    /// Lock the register file.
    pub fn regs(&self) -> MutexGuard<'_, Rtc32Registers> {
        self.0.lock().unwrap()
    }

    fn start_sync(&self) {
        self.regs().busy_polls_left = SYNC_POLLS;
    }
}

impl Rtc32 for SimRtc32 {
    fn is_busy(&self) -> bool {
        let mut regs = self.regs();
        if regs.busy_polls_left > 0 {
            regs.busy_polls_left -= 1;
            true
        } else {
            false
        }
    }

    fn request_count_sync(&mut self) {
        {
            let mut regs = self.regs();
            regs.latched = regs.count;
            regs.sync_requests += 1;
        }
        self.start_sync();
    }

    fn count(&self) -> u32 {
        self.regs().latched
    }

    fn set_count(&mut self, count: u32) {
        {
            let mut regs = self.regs();
            if regs.enabled {
                regs.writes_while_enabled += 1;
            }
            regs.count = count;
            regs.count_writes += 1;
        }
        self.start_sync();
    }

    fn set_period(&mut self, period: u32) {
        self.regs().period = period;
        self.start_sync();
    }

    fn set_compare(&mut self, compare: u32) {
        self.regs().compare = compare;
        self.start_sync();
    }

    fn enable(&mut self) {
        self.regs().enabled = true;
        self.start_sync();
    }

    fn disable(&mut self) {
        self.regs().enabled = false;
        self.start_sync();
    }

    fn set_interrupts(&mut self, overflow: InterruptLevel, compare: InterruptLevel) {
        let mut regs = self.regs();
        regs.overflow_level = overflow;
        regs.compare_level = compare;
    }

    fn clear_interrupt_flags(&mut self, _overflow: bool, _compare: bool) {
        self.regs().flags_cleared += 1;
    }

    fn power_up(&mut self) {
        self.regs().powered = true;
    }
}

// ============================================================================
// SimBattery - backup power domain model
// ============================================================================

/// State of the battery-backed domain.
#[derive(Debug, Default)]
pub struct BatteryRegisters {
    pub status: BackupStatus,
    pub access_enabled: bool,
    pub cells: [u8; 2],
    pub resets: u32,
    pub failure_detection: bool,
    pub oscillator_enabled: bool,
    /// `oscillator_ready` polls left before the crystal reports stable
    pub oscillator_polls_left: u32,
    pub backup_writes: u32,
}

/// Shared handle to a simulated backup domain.
#[derive(Debug, Clone, Default)]
pub struct SimBattery(Arc<Mutex<BatteryRegisters>>);

impl SimBattery {
    /// Domain with the given flags and backup cell contents.
    pub fn new(status: BackupStatus, cells: [u8; 2]) -> Self {
        let sim = Self::default();
        {
            let mut regs = sim.regs();
            regs.status = status;
            regs.cells = cells;
            regs.oscillator_polls_left = 3;
        }
        sim
    }

    /// Domain that kept its battery through the power cut.
    pub fn healthy(cells: [u8; 2]) -> Self {
        Self::new(BackupStatus::default(), cells)
    }

    /// Domain that lost power along with the MCU.
    pub fn power_lost(cells: [u8; 2]) -> Self {
        Self::new(
            BackupStatus {
                power_lost: true,
                ..Default::default()
            },
            cells,
        )
    }

    /// Lock the domain state.
    pub fn regs(&self) -> MutexGuard<'_, BatteryRegisters> {
        self.0.lock().unwrap()
    }

    /// Backup cells decoded as a 16-bit block count.
    pub fn stored_block(&self) -> u16 {
        u16::from_le_bytes(self.regs().cells)
    }
}

impl BatteryBackup for SimBattery {
    fn status(&self) -> BackupStatus {
        self.regs().status
    }

    fn enable_access(&mut self) {
        self.regs().access_enabled = true;
    }

    fn reset(&mut self) {
        let mut regs = self.regs();
        regs.resets += 1;
        regs.status = BackupStatus::default();
        regs.cells = [0, 0];
        regs.oscillator_enabled = false;
        regs.failure_detection = false;
    }

    fn enable_failure_detection(&mut self) {
        self.regs().failure_detection = true;
    }

    fn enable_oscillator(&mut self) {
        self.regs().oscillator_enabled = true;
    }

    fn oscillator_ready(&self) -> bool {
        let mut regs = self.regs();
        if !regs.oscillator_enabled {
            return false;
        }
        if regs.oscillator_polls_left > 0 {
            regs.oscillator_polls_left -= 1;
            return false;
        }
        true
    }

    fn read_backup(&self) -> [u8; 2] {
        let regs = self.regs();
        // registers read as zero until access is unlocked
        if regs.access_enabled { regs.cells } else { [0, 0] }
    }

    fn write_backup(&mut self, cells: [u8; 2]) {
        let mut regs = self.regs();
        if regs.access_enabled {
            regs.cells = cells;
            regs.backup_writes += 1;
        }
    }
}

// ============================================================================
// RecordingDelay
// ============================================================================

/// Delay provider that records instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
    pub calls: u32,
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
        self.calls += 1;
    }
}
