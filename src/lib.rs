//! # realtime-clock
//!
//! Software clock for microcontrollers with a low-power RTC counter, without
//! a tick interrupt.
//!
//! **Key features:**
//! - **Lazy reconciliation** - the counter runs untouched; software only folds
//!   it into a wide accumulator on reads, overflows and periodic callbacks
//! - **Two backends** - a volatile 16-bit counter ([`NarrowClock`]) and a
//!   battery-backed 32-bit counter ([`WideClock`]) that survives power loss
//! - **Periodic callbacks** - fired from the compare interrupt every N seconds
//! - **Calendar** - [`DateTime`] / [`TimeSpan`] arithmetic over Unix seconds
//!
//! The board crate implements the register traits in [`peripheral`], places
//! a backend inside a [`Device`] in a `static`, and forwards the RTC
//! interrupts to [`Timekeeper::on_overflow`] and [`Timekeeper::on_compare`].
//!
//! ## Optional Features
//!
//! - `narrow` - 16-bit RTC backend (default)
//! - `wide` - 32-bit battery-backed RTC backend (default)
//! - `defmt` - structured logging and `defmt::Format` derives
//!
//! This library is `no_std` compatible. It relies on the `critical-section`
//! crate; the target must provide an implementation.

#![no_std]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

// Logging shims must come first so every module sees the macros
#[macro_use]
mod fmt;

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
pub mod error;
pub mod peripheral;

pub mod calendar;
pub mod clock;

pub mod device;

// ============================================================================
// Re-exports - Public API
// ============================================================================

// Configuration
pub use config::{ClockConfig, DefaultConfig, UrgentConfig};

// Error types
pub use error::ClockError;

// Hardware interface
pub use peripheral::{BackupStatus, BatteryBackup, InterruptLevel, Rtc16, Rtc32};

// Engine
pub use clock::{PeriodicCallback, Timekeeper};

#[cfg(feature = "narrow")]
pub use clock::NarrowClock;

#[cfg(feature = "wide")]
pub use clock::WideClock;

// Calendar
pub use calendar::{DateTime, TimeSpan};

// Facade
pub use device::Device;

// ============================================================================
// Library Metadata
// ============================================================================

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
