//! Application-wide constants and compile-time configuration.
//!
//! All timing parameters, the key combination, and the battery
//! measurement scaling live here so they can be tuned in one place.

use crate::keys::Key;

// BLE

/// BLE device name advertised to hosts.
pub const BLE_DEVICE_NAME: &str = "Bluetooth Macro Pad";

/// Manufacturer string (Device Information Service).
pub const BLE_MANUFACTURER: &str = "macropad";

// Scheduler intervals (all monotonic milliseconds)

/// Button poll interval.
pub const KEY_POLL_INTERVAL_MS: u64 = 50;

/// Status LED base blink interval.
pub const STATUS_INTERVAL_MS: u64 = 1_000;

/// Multiplier applied to the blink interval for the connected "heartbeat"
/// cadence (long dark phase, short blip).
pub const STATUS_CONNECTED_MULT: u64 = 10;

/// Nominal battery check interval.
pub const BATTERY_INTERVAL_MS: u64 = 60_000;

/// The first battery check runs at `BATTERY_INTERVAL_MS / BATTERY_FIRST_DIV`
/// so the host gets a reading shortly after boot instead of a minute later.
pub const BATTERY_FIRST_DIV: u64 = 10;

/// Base idle timeout before deep sleep.
pub const IDLE_TIMEOUT_MS: u64 = 120_000;

/// Multiplier applied to the idle timeout after a key press that reached a
/// connected host (device is in active use, stay awake longer).
pub const IDLE_CONNECTED_MULT: u64 = 10;

/// How long the key combination is held before release - long enough for
/// the host to register all keys of the combination together.
pub const KEY_HOLD_MS: u64 = 25;

/// Pause before deep-sleep entry so pending log output can drain.
pub const SLEEP_FLUSH_MS: u64 = 1_000;

// Key combination

/// The shortcut emitted on every button press: keys are pressed in order
/// and released together. Default is GUI+F4.
pub const BUTTON_COMBO: &[Key] = &[Key::LeftGui, Key::F4];

// Battery measurement
//
// The battery sits behind a 1:2 resistor divider. The SAADC runs in its
// default single-ended configuration (0.6 V internal reference, gain 1/6)
// for a 3.6 V input range, with an extra correction factor of 1.1
// measured on hardware.

/// Full-scale ADC reading (12-bit).
pub const ADC_MAX: u16 = 4095;

/// SAADC full-scale input voltage (0.6 V internal reference at gain 1/6).
pub const ADC_REF_VOLTS: f32 = 3.6;

/// Resistor divider ratio between battery and ADC pin.
pub const BATTERY_DIVIDER: f32 = 2.0;

/// Empirical correction factor for divider and reference tolerances.
pub const BATTERY_CAL: f32 = 1.1;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Button        → P0.11 (active low, internal pull-up, deep-sleep wake)
//   Status LED    → P0.06
//   Battery sense → P0.04 (AIN2)
