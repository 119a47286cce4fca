//! Unified error type for the embedded BLE path.
//!
//! The scheduler core has no recoverable-error taxonomy - pin reads and
//! HID calls are treated as always-succeeding, and the absence of a BLE
//! connection is policy, not an error. What remains are the ways the BLE
//! stack itself can fail, reported here. We avoid `alloc` - all variants
//! carry only fixed-size data, and the type implements `defmt::Format`
//! for efficient on-target logging.

use defmt::Format;

/// Top-level error type used by the BLE wiring.
#[derive(Debug, Clone, Copy, Format)]
pub enum Error {
    /// The SoftDevice returned a BLE-level error.
    Ble(BleError),

    /// Advertising could not be started.
    AdvertiseFailed,
}

/// Subset of BLE errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, Format)]
pub enum BleError {
    /// GATT notify was rejected (host unsubscribed, buffers full, or the
    /// connection dropped mid-call).
    NotifyFailed,
}

// Convenience conversions

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}
