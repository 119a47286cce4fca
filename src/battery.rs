//! Battery voltage to charge-percentage mapping.
//!
//! A LiPo cell's voltage is a poor linear proxy for its remaining charge,
//! so the conversion goes through a discrete charge curve sampled from a
//! typical 1S cell discharge. The lookup rounds *down* to the next lower
//! bracket rather than interpolating: a bracket edge reports the
//! percentage below it, never above.

use crate::config::{ADC_MAX, ADC_REF_VOLTS, BATTERY_CAL, BATTERY_DIVIDER};

/// Discharge curve of a 1S LiPo cell: (cell voltage, percent), strictly
/// decreasing by voltage, terminated by the (0, 0) floor bracket.
pub const CHARGE_CURVE: [(f32, u8); 22] = [
    (4.2, 100),
    (4.15, 95),
    (4.11, 90),
    (4.08, 85),
    (4.02, 80),
    (3.98, 75),
    (3.95, 70),
    (3.91, 65),
    (3.87, 60),
    (3.85, 55),
    (3.84, 50),
    (3.82, 45),
    (3.80, 40),
    (3.79, 35),
    (3.77, 30),
    (3.75, 25),
    (3.73, 20),
    (3.71, 15),
    (3.69, 10),
    (3.61, 5),
    (3.27, 0),
    (0.0, 0),
];

/// Map a measured cell voltage to a charge percentage (0-100).
///
/// Scans the curve from the lowest bracket upward and returns the
/// percentage of the bracket *below* the first entry whose voltage is at
/// or above the input. An input above the whole table keeps the pre-scan
/// default of 100 (saturation at full charge).
pub fn percentage(voltage: f32) -> u8 {
    let mut percent = 100;
    // The last row is the floor bracket; it is only ever read via i + 1.
    for i in (0..CHARGE_CURVE.len() - 1).rev() {
        if CHARGE_CURVE[i].0 >= voltage {
            percent = CHARGE_CURVE[i + 1].1;
            break;
        }
    }
    percent
}

/// Convert a raw battery-pin ADC sample to the cell voltage, undoing the
/// resistor divider and applying the measured correction factor.
pub fn adc_to_voltage(raw: u16) -> f32 {
    (raw as f32 / ADC_MAX as f32) * BATTERY_DIVIDER * ADC_REF_VOLTS * BATTERY_CAL
}
