//! HID keyboard report building (boot protocol compatible).
//!
//! Layout (8 bytes):
//! ```text
//! Byte 0: Modifier keys (bitfield)
//!         Bit 0 = Left Ctrl,  Bit 1 = Left Shift,
//!         Bit 2 = Left Alt,   Bit 3 = Left GUI,
//!         Bit 4 = Right Ctrl, Bit 5 = Right Shift,
//!         Bit 6 = Right Alt,  Bit 7 = Right GUI
//! Byte 1: Reserved (0x00)
//! Byte 2-7: Up to 6 simultaneous key codes (USB HID usage codes)
//! ```

/// Keyboard report size in bytes.
pub const KEYBOARD_REPORT_SIZE: usize = 8;

/// Keys the macro combo machinery understands. Modifiers travel in the
/// report's modifier bitfield; everything else occupies a keycode slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    LeftCtrl,
    LeftShift,
    LeftAlt,
    LeftGui,
    RightCtrl,
    RightShift,
    RightAlt,
    RightGui,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Enter,
    Escape,
    Space,
}

impl Key {
    /// Modifier bit for modifier keys, `None` for regular usages.
    pub fn modifier_bit(self) -> Option<u8> {
        let bit = match self {
            Key::LeftCtrl => 0x01,
            Key::LeftShift => 0x02,
            Key::LeftAlt => 0x04,
            Key::LeftGui => 0x08,
            Key::RightCtrl => 0x10,
            Key::RightShift => 0x20,
            Key::RightAlt => 0x40,
            Key::RightGui => 0x80,
            _ => return None,
        };
        Some(bit)
    }

    /// HID usage code (Keyboard/Keypad page) for non-modifier keys.
    pub fn usage(self) -> Option<u8> {
        let code = match self {
            Key::Enter => 0x28,
            Key::Escape => 0x29,
            Key::Space => 0x2C,
            Key::F1 => 0x3A,
            Key::F2 => 0x3B,
            Key::F3 => 0x3C,
            Key::F4 => 0x3D,
            Key::F5 => 0x3E,
            Key::F6 => 0x3F,
            Key::F7 => 0x40,
            Key::F8 => 0x41,
            Key::F9 => 0x42,
            Key::F10 => 0x43,
            Key::F11 => 0x44,
            Key::F12 => 0x45,
            _ => return None,
        };
        Some(code)
    }
}

/// Standard USB HID boot-protocol keyboard report.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    /// Modifier key bitfield.
    pub modifier: u8,
    /// Reserved byte (always 0x00 per HID spec).
    pub reserved: u8,
    /// Up to 6 simultaneously pressed key codes.
    pub keycodes: [u8; 6],
}

impl KeyboardReport {
    /// Create an empty (all-keys-released) report.
    pub const fn empty() -> Self {
        Self {
            modifier: 0,
            reserved: 0,
            keycodes: [0; 6],
        }
    }

    /// Add a key to the report. Modifiers OR into the bitfield; regular
    /// keys take the first free keycode slot. A key beyond the 6-key
    /// rollover bound is dropped, matching boot-protocol behavior.
    pub fn press(&mut self, key: Key) {
        if let Some(bit) = key.modifier_bit() {
            self.modifier |= bit;
        } else if let Some(code) = key.usage() {
            if self.keycodes.contains(&code) {
                return;
            }
            if let Some(slot) = self.keycodes.iter_mut().find(|slot| **slot == 0) {
                *slot = code;
            }
        }
    }

    /// Clear every held key and modifier.
    pub fn release_all(&mut self) {
        *self = Self::empty();
    }

    /// Serialise into a byte slice for HID transmission.
    /// Returns the number of bytes written (always 8).
    pub fn serialize(&self, buf: &mut [u8]) -> usize {
        if buf.len() < KEYBOARD_REPORT_SIZE {
            return 0;
        }
        buf[0] = self.modifier;
        buf[1] = self.reserved;
        buf[2..8].copy_from_slice(&self.keycodes);
        KEYBOARD_REPORT_SIZE
    }

    /// Fixed-size byte form for GATT notification.
    pub fn to_bytes(&self) -> [u8; KEYBOARD_REPORT_SIZE] {
        let mut buf = [0u8; KEYBOARD_REPORT_SIZE];
        self.serialize(&mut buf);
        buf
    }

    /// Returns `true` if no keys are pressed (release event).
    pub fn is_empty(&self) -> bool {
        self.modifier == 0 && self.keycodes.iter().all(|&k| k == 0)
    }
}

// HID report descriptor for a boot-protocol keyboard

/// HID Report Map for a standard keyboard, served from the HID service's
/// Report Map characteristic (0x2A4B).
///
/// Describes a keyboard with:
///   - 8 modifier key bits (input)
///   - 1 reserved byte
///   - 5 LED indicators (output)
///   - 6 key code bytes (input)
pub const KEYBOARD_REPORT_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xA1, 0x01, // Collection (Application)
    //
    //   - Modifier keys (8 bits) -
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0xE0, //   Usage Minimum (Left Control)
    0x29, 0xE7, //   Usage Maximum (Right GUI)
    0x15, 0x00, //   Logical Minimum (0)
    0x25, 0x01, //   Logical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x08, //   Report Count (8)
    0x81, 0x02, //   Input (Data, Variable, Absolute)
    //
    //   - Reserved byte -
    0x95, 0x01, //   Report Count (1)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x01, //   Input (Constant) - padding
    //
    //   - LED output (5 bits + 3 padding) -
    0x05, 0x08, //   Usage Page (LEDs)
    0x19, 0x01, //   Usage Minimum (Num Lock)
    0x29, 0x05, //   Usage Maximum (Kana)
    0x95, 0x05, //   Report Count (5)
    0x75, 0x01, //   Report Size (1)
    0x91, 0x02, //   Output (Data, Variable, Absolute)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x03, //   Report Size (3)
    0x91, 0x01, //   Output (Constant) - padding
    //
    //   - Key codes (6 bytes) -
    0x05, 0x07, //   Usage Page (Keyboard/Keypad)
    0x19, 0x00, //   Usage Minimum (0)
    0x29, 0xFF, //   Usage Maximum (255)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xFF, 0x00, // Logical Maximum (255)
    0x95, 0x06, //   Report Count (6)
    0x75, 0x08, //   Report Size (8)
    0x81, 0x00, //   Input (Data, Array)
    //
    0xC0, // End Collection
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_empty() {
        let report = KeyboardReport::empty();
        assert!(report.is_empty());
        assert_eq!(report.modifier, 0);
        assert_eq!(report.keycodes, [0; 6]);
    }

    #[test]
    fn modifiers_set_bits_not_slots() {
        let mut report = KeyboardReport::empty();
        report.press(Key::LeftGui);
        report.press(Key::LeftShift);
        assert_eq!(report.modifier, 0x08 | 0x02);
        assert_eq!(report.keycodes, [0; 6]);
        assert!(!report.is_empty());
    }

    #[test]
    fn regular_keys_fill_slots_in_order() {
        let mut report = KeyboardReport::empty();
        report.press(Key::F4);
        report.press(Key::Enter);
        assert_eq!(report.modifier, 0);
        assert_eq!(report.keycodes, [0x3D, 0x28, 0, 0, 0, 0]);
    }

    #[test]
    fn duplicate_press_is_idempotent() {
        let mut report = KeyboardReport::empty();
        report.press(Key::F4);
        report.press(Key::F4);
        assert_eq!(report.keycodes, [0x3D, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn seventh_key_is_dropped() {
        let mut report = KeyboardReport::empty();
        for key in [Key::F1, Key::F2, Key::F3, Key::F4, Key::F5, Key::F6] {
            report.press(key);
        }
        report.press(Key::F7);
        assert_eq!(report.keycodes, [0x3A, 0x3B, 0x3C, 0x3D, 0x3E, 0x3F]);
    }

    #[test]
    fn default_combo_serializes_to_gui_f4() {
        let mut report = KeyboardReport::empty();
        report.press(Key::LeftGui);
        report.press(Key::F4);

        let mut buf = [0u8; 8];
        assert_eq!(report.serialize(&mut buf), 8);
        assert_eq!(buf, [0x08, 0x00, 0x3D, 0x00, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(report.to_bytes(), buf);
    }

    #[test]
    fn serialize_buffer_too_small() {
        let report = KeyboardReport::empty();
        let mut buf = [0u8; 4];
        assert_eq!(report.serialize(&mut buf), 0);
    }

    #[test]
    fn release_all_clears_everything() {
        let mut report = KeyboardReport::empty();
        report.press(Key::LeftGui);
        report.press(Key::F4);
        report.release_all();
        assert!(report.is_empty());
    }
}
