//! GATT server definition: HID-over-GATT keyboard + Battery Service.
//!
//! Three services, as the HOGP profile expects from a keyboard:
//! - HID Service (0x1812): report map, input report, HID info,
//!   protocol mode, control point
//! - Battery Service (0x180F): battery level with notify
//! - Device Information Service (0x180A)

use macropad::config;
use macropad::keys::KEYBOARD_REPORT_DESCRIPTOR;
use nrf_softdevice::ble::advertisement_builder::{
    AdvertisementDataType, Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload,
    ServiceList, ServiceUuid16,
};

/// Report Map length; the characteristic needs a fixed-size array type.
pub const REPORT_MAP_LEN: usize = KEYBOARD_REPORT_DESCRIPTOR.len();

const fn report_map() -> [u8; REPORT_MAP_LEN] {
    let mut buf = [0u8; REPORT_MAP_LEN];
    let mut i = 0;
    while i < REPORT_MAP_LEN {
        buf[i] = KEYBOARD_REPORT_DESCRIPTOR[i];
        i += 1;
    }
    buf
}

#[nrf_softdevice::gatt_service(uuid = "1812")]
pub struct HidService {
    /// Input report: the 8-byte boot-protocol keyboard report, with the
    /// Report Reference descriptor (report ID 0, type Input).
    #[characteristic(
        uuid = "2A4D",
        security = "justworks",
        read,
        notify,
        value = "[0u8; 8]",
        descriptor(uuid = "2908", security = "justworks", value = "[0, 1]")
    )]
    pub input_report: [u8; 8],

    /// bcdHID 1.11, no country code, remote-wake + normally-connectable.
    #[characteristic(
        uuid = "2A4A",
        security = "justworks",
        read,
        value = "[0x11, 0x01, 0x00, 0x03]"
    )]
    pub hid_info: [u8; 4],

    #[characteristic(
        uuid = "2A4B",
        security = "justworks",
        read,
        value = "report_map()"
    )]
    pub report_map: [u8; REPORT_MAP_LEN],

    /// Report protocol (1); boot protocol is not offered.
    #[characteristic(
        uuid = "2A4E",
        security = "justworks",
        read,
        write_without_response,
        value = "[1u8]"
    )]
    pub protocol_mode: [u8; 1],

    #[characteristic(
        uuid = "2A4C",
        security = "justworks",
        read,
        write_without_response,
        value = "[0u8]"
    )]
    pub hid_control: [u8; 1],
}

#[nrf_softdevice::gatt_service(uuid = "180F")]
pub struct BatteryService {
    #[characteristic(uuid = "2A19", security = "justworks", read, notify)]
    pub battery_level: u8,
}

/// Manufacturer Name String length; like the report map, the
/// characteristic needs a fixed-size array type.
pub const MANUFACTURER_LEN: usize = config::BLE_MANUFACTURER.len();

const fn manufacturer_name() -> [u8; MANUFACTURER_LEN] {
    let bytes = config::BLE_MANUFACTURER.as_bytes();
    let mut buf = [0u8; MANUFACTURER_LEN];
    let mut i = 0;
    while i < MANUFACTURER_LEN {
        buf[i] = bytes[i];
        i += 1;
    }
    buf
}

#[nrf_softdevice::gatt_service(uuid = "180A")]
pub struct DeviceInformationService {
    #[characteristic(
        uuid = "2A29",
        security = "justworks",
        read,
        value = "manufacturer_name()"
    )]
    pub manufacturer_name: [u8; MANUFACTURER_LEN],
}

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub battery: BatteryService,
    pub device_information: DeviceInformationService,
    pub hid: HidService,
}

/// Advertising payload: discoverable keyboard offering HID + Battery.
pub fn advertisement_data(name: &str) -> LegacyAdvertisementPayload {
    LegacyAdvertisementBuilder::new()
        .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
        .services_16(
            ServiceList::Incomplete,
            &[
                ServiceUuid16::BATTERY,
                ServiceUuid16::HUMAN_INTERFACE_DEVICE,
            ],
        )
        .full_name(name)
        // Appearance: keyboard (0x03C1), so hosts show the right icon
        .raw(AdvertisementDataType::APPEARANCE, &[0xC1, 0x03])
        .build()
}

/// Scan-response payload: the full service list.
pub fn scan_data() -> LegacyAdvertisementPayload {
    LegacyAdvertisementBuilder::new()
        .services_16(
            ServiceList::Complete,
            &[
                ServiceUuid16::BATTERY,
                ServiceUuid16::HUMAN_INTERFACE_DEVICE,
            ],
        )
        .build()
}
