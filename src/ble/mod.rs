//! Bluetooth Low Energy subsystem.
//!
//! Drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **Advertiser** - announces a HID keyboard until a host connects.
//! 2. **GATT server** - HID, Battery and Device Information services
//!    (see [`hid_service`]).
//! 3. **Link handle** - [`BleLink`] gives the scheduler a synchronous
//!    view of the link: connection status, key press/release, battery
//!    level. Connection state is shared with the advertiser task through
//!    an atomic plus a critical-section mutex around the handle.

pub mod hid_service;

use core::cell::RefCell;
use core::mem;
use core::sync::atomic::{AtomicBool, Ordering};

use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::Timer;
use macropad::config;
use macropad::error::{BleError, Error};
use macropad::keys::{Key, KeyboardReport};
use macropad::scheduler::HidLink;
use nrf_softdevice::ble::{gatt_server, peripheral, Connection};
use nrf_softdevice::{raw, Softdevice};
use static_cell::StaticCell;

use hid_service::Server;

/// Set while a host is connected; read synchronously by the scheduler.
static CONNECTED: AtomicBool = AtomicBool::new(false);

/// The live connection, shared between the advertiser task (which owns
/// the connect/disconnect flow) and [`BleLink`] (which notifies on it).
static CONNECTION: Mutex<CriticalSectionRawMutex, RefCell<Option<Connection>>> =
    Mutex::new(RefCell::new(None));

static SERVER: StaticCell<Server> = StaticCell::new();

/// SoftDevice configuration for a single-link HID peripheral.
fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 128 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: 1024,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: config::BLE_DEVICE_NAME.as_ptr() as _,
            current_len: config::BLE_DEVICE_NAME.len() as u16,
            max_len: config::BLE_DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

/// Advertise, serve one connection, repeat.
#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, server: &'static Server) -> ! {
    let adv_data = hid_service::advertisement_data(config::BLE_DEVICE_NAME);
    let scan_data = hid_service::scan_data();

    loop {
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
            adv_data: &adv_data,
            scan_data: &scan_data,
        };
        let conn = match peripheral::advertise_connectable(sd, adv, &Default::default())
            .await
            .map_err(|_| Error::AdvertiseFailed)
        {
            Ok(conn) => conn,
            Err(e) => {
                warn!("BLE: {:?}", e);
                // Back off rather than spinning if advertising keeps failing.
                Timer::after_millis(500).await;
                continue;
            }
        };

        info!("BLE host connected");
        CONNECTION.lock(|c| c.borrow_mut().replace(conn.clone()));
        CONNECTED.store(true, Ordering::Release);

        // Runs until the host disconnects. Writes to protocol mode and
        // control point are accepted and ignored - the pad only ever
        // speaks report protocol and has no suspend behavior.
        let reason = gatt_server::run(&conn, server, |_| {}).await;

        CONNECTED.store(false, Ordering::Release);
        CONNECTION.lock(|c| c.borrow_mut().take());
        info!("BLE host disconnected: {:?}", reason);
    }
}

/// Enable the SoftDevice, register the GATT server and start the
/// background tasks. Returns the scheduler-side link handle.
pub fn start(spawner: Spawner) -> BleLink {
    let sd = Softdevice::enable(&softdevice_config());
    let server = SERVER.init(unwrap!(Server::new(sd)));

    // The immutable ref runs the SoftDevice task; `enable` gave us the
    // only mutable one for server registration.
    let sd_ref = unsafe { Softdevice::steal() };
    unwrap!(spawner.spawn(softdevice_task(sd_ref)));
    unwrap!(spawner.spawn(ble_task(sd_ref, server)));

    BleLink::new(server)
}

/// Synchronous HID link facade over the GATT server, owned by the
/// scheduler loop. Keeps the current report so presses accumulate until
/// `release_all`.
pub struct BleLink {
    server: &'static Server,
    report: KeyboardReport,
}

impl BleLink {
    fn new(server: &'static Server) -> Self {
        Self {
            server,
            report: KeyboardReport::empty(),
        }
    }

    fn notify_report(&self) {
        if let Err(e) = self.try_notify_report() {
            warn!("HID notify failed: {:?}", e);
        }
    }

    fn try_notify_report(&self) -> Result<(), Error> {
        CONNECTION.lock(|c| {
            if let Some(conn) = c.borrow().as_ref() {
                self.server
                    .hid
                    .input_report_notify(conn, &self.report.to_bytes())
                    .map_err(|_| BleError::NotifyFailed)?;
            }
            Ok(())
        })
    }

    fn try_report_battery(&self, percent: u8) -> Result<(), Error> {
        CONNECTION.lock(|c| match c.borrow().as_ref() {
            Some(conn) => self
                .server
                .battery
                .battery_level_notify(conn, &percent)
                .map_err(|_| BleError::NotifyFailed.into()),
            // Not connected: store the value so it is read back correctly
            // once a host subscribes.
            None => self
                .server
                .battery
                .battery_level_set(&percent)
                .map_err(|_| BleError::NotifyFailed.into()),
        })
    }
}

impl HidLink for BleLink {
    fn is_connected(&self) -> bool {
        CONNECTED.load(Ordering::Acquire)
    }

    fn press(&mut self, key: Key) {
        self.report.press(key);
        self.notify_report();
    }

    fn release_all(&mut self) {
        self.report.release_all();
        self.notify_report();
    }

    fn set_battery_level(&mut self, percent: u8) {
        if let Err(e) = self.try_report_battery(percent) {
            warn!("Battery report failed: {:?}", e);
        }
    }
}
