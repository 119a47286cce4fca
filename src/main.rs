//! macropad - single-button BLE HID macro keyboard.
//!
//! Embedded entry point for the nRF52840 + SoftDevice S140 build
//! (`cargo build --features embedded --target thumbv7em-none-eabihf`).
//!
//! The pure scheduler from the library crate does all the work; this file
//! only wires it to the real board and the BLE stack, then busy-polls it
//! with a 1 ms cooperative yield per iteration.

#![no_std]
#![no_main]

mod ble;
mod board;

use defmt::info;
use embassy_executor::Spawner;
use embassy_nrf::gpio::Pin;
use embassy_time::{Instant, Timer};
use macropad::config;
use macropad::scheduler::{Scheduler, Step};
use {defmt_rtt as _, panic_probe as _};

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(board::nrf_config());

    info!("Bluetooth Macro Pad started!");
    info!("{}", board::wake_cause().describe());

    let mut link = ble::start(spawner);
    let mut board = board::MacropadBoard::new(
        p.P0_11.degrade(),
        p.P0_06.degrade(),
        p.P0_04,
        p.SAADC,
    );

    let mut sched = Scheduler::new(Instant::now().as_millis(), config::BUTTON_COMBO);

    loop {
        match sched.tick(&mut link, &mut board) {
            // Yield so the SoftDevice and the BLE tasks get CPU time.
            Step::Continue => Timer::after_millis(1).await,
            // enter_deep_sleep powers the system off and never returns.
            Step::Sleeping => defmt::unreachable!(),
        }
    }
}
