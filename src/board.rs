//! nRF52840 board wiring: pins, ADC, clock, delays and the deep-sleep
//! lifecycle, implementing the scheduler's [`Board`] capability.
//!
//! Power model (System OFF ≈ 0.3 µA):
//! - Normal operation: the scheduler busy-polls with a 1 ms yield so the
//!   SoftDevice stays serviced.
//! - Deep sleep: GPIO SENSE armed on the button pin, then System OFF.
//!   Execution restarts from reset on wake; `wake_cause` reads the
//!   reset-reason register to tell the two apart.

use defmt::info;
use embassy_nrf::gpio::{AnyPin, Input, Level, Output, OutputDrive, Pull};
use embassy_nrf::interrupt::Priority;
use embassy_nrf::saadc::{self, ChannelConfig, Saadc};
use embassy_nrf::{bind_interrupts, pac, peripherals};
use embassy_time::{block_for, Duration, Instant};
use macropad::scheduler::Board;
use macropad::wake::WakeCause;

bind_interrupts!(pub struct Irqs {
    SAADC => saadc::InterruptHandler;
});

/// Button pin index within port 0; must match the pin handed to `new`.
const BUTTON_PIN: usize = 11;

/// HAL config leaving interrupt priorities 0, 1 and 4 to the SoftDevice.
pub fn nrf_config() -> embassy_nrf::config::Config {
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    config
}

/// Read and clear the reset reason, mapped onto the wake-cause
/// vocabulary. On this chip only GPIO-sense wake from System OFF is
/// distinguishable; everything else reports as a plain reset.
pub fn wake_cause() -> WakeCause {
    let reas = pac::POWER.resetreas().read();
    // Write-1-to-clear so the next boot sees only its own cause.
    pac::POWER.resetreas().write(|w| w.0 = 0xFFFF_FFFF);

    if reas.off() {
        WakeCause::External0
    } else if reas.lpcomp() {
        WakeCause::External1
    } else {
        WakeCause::Other
    }
}

/// The concrete board: one button, one LED, one battery divider on AIN2.
pub struct MacropadBoard {
    button: Input<'static>,
    led: Output<'static>,
    saadc: Saadc<'static, 1>,
}

impl MacropadBoard {
    pub fn new(
        button: AnyPin,
        led: AnyPin,
        battery_pin: peripherals::P0_04,
        adc: peripherals::SAADC,
    ) -> Self {
        let button = Input::new(button, Pull::Up);
        let led = Output::new(led, Level::Low, OutputDrive::Standard);

        // 12-bit single-ended sampling on the battery divider.
        let saadc_config = saadc::Config::default();
        let channel = ChannelConfig::single_ended(battery_pin);
        let mut saadc = Saadc::new(adc, Irqs, saadc_config, [channel]);
        // Offset calibration once before the first sample.
        embassy_futures::block_on(saadc.calibrate());

        // Arm the external wake while still awake: SENSE low on the
        // button pin survives into System OFF and brings the chip back.
        let board = Self { button, led, saadc };
        board.enable_wake_on_press();
        board
    }

    fn enable_wake_on_press(&self) {
        pac::P0
            .pin_cnf(BUTTON_PIN)
            .modify(|w| w.set_sense(pac::gpio::vals::Sense::LOW));
    }
}

impl Board for MacropadBoard {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }

    fn read_button(&mut self) -> bool {
        // Active low: pressed pulls the pin to ground.
        self.button.is_low()
    }

    fn set_led(&mut self, on: bool) {
        if on {
            self.led.set_high();
        } else {
            self.led.set_low();
        }
    }

    fn read_battery_adc(&mut self) -> u16 {
        let mut buf = [0i16; 1];
        embassy_futures::block_on(self.saadc.sample(&mut buf));
        // Single-ended samples can dip just below zero on an empty input.
        buf[0].max(0) as u16
    }

    fn delay_ms(&mut self, ms: u64) {
        block_for(Duration::from_millis(ms));
    }

    fn enter_deep_sleep(&mut self) {
        info!("Entering System OFF");
        unsafe {
            nrf_softdevice::raw::sd_power_system_off();
        }
        // System OFF takes effect on the next event boundary.
        loop {
            cortex_m::asm::wfe();
        }
    }
}
