//! Cooperative event scheduler - the firmware main loop.
//!
//! Four timed actions share one thread of control, each owning a single
//! deadline against the monotonic millisecond clock:
//!
//! - **Key poll** (50 ms): rising-edge detection on the button, emits the
//!   configured key combination over the BLE HID link.
//! - **Status blink** (1 s base): LED heartbeat, cadence encodes the
//!   connection state (slow heartbeat when paired, steady blink when
//!   searching).
//! - **Battery check** (60 s nominal, first run after 6 s): ADC sample →
//!   voltage → charge percentage → BLE Battery Service.
//! - **Idle timeout** (120 s base): deep-sleep entry when the device has
//!   been neither used nor connected for too long.
//!
//! No RTOS, no interrupts for logic: every loop iteration checks each
//! deadline in fixed order and runs the action whose deadline has passed.
//! An action reschedules itself to `now + interval` before returning, and
//! never touches another action's deadline - except the press action,
//! which deliberately pushes the idle timeout out while the pad is in use.

use crate::battery;
use crate::config;
use crate::keys::Key;

// Logging that vanishes on host builds (defmt is embedded-only).
macro_rules! info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "defmt")]
        defmt::info!($($arg)*);
    }};
}

/// What the loop should do after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Keep polling.
    Continue,
    /// Deep-sleep entry was requested; a real board never returns from it,
    /// so seeing this value means the board implementation is a test double.
    Sleeping,
}

/// The BLE HID keyboard link, as seen by the scheduler.
///
/// All calls are treated as always-succeeding; a disconnected host is a
/// policy condition (`is_connected`), not an error.
pub trait HidLink {
    /// Whether a host is currently connected and subscribed.
    fn is_connected(&self) -> bool;
    /// Add a key to the held set and send the updated report.
    fn press(&mut self, key: Key);
    /// Release every held key and send the empty report.
    fn release_all(&mut self);
    /// Publish the battery level (0-100) via the Battery Service.
    fn set_battery_level(&mut self, percent: u8);
}

/// Board services consumed by the scheduler: pins, clock, bounded delays
/// and the deep-sleep lifecycle.
pub trait Board {
    /// Monotonic milliseconds since boot.
    fn now_ms(&self) -> u64;
    /// Logical button level, `true` = pressed.
    fn read_button(&mut self) -> bool;
    /// Drive the status/indicator LED.
    fn set_led(&mut self, on: bool);
    /// Raw battery-pin ADC sample (12-bit scale).
    fn read_battery_adc(&mut self) -> u16;
    /// Short bounded blocking delay. Only used for the key hold time and
    /// the pre-sleep log flush; never as a general wait.
    fn delay_ms(&mut self, ms: u64);
    /// Power the device down until the external wake signal or a reset.
    /// Real implementations never return; test doubles record the call.
    fn enter_deep_sleep(&mut self);
}

/// All scheduler state: four deadlines plus the two edge/phase booleans.
/// One instance lives for the device's lifetime between sleep cycles and
/// is rebuilt from scratch on every boot or wake.
pub struct Scheduler {
    /// Keys emitted on each button press, in press order.
    combo: &'static [Key],
    next_key_poll: u64,
    next_status: u64,
    next_battery: u64,
    idle_deadline: u64,
    /// Last observed logical button level. Starts `true` so a wake button
    /// still held at boot does not fire until a full release/press cycle.
    button_level: bool,
    /// LED phase written on the next status tick.
    led_phase: bool,
    blink_interval: u64,
}

impl Scheduler {
    /// Build the initial schedule. The battery check is deliberately
    /// brought forward so the host sees a level shortly after boot.
    pub fn new(now: u64, combo: &'static [Key]) -> Self {
        Self {
            combo,
            next_key_poll: now + config::KEY_POLL_INTERVAL_MS,
            next_status: now + config::STATUS_INTERVAL_MS,
            next_battery: now + config::BATTERY_INTERVAL_MS / config::BATTERY_FIRST_DIV,
            idle_deadline: now + config::IDLE_TIMEOUT_MS,
            button_level: true,
            led_phase: false,
            blink_interval: config::STATUS_INTERVAL_MS,
        }
    }

    /// Current blink interval (for the cadence the LED is running at).
    pub fn blink_interval(&self) -> u64 {
        self.blink_interval
    }

    /// Deadline of the next battery check.
    pub fn next_battery(&self) -> u64 {
        self.next_battery
    }

    /// Deadline after which the idle timeout fires.
    pub fn idle_deadline(&self) -> u64 {
        self.idle_deadline
    }

    /// One loop iteration: evaluate every deadline in fixed order
    /// (key poll, status, battery, timeout) and run each action that is
    /// due. Multiple actions may run in the same tick; none preempts
    /// another.
    pub fn tick(&mut self, link: &mut impl HidLink, board: &mut impl Board) -> Step {
        if self.next_key_poll < board.now_ms() {
            let level = board.read_button();
            if level != self.button_level {
                self.button_level = level;
                // Rising edge only: a release or a held level never fires.
                if level {
                    self.press_action(link, board);
                }
            }
            self.next_key_poll = board.now_ms() + config::KEY_POLL_INTERVAL_MS;
        }

        if self.next_status < board.now_ms() {
            // Long dark phase while connected, steady blink while searching.
            self.blink_interval = if link.is_connected() && !self.led_phase {
                config::STATUS_INTERVAL_MS * config::STATUS_CONNECTED_MULT
            } else {
                config::STATUS_INTERVAL_MS
            };
            board.set_led(self.led_phase);
            self.led_phase = !self.led_phase;
            self.next_status = board.now_ms() + self.blink_interval;
        }

        if self.next_battery < board.now_ms() {
            let raw = board.read_battery_adc();
            let voltage = battery::adc_to_voltage(raw);
            let percent = battery::percentage(voltage);
            link.set_battery_level(percent);
            info!("Battery: {} V, {} %", voltage, percent);
            self.next_battery = board.now_ms() + config::BATTERY_INTERVAL_MS;
        }

        if self.idle_deadline < board.now_ms() {
            info!("No BLE connection or button activity, going to sleep; wake by button press or reset");
            board.delay_ms(config::SLEEP_FLUSH_MS);
            board.enter_deep_sleep();
            return Step::Sleeping;
        }

        Step::Continue
    }

    /// The one action with a host-visible side effect. Emits the combo if
    /// a host is listening, and pushes the idle deadline out either way -
    /// far out after a successful press, base timeout otherwise (give an
    /// unpaired host time to connect).
    fn press_action(&mut self, link: &mut impl HidLink, board: &mut impl Board) {
        info!("press");
        board.set_led(true);
        if link.is_connected() {
            for &key in self.combo {
                link.press(key);
            }
            board.delay_ms(config::KEY_HOLD_MS);
            link.release_all();
            self.idle_deadline =
                board.now_ms() + config::IDLE_TIMEOUT_MS * config::IDLE_CONNECTED_MULT;
        } else {
            self.idle_deadline = board.now_ms() + config::IDLE_TIMEOUT_MS;
        }
        board.set_led(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    const COMBO: &[Key] = &[Key::LeftGui, Key::F4];

    struct MockLink {
        connected: bool,
        pressed: Vec<Key, 8>,
        releases: usize,
        battery: Option<u8>,
    }

    impl MockLink {
        fn new(connected: bool) -> Self {
            Self {
                connected,
                pressed: Vec::new(),
                releases: 0,
                battery: None,
            }
        }
    }

    impl HidLink for MockLink {
        fn is_connected(&self) -> bool {
            self.connected
        }
        fn press(&mut self, key: Key) {
            self.pressed.push(key).unwrap();
        }
        fn release_all(&mut self) {
            self.releases += 1;
        }
        fn set_battery_level(&mut self, percent: u8) {
            self.battery = Some(percent);
        }
    }

    struct MockBoard {
        clock: u64,
        button: bool,
        adc: u16,
        led_writes: Vec<bool, 16>,
        delays: Vec<u64, 8>,
        sleeps: usize,
    }

    impl MockBoard {
        fn new() -> Self {
            Self {
                clock: 0,
                button: false,
                adc: 0,
                led_writes: Vec::new(),
                delays: Vec::new(),
                sleeps: 0,
            }
        }
    }

    impl Board for MockBoard {
        fn now_ms(&self) -> u64 {
            self.clock
        }
        fn read_button(&mut self) -> bool {
            self.button
        }
        fn set_led(&mut self, on: bool) {
            self.led_writes.push(on).unwrap();
        }
        fn read_battery_adc(&mut self) -> u16 {
            self.adc
        }
        fn delay_ms(&mut self, ms: u64) {
            // Model real time passing during the delay.
            self.clock += ms;
            self.delays.push(ms).unwrap();
        }
        fn enter_deep_sleep(&mut self) {
            self.sleeps += 1;
        }
    }

    #[test]
    fn press_fires_once_per_rising_edge() {
        let mut sched = Scheduler::new(0, COMBO);
        let mut link = MockLink::new(true);
        let mut board = MockBoard::new();

        // First poll sees the released level; edge state updates, no press.
        board.clock = 60;
        board.button = false;
        sched.tick(&mut link, &mut board);
        assert!(link.pressed.is_empty());

        // Rising edge: combo goes out once, in order, then release-all.
        board.clock = 120;
        board.button = true;
        sched.tick(&mut link, &mut board);
        assert_eq!(link.pressed.as_slice(), COMBO);
        assert_eq!(link.releases, 1);

        // Clock advanced by the 25 ms hold inside the press action.
        assert_eq!(board.clock, 145);

        // Held level at the next poll fires nothing.
        board.clock = 200;
        sched.tick(&mut link, &mut board);
        assert_eq!(link.pressed.len(), 2);
        assert_eq!(link.releases, 1);

        // Falling edge fires nothing either.
        board.clock = 260;
        board.button = false;
        sched.tick(&mut link, &mut board);
        assert_eq!(link.pressed.len(), 2);
        assert_eq!(link.releases, 1);
    }

    #[test]
    fn press_indicator_led_pulses() {
        let mut sched = Scheduler::new(0, COMBO);
        let mut link = MockLink::new(true);
        let mut board = MockBoard::new();

        board.clock = 60;
        sched.tick(&mut link, &mut board);
        board.clock = 120;
        board.button = true;
        sched.tick(&mut link, &mut board);

        // LED on at entry, off before the action returns.
        assert_eq!(board.led_writes.as_slice(), &[true, false]);
    }

    #[test]
    fn press_while_connected_extends_idle_tenfold() {
        let mut sched = Scheduler::new(0, COMBO);
        let mut link = MockLink::new(true);
        let mut board = MockBoard::new();

        board.clock = 60;
        sched.tick(&mut link, &mut board);
        board.clock = 120;
        board.button = true;
        sched.tick(&mut link, &mut board);

        // Measured from the post-hold clock (120 + 25).
        assert_eq!(sched.idle_deadline(), 145 + 10 * config::IDLE_TIMEOUT_MS);
        assert_eq!(board.delays.as_slice(), &[config::KEY_HOLD_MS]);
    }

    #[test]
    fn press_while_disconnected_extends_idle_by_base_only() {
        let mut sched = Scheduler::new(0, COMBO);
        let mut link = MockLink::new(false);
        let mut board = MockBoard::new();

        board.clock = 60;
        sched.tick(&mut link, &mut board);
        board.clock = 120;
        board.button = true;
        sched.tick(&mut link, &mut board);

        // No keys sent, no hold delay, base extension only.
        assert!(link.pressed.is_empty());
        assert_eq!(link.releases, 0);
        assert!(board.delays.is_empty());
        assert_eq!(sched.idle_deadline(), 120 + config::IDLE_TIMEOUT_MS);
    }

    #[test]
    fn blink_stays_at_base_while_disconnected() {
        let mut sched = Scheduler::new(0, COMBO);
        let mut link = MockLink::new(false);
        let mut board = MockBoard::new();
        board.button = true; // matches the boot edge state, no press noise

        for i in 1..=4u64 {
            board.clock = i * (config::STATUS_INTERVAL_MS + 10);
            sched.tick(&mut link, &mut board);
            assert_eq!(sched.blink_interval(), config::STATUS_INTERVAL_MS);
        }
        // Phase alternates every tick.
        assert_eq!(board.led_writes.as_slice(), &[false, true, false, true]);
    }

    #[test]
    fn blink_alternates_base_and_heartbeat_while_connected() {
        let mut sched = Scheduler::new(0, COMBO);
        let mut link = MockLink::new(true);
        let mut board = MockBoard::new();
        board.button = true;

        let heartbeat = config::STATUS_INTERVAL_MS * config::STATUS_CONNECTED_MULT;

        // Off phase → long dark interval.
        board.clock = 1_001;
        sched.tick(&mut link, &mut board);
        assert_eq!(sched.blink_interval(), heartbeat);

        // On phase → short blip.
        board.clock = 11_050;
        sched.tick(&mut link, &mut board);
        assert_eq!(sched.blink_interval(), config::STATUS_INTERVAL_MS);

        // Off phase again.
        board.clock = 12_100;
        sched.tick(&mut link, &mut board);
        assert_eq!(sched.blink_interval(), heartbeat);

        assert_eq!(board.led_writes.as_slice(), &[false, true, false]);
    }

    #[test]
    fn battery_first_check_is_early_then_nominal() {
        let mut sched = Scheduler::new(0, COMBO);
        let mut link = MockLink::new(true);
        let mut board = MockBoard::new();
        board.button = true;
        board.adc = 1980; // ≈3.83 V → 45 %

        let first = config::BATTERY_INTERVAL_MS / config::BATTERY_FIRST_DIV;
        assert_eq!(sched.next_battery(), first);

        // Not yet due right at the deadline (strict comparison).
        board.clock = first;
        sched.tick(&mut link, &mut board);
        assert_eq!(link.battery, None);

        board.clock = first + 1;
        sched.tick(&mut link, &mut board);
        assert_eq!(link.battery, Some(45));
        assert_eq!(sched.next_battery(), first + 1 + config::BATTERY_INTERVAL_MS);
    }

    #[test]
    fn idle_expiry_enters_deep_sleep_once() {
        let mut sched = Scheduler::new(0, COMBO);
        let mut link = MockLink::new(false);
        let mut board = MockBoard::new();
        board.button = true;

        board.clock = config::IDLE_TIMEOUT_MS + 1;
        let step = sched.tick(&mut link, &mut board);

        assert_eq!(step, Step::Sleeping);
        assert_eq!(board.sleeps, 1);
        // The log flush pause runs before power-off.
        assert_eq!(board.delays.as_slice(), &[config::SLEEP_FLUSH_MS]);
    }

    #[test]
    fn no_action_runs_before_its_deadline() {
        let mut sched = Scheduler::new(0, COMBO);
        let mut link = MockLink::new(true);
        let mut board = MockBoard::new();
        board.button = true;

        board.clock = 40;
        let step = sched.tick(&mut link, &mut board);
        assert_eq!(step, Step::Continue);
        assert!(link.pressed.is_empty());
        assert!(board.led_writes.is_empty());
        assert_eq!(link.battery, None);
        assert_eq!(board.sleeps, 0);
    }
}
