//! Wake-cause reporting.
//!
//! Deep sleep restarts execution from the top, so the only trace of *why*
//! we are running is the platform's wake-cause register, queried once at
//! boot and logged.

/// Why the device came out of deep sleep (or reset).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeCause {
    /// External signal on the designated wake pin.
    External0,
    /// External signal routed through the secondary wake controller.
    External1,
    /// Wake timer expired.
    Timer,
    /// Touch controller event.
    Touchpad,
    /// Low-power coprocessor request.
    Ulp,
    /// Anything else - typically a cold boot or hardware reset.
    Other,
}

impl WakeCause {
    /// Human-readable diagnostic line for the boot log.
    pub fn describe(self) -> &'static str {
        match self {
            WakeCause::External0 => "Wakeup caused by external signal using RTC_IO",
            WakeCause::External1 => "Wakeup caused by external signal using RTC_CNTL",
            WakeCause::Timer => "Wakeup caused by timer",
            WakeCause::Touchpad => "Wakeup caused by touchpad",
            WakeCause::Ulp => "Wakeup caused by ULP program",
            WakeCause::Other => "Wakeup was not caused by deep sleep",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_matches_diagnostic_strings() {
        assert_eq!(
            WakeCause::External0.describe(),
            "Wakeup caused by external signal using RTC_IO"
        );
        assert_eq!(WakeCause::Timer.describe(), "Wakeup caused by timer");
        assert_eq!(WakeCause::Ulp.describe(), "Wakeup caused by ULP program");
        assert_eq!(
            WakeCause::Other.describe(),
            "Wakeup was not caused by deep sleep"
        );
    }
}
