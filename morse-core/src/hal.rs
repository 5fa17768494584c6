//! Hardware Abstraction Layer for the actuator driver and playback timer

// Re-export time types based on feature
#[cfg(feature = "embassy-time")]
pub use embassy_time::Duration;

#[cfg(not(feature = "embassy-time"))]
pub use self::mock_time::Duration;

#[cfg(not(feature = "embassy-time"))]
mod mock_time {
    /// Mock duration type for compilation without embassy-time
    #[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Duration(u64);

    impl Duration {
        pub const fn from_millis(ms: u64) -> Self {
            Self(ms * 1_000)
        }

        pub const fn from_micros(us: u64) -> Self {
            Self(us)
        }

        pub const fn as_millis(&self) -> u64 {
            self.0 / 1_000
        }

        pub const fn as_micros(&self) -> u64 {
            self.0
        }
    }
}

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// PWM channel rejected a duty update
    PwmError,
    /// GPIO operation failed
    GpioError,
    /// Timer could not be started or stopped
    TimerError,
    /// Invalid configuration
    InvalidConfig,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::PwmError => write!(f, "PWM operation failed"),
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::TimerError => write!(f, "Timer operation failed"),
            HalError::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Tone and indicator driver.
///
/// Called from the playback handler, possibly in interrupt context, so
/// implementations must not block.
pub trait Actuator {
    type Error: Into<HalError>;

    /// Start or stop the tone at the current duty
    fn set_tone(&mut self, active: bool) -> Result<(), Self::Error>;

    /// Set the indicator level
    fn set_indicator(&mut self, active: bool) -> Result<(), Self::Error>;

    /// Set the duty used while the tone is active
    fn set_tone_duty(&mut self, duty: u16) -> Result<(), Self::Error>;

    /// Duty value corresponding to 100%
    fn max_tone_duty(&self) -> u16;
}

/// Timer invoking a zero-argument callback at a fixed period
pub trait PeriodicTimer {
    type Error: From<HalError>;

    /// Arm the timer; `callback` runs once per period until stopped
    fn start(&mut self, period: Duration, callback: fn()) -> Result<(), Self::Error>;

    /// Disarm the timer
    fn stop(&mut self) -> Result<(), Self::Error>;
}

/// Generic implementation for embedded-hal PWM tone and GPIO indicator
pub struct EmbeddedHalActuator<P, L> {
    pwm: P,
    led: L,
    duty: u16,
    tone_active: bool,
    led_inverted: bool,
}

impl<P, L> EmbeddedHalActuator<P, L>
where
    P: SetDutyCycle,
    L: OutputPin,
{
    /// Tone starts at 50% duty, silent
    pub fn new(pwm: P, led: L, led_inverted: bool) -> Self {
        let duty = pwm.max_duty_cycle() / 2;
        Self {
            pwm,
            led,
            duty,
            tone_active: false,
            led_inverted,
        }
    }

    /// Current tone duty
    pub fn duty(&self) -> u16 {
        self.duty
    }

    /// Release the underlying peripherals
    pub fn release(self) -> (P, L) {
        (self.pwm, self.led)
    }
}

impl<P, L> Actuator for EmbeddedHalActuator<P, L>
where
    P: SetDutyCycle,
    L: OutputPin,
{
    type Error = HalError;

    fn set_tone(&mut self, active: bool) -> Result<(), Self::Error> {
        if active {
            self.pwm.set_duty_cycle(self.duty).map_err(|_| HalError::PwmError)?;
        } else {
            self.pwm.set_duty_cycle_fully_off().map_err(|_| HalError::PwmError)?;
        }
        self.tone_active = active;
        Ok(())
    }

    fn set_indicator(&mut self, active: bool) -> Result<(), Self::Error> {
        let level = if self.led_inverted { !active } else { active };
        if level {
            self.led.set_high().map_err(|_| HalError::GpioError)
        } else {
            self.led.set_low().map_err(|_| HalError::GpioError)
        }
    }

    fn set_tone_duty(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty = duty.min(self.pwm.max_duty_cycle());
        if self.tone_active {
            self.pwm.set_duty_cycle(self.duty).map_err(|_| HalError::PwmError)?;
        }
        Ok(())
    }

    fn max_tone_duty(&self) -> u16 {
        self.pwm.max_duty_cycle()
    }
}

/// Timer that never fires, for builds driving `on_period` by other means
pub struct NoOpTimer;

impl PeriodicTimer for NoOpTimer {
    type Error = HalError;

    fn start(&mut self, _period: Duration, _callback: fn()) -> Result<(), Self::Error> {
        Ok(())
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing

    use super::*;
    use std::vec::Vec;

    /// Actuator recording every level it was driven to.
    ///
    /// Each playback period drives the tone and the indicator exactly once,
    /// so the logs hold one entry per period.
    #[derive(Debug, Default)]
    pub struct RecordingActuator {
        pub tone: bool,
        pub indicator: bool,
        pub duty: u16,
        pub tone_log: Vec<bool>,
        pub indicator_log: Vec<bool>,
        fail_tone: bool,
    }

    impl RecordingActuator {
        pub const MAX_DUTY: u16 = 1000;

        pub const fn new() -> Self {
            Self {
                tone: false,
                indicator: false,
                duty: Self::MAX_DUTY / 2,
                tone_log: Vec::new(),
                indicator_log: Vec::new(),
                fail_tone: false,
            }
        }

        /// Make every tone command fail
        pub const fn failing() -> Self {
            Self {
                tone: false,
                indicator: false,
                duty: Self::MAX_DUTY / 2,
                tone_log: Vec::new(),
                indicator_log: Vec::new(),
                fail_tone: true,
            }
        }

        pub fn is_active(&self) -> bool {
            self.tone || self.indicator
        }

        /// Periods in which the tone was driven active
        pub fn tone_active_periods(&self) -> usize {
            self.tone_log.iter().filter(|active| **active).count()
        }

        /// Periods in which the indicator was driven active
        pub fn indicator_active_periods(&self) -> usize {
            self.indicator_log.iter().filter(|active| **active).count()
        }

        pub fn clear_logs(&mut self) {
            self.tone_log.clear();
            self.indicator_log.clear();
        }
    }

    impl Actuator for RecordingActuator {
        type Error = HalError;

        fn set_tone(&mut self, active: bool) -> Result<(), Self::Error> {
            if self.fail_tone {
                return Err(HalError::PwmError);
            }
            self.tone = active;
            self.tone_log.push(active);
            Ok(())
        }

        fn set_indicator(&mut self, active: bool) -> Result<(), Self::Error> {
            self.indicator = active;
            self.indicator_log.push(active);
            Ok(())
        }

        fn set_tone_duty(&mut self, duty: u16) -> Result<(), Self::Error> {
            if self.fail_tone {
                return Err(HalError::PwmError);
            }
            self.duty = duty.min(Self::MAX_DUTY);
            Ok(())
        }

        fn max_tone_duty(&self) -> u16 {
            Self::MAX_DUTY
        }
    }
}
