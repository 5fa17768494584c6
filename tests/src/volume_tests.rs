//! Volume control and embedded-hal actuator tests

use std::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use embedded_hal_mock::eh1::pin::{Mock as PinMock, State, Transaction as PinTransaction};
use morse_core::hal::mock::RecordingActuator;
use morse_core::{
    tone_duty, EmbeddedHalActuator, MemorySettings, Message, MorseContext, MorseError, Settings,
    TimingConfig, DEFAULT_VOLUME, VOLUME_KEY,
};

/// PWM channel remembering its last duty
struct TonePwm {
    duty: u16,
}

impl ErrorType for TonePwm {
    type Error = Infallible;
}

impl SetDutyCycle for TonePwm {
    fn max_duty_cycle(&self) -> u16 {
        1024
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty = duty;
        Ok(())
    }
}

/// Settings store that fails every access
struct ReadOnlySettings;

impl Settings for ReadOnlySettings {
    type Error = ();

    fn get_u8(&mut self, _key: &str) -> Result<Option<u8>, Self::Error> {
        Err(())
    }

    fn set_u8(&mut self, _key: &str, _value: u8) -> Result<(), Self::Error> {
        Err(())
    }
}

type HalCtx = MorseContext<EmbeddedHalActuator<TonePwm, PinMock>, 8, 32>;

#[test]
fn test_volume_applied_to_pwm_while_sounding() {
    let led = PinMock::new(&[PinTransaction::set(State::Low)]);
    let mut led_handle = led.clone();
    let ctx: HalCtx = MorseContext::new(
        EmbeddedHalActuator::new(TonePwm { duty: 0 }, led, false),
        TimingConfig::standard(),
    );
    let mut settings = MemorySettings::<4>::new();

    ctx.submit_character(b't').unwrap();
    ctx.drain_letters(|| {});
    ctx.on_period();

    let duty = ctx.set_volume(&mut settings, 255).unwrap();
    assert_eq!(duty, 512);
    assert_eq!(ctx.with_actuator(|a| a.duty()), 512);
    assert_eq!(settings.get_u8(VOLUME_KEY), Ok(Some(255)));

    led_handle.done();
}

#[test]
fn test_indicator_levels_through_gpio() {
    let mut expected = vec![PinTransaction::set(State::High); 4];
    expected.extend(vec![PinTransaction::set(State::Low); 4]);

    let led = PinMock::new(&expected);
    let mut led_handle = led.clone();
    let ctx: HalCtx = MorseContext::new(
        EmbeddedHalActuator::new(TonePwm { duty: 0 }, led, false),
        TimingConfig::standard(),
    );

    ctx.submit_character(b' ').unwrap();
    ctx.drain_letters(|| {});
    for _ in 0..7 {
        ctx.on_period();
    }
    // Idle period drives the indicator low once more
    ctx.on_period();

    led_handle.done();
}

#[test]
fn test_restore_volume_from_store() {
    let mut settings = MemorySettings::<4>::new();
    settings.set_u8(VOLUME_KEY, 40).unwrap();

    let ctx: MorseContext<RecordingActuator, 4, 16> =
        MorseContext::new(RecordingActuator::new(), TimingConfig::standard());
    assert_eq!(ctx.restore_volume(&mut settings), Ok(40));
    assert_eq!(
        ctx.with_actuator(|a| a.duty),
        tone_duty(40, RecordingActuator::MAX_DUTY)
    );
}

#[test]
fn test_restore_volume_reports_read_error() {
    let ctx: MorseContext<RecordingActuator, 4, 16> =
        MorseContext::new(RecordingActuator::new(), TimingConfig::standard());

    assert_eq!(ctx.restore_volume(&mut ReadOnlySettings), Err(MorseError::Settings));
    assert_eq!(ctx.volume(), DEFAULT_VOLUME);
    assert_eq!(ctx.with_actuator(|a| a.duty), RecordingActuator::MAX_DUTY / 2);
}

#[test]
fn test_persist_failure_still_applies_volume() {
    let ctx: MorseContext<RecordingActuator, 4, 16> =
        MorseContext::new(RecordingActuator::new(), TimingConfig::standard());

    assert_eq!(ctx.set_volume(&mut ReadOnlySettings, 200), Err(MorseError::Settings));
    assert_eq!(ctx.volume(), 200);
}

#[test]
fn test_volume_independent_of_channels() {
    let ctx: MorseContext<RecordingActuator, 4, 16> =
        MorseContext::new(RecordingActuator::new(), TimingConfig::standard());
    let mut settings = MemorySettings::<4>::new();

    ctx.submit_text(b"ee");
    ctx.translate_next(|| {});
    ctx.dispatch(Message::Volume(17), &mut settings).unwrap();

    assert_eq!(ctx.letters_pending(), 1);
    assert_eq!(ctx.ticks_pending(), 1);
    assert_eq!(ctx.volume(), 17);
}

#[test]
fn test_failing_actuator_rejects_volume() {
    let ctx: MorseContext<RecordingActuator, 4, 16> =
        MorseContext::new(RecordingActuator::failing(), TimingConfig::standard());
    let mut settings = MemorySettings::<4>::new();

    assert!(matches!(
        ctx.set_volume(&mut settings, 90),
        Err(MorseError::Actuator(_))
    ));
    // Nothing persisted when the driver refuses the duty
    assert_eq!(settings.get_u8(VOLUME_KEY), Ok(None));
    assert_eq!(ctx.volume(), DEFAULT_VOLUME);
}
