//! Timeline compiler tests

use crate::{play_out, played_text};
use morse_core::hal::mock::RecordingActuator;
use morse_core::{compile, ActuationTick, LetterOutcome, MorseContext, TimingConfig};
use rstest::rstest;

type Ctx = MorseContext<RecordingActuator, 64, 256>;

fn context() -> Ctx {
    MorseContext::new(RecordingActuator::new(), TimingConfig::standard())
}

#[test]
fn test_s_compiles_to_three_dots() {
    let timing = TimingConfig::standard();
    let ticks = compile(b's', &timing).unwrap();

    assert_eq!(ticks.len(), 3);
    assert!(ticks.iter().all(|t| t.tone_hold == timing.dot_periods && t.indicator_hold == 0));
    assert_eq!(ticks[0].trailing_gap, timing.element_gap);
    assert_eq!(ticks[1].trailing_gap, timing.element_gap);
    assert_eq!(ticks[2].trailing_gap, timing.letter_gap);
}

#[test]
fn test_o_compiles_to_three_dashes() {
    let timing = TimingConfig::standard();
    let ticks = compile(b'O', &timing).unwrap();

    assert_eq!(ticks.len(), 3);
    assert!(ticks.iter().all(|t| t.tone_hold == timing.dash_periods));
    assert_eq!(ticks.last().map(|t| t.trailing_gap), Some(timing.letter_gap));
}

#[rstest]
#[case(b'a', 2)]
#[case(b'h', 4)]
#[case(b'0', 5)]
#[case(b' ', 1)]
#[case(b'.', 2)]
fn test_tick_count_matches_pattern(#[case] ch: u8, #[case] expected: usize) {
    let ctx = context();
    ctx.submit_character(ch).unwrap();

    let outcome = ctx.translate_next(|| {}).unwrap();
    assert_eq!(outcome.ticks(), expected);
    assert_eq!(ctx.ticks_pending(), expected);
}

#[test]
fn test_unmapped_character_is_skipped() {
    let ctx = context();
    ctx.submit_text(b"e#t");

    assert_eq!(ctx.translate_next(|| {}).map(|o| o.ticks()), Some(1));
    assert_eq!(ctx.translate_next(|| {}), Some(LetterOutcome::Unmapped(b'#')));
    assert_eq!(ctx.translate_next(|| {}).map(|o| o.ticks()), Some(1));
    assert_eq!(ctx.ticks_pending(), 2);
    assert_eq!(ctx.stats().snapshot().unmapped, 1);

    play_out(&ctx, 100);
    assert_eq!(played_text(&ctx), "et");
}

#[test]
fn test_uppercase_plays_like_lowercase() {
    let upper = context();
    let lower = context();
    upper.submit_text(b"SOS");
    lower.submit_text(b"sos");

    play_out(&upper, 200);
    play_out(&lower, 200);

    let upper_log = upper.with_actuator(|a| a.tone_log.clone());
    let lower_log = lower.with_actuator(|a| a.tone_log.clone());
    assert_eq!(upper_log, lower_log);
    assert_eq!(played_text(&upper), "sos");
}

#[test]
fn test_letters_do_not_interleave() {
    let ctx = context();
    ctx.submit_text(b"ab");
    ctx.drain_letters(|| {});

    let timing = *ctx.timing();
    let mut expected: Vec<ActuationTick> = compile(b'a', &timing).unwrap().to_vec();
    expected.extend_from_slice(&compile(b'b', &timing).unwrap());

    // Total periods of all ticks plus the final idle one
    let periods: u32 = expected.iter().map(|t| t.total_periods()).sum();
    assert_eq!(play_out(&ctx, 1000), periods as usize + 1);
    assert_eq!(played_text(&ctx), "ab");
}

#[test]
fn test_custom_timing_ratio() {
    let timing = TimingConfig {
        dot_periods: 2,
        dash_periods: 6,
        ..TimingConfig::standard()
    };
    let ticks = compile(b'n', &timing).unwrap();

    assert_eq!(ticks[0], ActuationTick::tone(6, timing.element_gap));
    assert_eq!(ticks[1], ActuationTick::tone(2, timing.letter_gap));
}
