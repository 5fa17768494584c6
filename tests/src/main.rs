// Host demo: plays text through the translator with a wall-clock timer and
// prints what the recording actuator produced.

use std::time::Duration;

use morse_core::hal::mock::RecordingActuator;
use morse_core::test_utils::output_capture;
use morse_core::test_utils::timers::ThreadTimer;
use morse_core::{
    decode_write, DefaultContext, Endpoint, MemorySettings, MorseContext, PeriodicTimer,
    TimingConfig,
};

const DEMO_TIMING: TimingConfig = TimingConfig {
    period: morse_core::Duration::from_millis(5),
    ..TimingConfig::standard()
};

static CONTEXT: DefaultContext<RecordingActuator> =
    MorseContext::new(RecordingActuator::new(), DEMO_TIMING);

fn on_timer() {
    CONTEXT.on_period();
}

fn main() {
    let text = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "cq cq de n0call k".to_string());

    println!("📡 Morse translator demo v{}", morse_core::VERSION);
    println!("  Text: {:?}", text);

    let mut settings = MemorySettings::<4>::new();
    if let Err(e) = CONTEXT.restore_volume(&mut settings) {
        eprintln!("❌ Volume restore failed: {}", e);
        return;
    }

    let mut timer = ThreadTimer::new();
    if let Err(e) = timer.start(DEMO_TIMING.period, on_timer) {
        eprintln!("❌ Timer start failed: {}", e);
        return;
    }

    // Deliver the text the way a batch transport write would
    for message in decode_write(Endpoint::Letter, text.as_bytes()) {
        if let Err(e) = CONTEXT.dispatch(message, &mut settings) {
            eprintln!("⚠️ {:?} rejected: {}", message, e);
        }
    }

    let translated = CONTEXT.drain_letters(std::thread::yield_now);
    println!("  Translated {} letters, {} ticks queued", translated, CONTEXT.ticks_pending());

    while !CONTEXT.is_idle() {
        std::thread::sleep(Duration::from_millis(20));
    }
    std::thread::sleep(Duration::from_millis(DEMO_TIMING.period.as_millis() * 4));

    if let Err(e) = timer.stop() {
        eprintln!("⚠️ Timer stop failed: {}", e);
    }

    let (patterns, decoded) = CONTEXT.with_actuator(|a| {
        let patterns = output_capture::patterns(&a.tone_log, &a.indicator_log, &DEMO_TIMING);
        let decoded = output_capture::text(&patterns);
        (patterns, decoded)
    });

    println!("  Played:  {}", patterns.join(" "));
    println!("  Decoded: {:?}", decoded);
    println!("  Stats:   {:?}", CONTEXT.stats().snapshot());

    if decoded == text.to_ascii_lowercase() {
        println!("✅ Playback matches input");
    } else {
        println!("⚠️ Playback differs from input (unmapped characters are skipped)");
    }
}
