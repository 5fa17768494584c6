//! Concurrent submission, compilation and timer-driven playback

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use morse_core::hal::mock::RecordingActuator;
use morse_core::test_utils::test_scenarios::{CQ_CALL, PANGRAM};
use morse_core::test_utils::timers::ThreadTimer;
use morse_core::{DefaultContext, MorseContext, PeriodicTimer, TimingConfig};
use tokio::task::spawn_blocking;
use tokio::time::{sleep, timeout};

use crate::played_text;

/// Fast timing so a full sentence plays in well under a second of periods
const FAST: TimingConfig = TimingConfig {
    period: morse_core::Duration::from_millis(1),
    ..TimingConfig::standard()
};

/// Feed `text` one character at a time while a compiler thread drains the
/// letter channel, then wait for playback to finish.
async fn run_pipeline(ctx: &'static DefaultContext<RecordingActuator>, text: &'static str) {
    let producer_done = Arc::new(AtomicBool::new(false));

    let done = producer_done.clone();
    let producer = spawn_blocking(move || {
        for ch in text.bytes() {
            ctx.submit_character(ch).unwrap();
            std::thread::sleep(Duration::from_micros(300));
        }
        done.store(true, Ordering::Release);
    });

    let done = producer_done.clone();
    let compiler = spawn_blocking(move || loop {
        let finished = done.load(Ordering::Acquire);
        if ctx.drain_letters(std::thread::yield_now) == 0 {
            if finished {
                break;
            }
            std::thread::sleep(Duration::from_micros(200));
        }
    });

    producer.await.unwrap();
    compiler.await.unwrap();

    timeout(Duration::from_secs(20), async {
        while !ctx.is_idle() {
            sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("playback did not finish");

    // Let the handler record a few idle periods
    sleep(Duration::from_millis(10)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_pipeline_preserves_order() {
    static CTX: DefaultContext<RecordingActuator> = MorseContext::new(RecordingActuator::new(), FAST);
    fn tick() {
        CTX.on_period();
    }

    let mut timer = ThreadTimer::new();
    timer.start(CTX.timing().period, tick).unwrap();

    run_pipeline(&CTX, PANGRAM).await;
    timer.stop().unwrap();

    assert_eq!(played_text(&CTX), PANGRAM);

    let stats = CTX.stats().snapshot();
    assert_eq!(stats.letters_dropped, 0);
    assert_eq!(stats.ticks_dropped, 0);
    assert_eq!(stats.lock_timeouts, 0);
    assert!(!CTX.lock_held());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_pipeline_with_digits_and_stop() {
    static CTX: DefaultContext<RecordingActuator> = MorseContext::new(RecordingActuator::new(), FAST);
    fn tick() {
        CTX.on_period();
    }

    let mut timer = ThreadTimer::new();
    timer.start(CTX.timing().period, tick).unwrap();

    run_pipeline(&CTX, CQ_CALL).await;
    timer.stop().unwrap();

    assert_eq!(played_text(&CTX), CQ_CALL);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_abort_during_live_playback() {
    static CTX: DefaultContext<RecordingActuator> = MorseContext::new(RecordingActuator::new(), FAST);
    fn tick() {
        CTX.on_period();
    }

    let mut timer = ThreadTimer::new();
    timer.start(CTX.timing().period, tick).unwrap();

    CTX.submit_text(PANGRAM.as_bytes());
    let compiler = spawn_blocking(|| CTX.drain_letters(std::thread::yield_now));
    sleep(Duration::from_millis(30)).await;

    let report = CTX.submit_abort();
    assert!(report.ticks > 0, "abort landed after playback finished");
    assert!(!CTX.with_actuator(|a| a.is_active()));

    // A letter in flight during the abort is discarded, not played
    compiler.await.unwrap();
    sleep(Duration::from_millis(5)).await;
    timer.stop().unwrap();

    assert!(CTX.is_idle());
    assert!(!CTX.lock_held());
    assert!(!CTX.with_actuator(|a| a.is_active()));
    assert!(CTX.stats().snapshot().aborted_letters <= 1);
}

#[test]
fn test_thread_timer_rejects_double_start() {
    fn tick() {}

    let mut timer = ThreadTimer::new();
    timer.start(morse_core::Duration::from_millis(1), tick).unwrap();
    assert!(timer.start(morse_core::Duration::from_millis(1), tick).is_err());
    assert!(timer.stop().is_ok());
}

#[test]
fn test_blocking_submit_from_tokio_test_helper() {
    static CTX: MorseContext<RecordingActuator, 8, 32> =
        MorseContext::new(RecordingActuator::new(), TimingConfig::standard());

    let accepted = tokio_test::block_on(async { CTX.submit_text(b"73") });
    assert_eq!(accepted, 2);
    assert_eq!(CTX.drain_letters(|| {}), 2);
}
