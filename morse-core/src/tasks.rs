//! Async drivers for executors without a dedicated playback interrupt
//!
//! Both loops run until their future is dropped. Wrap them in
//! executor-specific task functions.

use embassy_time::{Duration, Ticker, Timer};

use crate::context::MorseContext;
use crate::hal::Actuator;
use crate::types::LetterOutcome;

/// Translate queued letters, sleeping `poll` whenever the channel is empty
pub async fn translator_task<A: Actuator, const L: usize, const T: usize>(
    ctx: &MorseContext<A, L, T>,
    poll: Duration,
) {
    info!("Translator task started");

    loop {
        // Lock holders release within one period, spinning is bounded
        match ctx.translate_next(core::hint::spin_loop) {
            Some(LetterOutcome::Emitted { ch, ticks, .. }) => {
                debug!("Translated {} into {} ticks", ch, ticks);
            }
            Some(_) => {}
            None => Timer::after(poll).await,
        }
    }
}

/// Run the playback handler once per base period
pub async fn playback_task<A: Actuator, const L: usize, const T: usize>(
    ctx: &MorseContext<A, L, T>,
) {
    info!("Playback task started");

    let mut ticker = Ticker::every(ctx.timing().period);
    loop {
        ctx.on_period();
        ticker.next().await;
    }
}
