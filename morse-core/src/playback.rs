//! Run-length playback step
//!
//! A dash of three periods is one tick re-inserted at the channel front twice,
//! not three separate ticks, so compile-time and play-time durations cannot
//! drift apart under channel contention.

use crate::types::{ActuationTick, ActuatorState};

/// Advance a tick by one period.
///
/// Returns the actuator levels for this period and the remaining tick, if any,
/// which the caller re-inserts at the channel front. The trailing gap is only
/// consumed once both holds were already zero on entry, one period at a time
/// with both actuators off.
pub fn advance(mut tick: ActuationTick) -> (ActuatorState, Option<ActuationTick>) {
    let silent_phase = !tick.is_holding();

    let tone = tick.tone_hold > 0;
    if tone {
        tick.tone_hold -= 1;
    }

    let indicator = tick.indicator_hold > 0;
    if indicator {
        tick.indicator_hold -= 1;
    }

    if silent_phase {
        tick.trailing_gap = tick.trailing_gap.saturating_sub(1);
    }

    let state = ActuatorState { tone, indicator };
    if tick.is_spent() {
        (state, None)
    } else {
        (state, Some(tick))
    }
}
