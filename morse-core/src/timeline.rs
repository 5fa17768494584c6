//! Expansion of a character into its actuation ticks

use heapless::Vec;

use crate::table::{self, MAX_PATTERN_LEN};
use crate::types::{ActuationTick, MorseError, Symbol, TimingConfig};

/// Ticks of one letter, in playback order
pub type Timeline = Vec<ActuationTick, MAX_PATTERN_LEN>;

/// Expand a pattern string into ticks.
///
/// The last tick carries the inter-letter gap, every other tick the
/// inter-element gap. Characters outside `.`, `-`, `/` are skipped.
pub fn compile_pattern(pattern: &str, timing: &TimingConfig) -> Timeline {
    let mut timeline = Timeline::new();
    let symbols = pattern.bytes().filter_map(Symbol::from_code);
    let count = symbols.clone().count();

    for (i, symbol) in symbols.enumerate() {
        let tick = timing.tick_for(symbol, i + 1 == count);
        if timeline.push(tick).is_err() {
            warn!("Pattern longer than {} symbols, truncated", MAX_PATTERN_LEN);
            break;
        }
    }

    timeline
}

/// Fold case, look the character up and expand it
pub fn compile(ch: u8, timing: &TimingConfig) -> Result<Timeline, MorseError> {
    let folded = ch.to_ascii_lowercase();
    match table::lookup(folded) {
        Some(pattern) => Ok(compile_pattern(pattern, timing)),
        None => Err(MorseError::Unmapped(folded)),
    }
}
