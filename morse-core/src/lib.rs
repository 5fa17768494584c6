#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! # Morse Core
//!
//! Text to Morse translation with fixed-cadence playback for embedded systems.
//! A compiler task expands queued characters into actuation ticks; a periodic
//! interrupt plays them back one period at a time.

#[macro_use]
mod fmt;

pub mod types;
pub mod table;
pub mod timeline;
pub mod channel;
pub mod lock;
pub mod playback;
pub mod stats;
pub mod settings;
pub mod transport;
pub mod context;
pub mod hal;

#[cfg(feature = "embassy-time")]
pub mod tasks;

#[cfg(feature = "test-utils")]
pub mod test_utils;


pub use types::*;
pub use table::{lookup, lookup_folded, Translation};
pub use timeline::{compile, compile_pattern, Timeline};
pub use channel::{Channel, LetterChannel, PlaybackChannel};
pub use lock::{LetterGuard, LetterLock};
pub use playback::advance;
pub use stats::{Stats, StatsSnapshot};
pub use settings::{MemorySettings, Settings, SettingsError, DEFAULT_VOLUME, VOLUME_KEY};
pub use transport::{decode_write, Decoded, Endpoint, Message, SerialFramer};
pub use context::{tone_duty, DefaultContext, MorseContext, DEFAULT_LETTER_CAPACITY, DEFAULT_TICK_CAPACITY};
pub use hal::{Actuator, Duration, EmbeddedHalActuator, HalError, NoOpTimer, PeriodicTimer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Standard 20 WPM timing
pub fn default_timing() -> TimingConfig {
    TimingConfig::standard()
}
