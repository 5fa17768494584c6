//! Core data types for the Morse receiver

use crate::hal::{Duration, HalError};

/// Morse pattern symbols
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "std", derive(Hash))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Symbol {
    /// Short tone
    Dot,
    /// Long tone
    Dash,
    /// Inter-word separator, shown on the indicator
    WordGap,
}

impl Symbol {
    /// Parse one character of a pattern string
    pub const fn from_code(code: u8) -> Option<Symbol> {
        match code {
            b'.' => Some(Symbol::Dot),
            b'-' => Some(Symbol::Dash),
            b'/' => Some(Symbol::WordGap),
            _ => None,
        }
    }
}

/// One schedulable unit of actuator hold state.
///
/// Holds and gap are counted in playback periods. The tick is mutated only by
/// the playback handler and moves by value between channels.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActuationTick {
    /// Periods the tone must stay active
    pub tone_hold: u8,
    /// Periods the indicator must stay active
    pub indicator_hold: u8,
    /// Silent periods following once both holds are spent
    pub trailing_gap: u8,
}

impl ActuationTick {
    pub const fn tone(periods: u8, gap: u8) -> Self {
        Self { tone_hold: periods, indicator_hold: 0, trailing_gap: gap }
    }

    pub const fn indicator(periods: u8, gap: u8) -> Self {
        Self { tone_hold: 0, indicator_hold: periods, trailing_gap: gap }
    }

    pub const fn silent(gap: u8) -> Self {
        Self { tone_hold: 0, indicator_hold: 0, trailing_gap: gap }
    }

    /// Returns true while either actuator still has hold periods left
    pub const fn is_holding(&self) -> bool {
        self.tone_hold > 0 || self.indicator_hold > 0
    }

    /// Returns true once holds and gap are all consumed
    pub const fn is_spent(&self) -> bool {
        !self.is_holding() && self.trailing_gap == 0
    }

    /// Number of handler invocations needed to consume this tick
    pub const fn total_periods(&self) -> u32 {
        let hold = if self.tone_hold > self.indicator_hold {
            self.tone_hold
        } else {
            self.indicator_hold
        };
        hold as u32 + self.trailing_gap as u32
    }
}

/// Playback timing parameters, all counts in base periods
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimingConfig {
    /// Base playback period (one Morse unit)
    pub period: Duration,
    /// Tone hold of a dot
    pub dot_periods: u8,
    /// Tone hold of a dash
    pub dash_periods: u8,
    /// Indicator hold of the inter-word separator
    pub word_periods: u8,
    /// Silence after every symbol except the last of a letter
    pub element_gap: u8,
    /// Silence after the last symbol of a letter
    pub letter_gap: u8,
    /// Backoff rounds the compiler waits for the letter lock
    pub lock_attempts: u32,
}

impl TimingConfig {
    /// 20 WPM with the standard 1:3 dot/dash ratio
    pub const fn standard() -> Self {
        Self {
            period: Duration::from_millis(60),
            dot_periods: 1,
            dash_periods: 3,
            word_periods: 4,
            element_gap: 1,
            letter_gap: 3,
            lock_attempts: 10_000,
        }
    }

    /// Create a standard configuration for the given speed
    pub fn with_wpm(wpm: u32) -> Result<Self, &'static str> {
        if wpm == 0 || wpm > 60 {
            return Err("WPM must be between 1 and 60");
        }

        // PARIS standard: 50 units per word
        Ok(Self {
            period: Duration::from_millis(1200 / wpm as u64),
            ..Self::standard()
        })
    }

    /// Words per minute derived from the base period
    pub fn wpm(&self) -> u32 {
        let ms = self.period.as_millis().max(1);
        (1200 / ms as u32).max(1)
    }

    /// Tick emitted for one pattern symbol
    pub const fn tick_for(&self, symbol: Symbol, last: bool) -> ActuationTick {
        let gap = if last { self.letter_gap } else { self.element_gap };
        match symbol {
            Symbol::Dot => ActuationTick::tone(self.dot_periods, gap),
            Symbol::Dash => ActuationTick::tone(self.dash_periods, gap),
            Symbol::WordGap => ActuationTick::indicator(self.word_periods, gap),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Errors recovered by the core
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MorseError {
    /// Letter or playback channel cannot accept the item
    ChannelFull,
    /// Character has no Morse mapping
    Unmapped(u8),
    /// Compiler could not obtain the letter lock in time
    LockTimeout,
    /// Letter invalidated by an abort while being compiled
    Aborted,
    /// Actuator driver rejected a command
    Actuator(HalError),
    /// Settings collaborator failed to read or write
    Settings,
}

impl From<HalError> for MorseError {
    fn from(e: HalError) -> Self {
        MorseError::Actuator(e)
    }
}

#[cfg(feature = "std")]
impl core::fmt::Display for MorseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MorseError::ChannelFull => write!(f, "Channel is full"),
            MorseError::Unmapped(ch) => write!(f, "No Morse mapping for {:?}", *ch as char),
            MorseError::LockTimeout => write!(f, "Letter lock wait timed out"),
            MorseError::Aborted => write!(f, "Letter discarded by abort"),
            MorseError::Actuator(e) => write!(f, "Actuator failed: {}", e),
            MorseError::Settings => write!(f, "Settings access failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MorseError {}

/// Result of compiling one letter into the playback channel
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LetterOutcome {
    /// Ticks were enqueued; `dropped` counts ticks rejected by a full channel
    Emitted { ch: u8, ticks: usize, dropped: usize },
    /// Character has no mapping, nothing enqueued
    Unmapped(u8),
    /// Letter lock not obtained, letter dropped
    LockTimeout(u8),
    /// Abort arrived while the letter was in flight
    Aborted(u8),
}

impl LetterOutcome {
    /// Number of ticks that reached the playback channel
    pub const fn ticks(&self) -> usize {
        match self {
            LetterOutcome::Emitted { ticks, .. } => *ticks,
            _ => 0,
        }
    }
}

/// Actuator levels driven for one period
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActuatorState {
    pub tone: bool,
    pub indicator: bool,
}

impl ActuatorState {
    pub const OFF: ActuatorState = ActuatorState { tone: false, indicator: false };

    pub const fn is_active(&self) -> bool {
        self.tone || self.indicator
    }
}

/// Result of one playback handler invocation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeriodOutcome {
    /// Letter lock held elsewhere; nothing done this period
    LockBusy,
    /// Playback channel empty; actuators driven off
    Idle,
    /// A tick was advanced and the actuators driven accordingly
    Driven(ActuatorState),
}

/// Items discarded by an abort
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AbortReport {
    pub letters: usize,
    pub ticks: usize,
}
