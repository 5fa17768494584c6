//! Process-lifetime translator context
//!
//! Owns both channels, the letter lock and the actuator. Built once at
//! startup, typically in a `static`, and shared by reference between the
//! compiler task, the playback interrupt and the transport callbacks.

use core::cell::RefCell;

use critical_section::{CriticalSection, Mutex};
use portable_atomic::{AtomicU32, AtomicU8, Ordering};

use crate::channel::{LetterChannel, PlaybackChannel};
use crate::hal::{Actuator, HalError};
use crate::lock::{LetterGuard, LetterLock};
use crate::playback::advance;
use crate::settings::{Settings, DEFAULT_VOLUME, VOLUME_KEY};
use crate::stats::Stats;
use crate::timeline::{compile, Timeline};
use crate::transport::Message;
use crate::types::{
    AbortReport, ActuatorState, LetterOutcome, MorseError, PeriodOutcome, TimingConfig,
};

/// Letter channel capacity used by hosted builds
pub const DEFAULT_LETTER_CAPACITY: usize = 1024;

/// Playback channel capacity used by hosted builds
pub const DEFAULT_TICK_CAPACITY: usize = 4096;

/// Context with the default channel capacities
pub type DefaultContext<A> = MorseContext<A, DEFAULT_LETTER_CAPACITY, DEFAULT_TICK_CAPACITY>;

/// Letter popped by the compiler, tagged with the abort epoch it was read in
struct PendingLetter {
    ch: u8,
    epoch: u32,
}

/// Shared translator state
pub struct MorseContext<A, const LETTERS: usize, const TICKS: usize> {
    letters: LetterChannel<LETTERS>,
    playback: PlaybackChannel<TICKS>,
    lock: LetterLock,
    epoch: AtomicU32,
    actuator: Mutex<RefCell<A>>,
    timing: TimingConfig,
    stats: Stats,
    volume: AtomicU8,
}

impl<A: Actuator, const LETTERS: usize, const TICKS: usize> MorseContext<A, LETTERS, TICKS> {
    pub const fn new(actuator: A, timing: TimingConfig) -> Self {
        Self {
            letters: LetterChannel::new(),
            playback: PlaybackChannel::new(),
            lock: LetterLock::new(),
            epoch: AtomicU32::new(0),
            actuator: Mutex::new(RefCell::new(actuator)),
            timing,
            stats: Stats::new(),
            volume: AtomicU8::new(DEFAULT_VOLUME),
        }
    }

    // ---- Producer side ----

    /// Queue one character for translation, never blocks
    pub fn submit_character(&self, ch: u8) -> Result<(), MorseError> {
        match self.letters.push_back(ch) {
            Ok(()) => {
                trace!("Letter queued: {}", ch);
                Ok(())
            }
            Err(_) => {
                self.stats.letter_dropped();
                warn!("Letter channel full, dropped {}", ch);
                Err(MorseError::ChannelFull)
            }
        }
    }

    /// Queue every byte of `text`, returning how many were accepted
    pub fn submit_text(&self, text: &[u8]) -> usize {
        text.iter()
            .filter(|&&ch| self.submit_character(ch).is_ok())
            .count()
    }

    /// Drain both channels and silence the actuators.
    ///
    /// Runs in one critical section and never waits for the letter lock. A
    /// compiler holding the lock sees the epoch change on its next push,
    /// discards the rest of its letter and releases the lock.
    pub fn submit_abort(&self) -> AbortReport {
        let report = critical_section::with(|cs| {
            self.epoch.fetch_add(1, Ordering::AcqRel);
            let letters = self.letters.clear_in(cs);
            let ticks = self.playback.clear_in(cs);
            self.drive(cs, ActuatorState::OFF);
            AbortReport { letters, ticks }
        });

        self.stats.abort();
        info!("Abort: {} letters, {} ticks discarded", report.letters, report.ticks);
        report
    }

    /// Route a transport message
    pub fn dispatch<S: Settings>(&self, message: Message, settings: &mut S) -> Result<(), MorseError> {
        match message {
            Message::Letter(ch) => self.submit_character(ch),
            Message::Volume(volume) => self.set_volume(settings, volume).map(|_| ()),
            Message::Abort => {
                self.submit_abort();
                Ok(())
            }
        }
    }

    // ---- Compiler side ----

    /// Translate the next queued letter into the playback channel.
    ///
    /// Returns `None` when the letter channel is empty. The pattern is
    /// expanded before the lock is taken; `backoff` runs between lock
    /// attempts, at most `lock_attempts` times.
    pub fn translate_next<F: FnMut()>(&self, backoff: F) -> Option<LetterOutcome> {
        let letter = self.next_letter()?;
        let ch = letter.ch.to_ascii_lowercase();

        let timeline = match compile(ch, &self.timing) {
            Ok(timeline) => timeline,
            Err(_) => {
                self.stats.unmapped();
                warn!("No Morse mapping for {}, skipped", ch);
                return Some(LetterOutcome::Unmapped(ch));
            }
        };

        let Some(guard) = self.lock.acquire_within(self.timing.lock_attempts, backoff) else {
            self.stats.lock_timeout();
            error!("Letter lock timeout, dropped {}", ch);
            return Some(LetterOutcome::LockTimeout(ch));
        };

        Some(self.emit(&guard, ch, letter.epoch, &timeline))
    }

    /// Translate until the letter channel is empty, returning letters handled
    pub fn drain_letters<F: FnMut()>(&self, mut backoff: F) -> usize {
        let mut handled = 0;
        while self.translate_next(&mut backoff).is_some() {
            handled += 1;
        }
        handled
    }

    fn next_letter(&self) -> Option<PendingLetter> {
        critical_section::with(|cs| {
            let ch = self.letters.borrow(cs).pop_front()?;
            Some(PendingLetter {
                ch,
                epoch: self.epoch.load(Ordering::Acquire),
            })
        })
    }

    fn emit(&self, _guard: &LetterGuard<'_>, ch: u8, epoch: u32, timeline: &Timeline) -> LetterOutcome {
        let mut ticks = 0;
        let mut dropped = 0;

        for tick in timeline.iter() {
            let pushed = critical_section::with(|cs| {
                if self.epoch.load(Ordering::Acquire) != epoch {
                    return None;
                }
                Some(self.playback.borrow(cs).push_back(*tick).is_ok())
            });

            match pushed {
                Some(true) => ticks += 1,
                Some(false) => {
                    dropped += 1;
                    warn!("Playback channel full, tick of {} dropped", ch);
                }
                None => {
                    self.stats.ticks_dropped(dropped);
                    self.stats.aborted_letter();
                    debug!("Letter {} discarded by abort", ch);
                    return LetterOutcome::Aborted(ch);
                }
            }
        }

        if dropped > 0 {
            self.stats.ticks_dropped(dropped);
        }
        trace!("Letter {} emitted {} ticks", ch, ticks);
        LetterOutcome::Emitted { ch, ticks, dropped }
    }

    // ---- Playback side ----

    /// Periodic playback handler.
    ///
    /// Never blocks: if the letter lock is held elsewhere the period is
    /// skipped. Pop, advance, re-insert and drive all happen in one critical
    /// section so an abort cannot land between them.
    pub fn on_period(&self) -> PeriodOutcome {
        let Some(_guard) = self.lock.try_acquire() else {
            self.stats.lock_busy();
            trace!("Letter lock busy, period skipped");
            return PeriodOutcome::LockBusy;
        };

        critical_section::with(|cs| {
            let mut ticks = self.playback.borrow(cs);
            let Some(tick) = ticks.pop_front() else {
                drop(ticks);
                self.drive(cs, ActuatorState::OFF);
                return PeriodOutcome::Idle;
            };

            let (state, remainder) = advance(tick);
            if let Some(rest) = remainder {
                // Slot freed by the pop above
                if ticks.push_front(rest).is_err() {
                    error!("Re-insert failed, tick lost");
                }
            }
            drop(ticks);

            self.drive(cs, state);
            self.stats.played();
            PeriodOutcome::Driven(state)
        })
    }

    fn drive(&self, cs: CriticalSection<'_>, state: ActuatorState) {
        let mut actuator = self.actuator.borrow(cs).borrow_mut();
        let tone: Result<(), HalError> = actuator.set_tone(state.tone).map_err(Into::into);
        let indicator: Result<(), HalError> =
            actuator.set_indicator(state.indicator).map_err(Into::into);

        if let Err(e) = tone.and(indicator) {
            self.stats.actuator_fault();
            error!("Actuator fault: {}", e);
        }
    }

    // ---- Volume ----

    /// Apply a volume to the tone actuator and persist it.
    ///
    /// Returns the duty now applied. The volume is applied even if
    /// persisting it fails.
    pub fn set_volume<S: Settings>(&self, settings: &mut S, volume: u8) -> Result<u16, MorseError> {
        let duty = self.apply_volume(volume)?;
        settings.set_u8(VOLUME_KEY, volume).map_err(|_| {
            error!("Failed to persist volume {}", volume);
            MorseError::Settings
        })?;
        info!("Volume set to {} (duty {})", volume, duty);
        Ok(duty)
    }

    /// Apply the persisted volume, or the default if none is stored.
    ///
    /// Meant for start-up; a settings read failure is returned so
    /// initialisation can stop.
    pub fn restore_volume<S: Settings>(&self, settings: &mut S) -> Result<u8, MorseError> {
        let volume = settings
            .get_u8(VOLUME_KEY)
            .map_err(|_| {
                error!("Volume read failed");
                MorseError::Settings
            })?
            .unwrap_or(DEFAULT_VOLUME);
        self.apply_volume(volume)?;
        Ok(volume)
    }

    fn apply_volume(&self, volume: u8) -> Result<u16, MorseError> {
        let applied: Result<u16, HalError> = critical_section::with(|cs| {
            let mut actuator = self.actuator.borrow(cs).borrow_mut();
            let duty = tone_duty(volume, actuator.max_tone_duty());
            actuator.set_tone_duty(duty).map(|_| duty).map_err(Into::into)
        });

        match applied {
            Ok(duty) => {
                self.volume.store(volume, Ordering::Relaxed);
                Ok(duty)
            }
            Err(e) => {
                self.stats.actuator_fault();
                error!("Tone duty rejected: {}", e);
                Err(MorseError::Actuator(e))
            }
        }
    }

    /// Volume currently applied
    pub fn volume(&self) -> u8 {
        self.volume.load(Ordering::Relaxed)
    }

    // ---- Inspection ----

    /// Run `f` with exclusive access to the actuator
    pub fn with_actuator<R>(&self, f: impl FnOnce(&mut A) -> R) -> R {
        critical_section::with(|cs| f(&mut self.actuator.borrow(cs).borrow_mut()))
    }

    pub fn letters_pending(&self) -> usize {
        self.letters.len()
    }

    pub fn ticks_pending(&self) -> usize {
        self.playback.len()
    }

    /// Both channels empty
    pub fn is_idle(&self) -> bool {
        critical_section::with(|cs| {
            self.letters.borrow(cs).is_empty() && self.playback.borrow(cs).is_empty()
        })
    }

    pub fn timing(&self) -> &TimingConfig {
        &self.timing
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn lock_held(&self) -> bool {
        self.lock.is_held()
    }
}

/// Tone duty for a volume byte; full volume is half of `max_duty`
pub const fn tone_duty(volume: u8, max_duty: u16) -> u16 {
    (volume as u32 * max_duty as u32 / 2 / 255) as u16
}
