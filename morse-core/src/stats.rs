//! Counters for recovered errors and playback activity
//!
//! Logging can be compiled out, so every recovered error is also counted here.

use portable_atomic::{AtomicU32, Ordering};

/// Atomic counters, safe to bump from task and interrupt context
pub struct Stats {
    letters_dropped: AtomicU32,
    ticks_dropped: AtomicU32,
    unmapped: AtomicU32,
    lock_timeouts: AtomicU32,
    aborted_letters: AtomicU32,
    lock_busy_periods: AtomicU32,
    actuator_faults: AtomicU32,
    aborts: AtomicU32,
    played_periods: AtomicU32,
}

/// Plain copy of [`Stats`]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatsSnapshot {
    pub letters_dropped: u32,
    pub ticks_dropped: u32,
    pub unmapped: u32,
    pub lock_timeouts: u32,
    pub aborted_letters: u32,
    pub lock_busy_periods: u32,
    pub actuator_faults: u32,
    pub aborts: u32,
    pub played_periods: u32,
}

impl Stats {
    pub const fn new() -> Self {
        Self {
            letters_dropped: AtomicU32::new(0),
            ticks_dropped: AtomicU32::new(0),
            unmapped: AtomicU32::new(0),
            lock_timeouts: AtomicU32::new(0),
            aborted_letters: AtomicU32::new(0),
            lock_busy_periods: AtomicU32::new(0),
            actuator_faults: AtomicU32::new(0),
            aborts: AtomicU32::new(0),
            played_periods: AtomicU32::new(0),
        }
    }

    pub(crate) fn letter_dropped(&self) {
        self.letters_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn ticks_dropped(&self, count: usize) {
        self.ticks_dropped.fetch_add(count as u32, Ordering::Relaxed);
    }

    pub(crate) fn unmapped(&self) {
        self.unmapped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn lock_timeout(&self) {
        self.lock_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn aborted_letter(&self) {
        self.aborted_letters.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn lock_busy(&self) {
        self.lock_busy_periods.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn actuator_fault(&self) {
        self.actuator_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn abort(&self) {
        self.aborts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn played(&self) {
        self.played_periods.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            letters_dropped: self.letters_dropped.load(Ordering::Relaxed),
            ticks_dropped: self.ticks_dropped.load(Ordering::Relaxed),
            unmapped: self.unmapped.load(Ordering::Relaxed),
            lock_timeouts: self.lock_timeouts.load(Ordering::Relaxed),
            aborted_letters: self.aborted_letters.load(Ordering::Relaxed),
            lock_busy_periods: self.lock_busy_periods.load(Ordering::Relaxed),
            actuator_faults: self.actuator_faults.load(Ordering::Relaxed),
            aborts: self.aborts.load(Ordering::Relaxed),
            played_periods: self.played_periods.load(Ordering::Relaxed),
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}
