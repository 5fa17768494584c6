//! Atomic-letter lock
//!
//! Held by the compiler while it enqueues one letter and by the playback
//! handler for one period. The handler only ever tries once; the compiler may
//! wait with a bounded backoff.

use portable_atomic::{AtomicBool, Ordering};

/// Binary ownership token
pub struct LetterLock {
    held: AtomicBool,
}

/// Proof of lock ownership, released on drop
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct LetterGuard<'a> {
    lock: &'a LetterLock,
}

impl LetterLock {
    pub const fn new() -> Self {
        Self {
            held: AtomicBool::new(false),
        }
    }

    /// Non-blocking attempt, safe from interrupt context
    pub fn try_acquire(&self) -> Option<LetterGuard<'_>> {
        self.held
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| LetterGuard { lock: self })
    }

    /// Retry up to `attempts` times, calling `backoff` between attempts
    pub fn acquire_within<F: FnMut()>(&self, attempts: u32, mut backoff: F) -> Option<LetterGuard<'_>> {
        for attempt in 0..attempts.max(1) {
            if let Some(guard) = self.try_acquire() {
                return Some(guard);
            }
            if attempt + 1 < attempts {
                backoff();
            }
        }
        None
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::Acquire)
    }
}

impl Default for LetterLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LetterGuard<'_> {
    fn drop(&mut self) {
        self.lock.held.store(false, Ordering::Release);
    }
}
