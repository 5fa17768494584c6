//! Bounded interrupt-safe FIFO channels
//!
//! Both channels are shared between the compiler task and the playback
//! interrupt. Every access goes through a critical section; composite
//! operations (pop then re-insert at the front) borrow the deque once inside a
//! caller-provided critical section.

use core::cell::{RefCell, RefMut};

use critical_section::{CriticalSection, Mutex};
use heapless::Deque;

use crate::types::ActuationTick;

/// Bounded deque guarded by a critical-section mutex
pub struct Channel<T, const N: usize> {
    inner: Mutex<RefCell<Deque<T, N>>>,
}

/// Raw characters from the transport to the compiler
pub type LetterChannel<const N: usize> = Channel<u8, N>;

/// Actuation ticks from the compiler to the playback handler
pub type PlaybackChannel<const N: usize> = Channel<ActuationTick, N>;

impl<T, const N: usize> Channel<T, N> {
    /// Create an empty channel
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Borrow the deque for the duration of an outer critical section
    pub fn borrow<'cs>(&'cs self, cs: CriticalSection<'cs>) -> RefMut<'cs, Deque<T, N>> {
        self.inner.borrow(cs).borrow_mut()
    }

    /// Append at the back; returns the item when full
    pub fn push_back(&self, item: T) -> Result<(), T> {
        critical_section::with(|cs| self.borrow(cs).push_back(item))
    }

    /// Insert at the front so it is the next item popped
    pub fn push_front(&self, item: T) -> Result<(), T> {
        critical_section::with(|cs| self.borrow(cs).push_front(item))
    }

    pub fn pop_front(&self) -> Option<T> {
        critical_section::with(|cs| self.borrow(cs).pop_front())
    }

    /// Discard every item, returning how many were dropped
    pub fn clear(&self) -> usize {
        critical_section::with(|cs| self.clear_in(cs))
    }

    /// [`clear`](Self::clear) inside an outer critical section
    pub fn clear_in(&self, cs: CriticalSection<'_>) -> usize {
        let mut deque = self.borrow(cs);
        let count = deque.len();
        deque.clear();
        count
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.borrow(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        critical_section::with(|cs| self.borrow(cs).is_full())
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T, const N: usize> Default for Channel<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
