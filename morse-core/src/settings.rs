//! Persistent settings collaborator

use heapless::{String, Vec};

/// Key of the persisted volume byte
pub const VOLUME_KEY: &str = "volume";

/// Volume applied when nothing has been persisted yet
pub const DEFAULT_VOLUME: u8 = 128;

/// Key/value store holding single-byte settings
pub trait Settings {
    type Error;

    /// Read a value, `Ok(None)` if the key was never written
    fn get_u8(&mut self, key: &str) -> Result<Option<u8>, Self::Error>;

    fn set_u8(&mut self, key: &str, value: u8) -> Result<(), Self::Error>;
}

/// Error types for the in-memory store
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingsError {
    /// Key longer than the store's key capacity
    KeyTooLong,
    /// No slot left for a new key
    StoreFull,
}

#[cfg(feature = "std")]
impl core::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SettingsError::KeyTooLong => write!(f, "Settings key too long"),
            SettingsError::StoreFull => write!(f, "Settings store full"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SettingsError {}

const KEY_LEN: usize = 16;

/// RAM-backed store, contents lost on reset
#[derive(Debug, Default)]
pub struct MemorySettings<const N: usize> {
    entries: Vec<(String<KEY_LEN>, u8), N>,
}

impl<const N: usize> MemorySettings<N> {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<const N: usize> Settings for MemorySettings<N> {
    type Error = SettingsError;

    fn get_u8(&mut self, key: &str) -> Result<Option<u8>, Self::Error> {
        Ok(self
            .entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| *v))
    }

    fn set_u8(&mut self, key: &str, value: u8) -> Result<(), Self::Error> {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| k.as_str() == key) {
            entry.1 = value;
            return Ok(());
        }

        let mut owned = String::new();
        owned.push_str(key).map_err(|_| SettingsError::KeyTooLong)?;
        self.entries
            .push((owned, value))
            .map_err(|_| SettingsError::StoreFull)
    }
}
