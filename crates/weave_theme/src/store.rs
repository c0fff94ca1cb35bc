//! Preference store
//!
//! Validated get/set over a [`StorageBackend`]. Reads never fail: a missing or
//! out-of-range stored value reads as the key's default. Writes reject values
//! outside the key's valid set before touching storage.

use crate::preference::{Density, PreferenceKey, Preferences, Theme};
use crate::storage::{MemoryStorage, StorageBackend};
use weave_core::{Result, WeaveError};

pub struct PreferenceStore<S = MemoryStorage> {
    backend: S,
}

impl PreferenceStore<MemoryStorage> {
    /// Store backed by volatile memory
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }
}

impl<S: StorageBackend> PreferenceStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Current value, or the documented default
    pub fn get(&self, key: PreferenceKey) -> String {
        match self.backend.get(key.storage_key()) {
            Some(value) if key.is_valid(&value) => value,
            Some(value) => {
                tracing::debug!("stored {} {:?} is not valid, using default", key, value);
                key.default_value().to_string()
            }
            None => key.default_value().to_string(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.get(PreferenceKey::Theme).parse().unwrap_or_default()
    }

    pub fn density(&self) -> Density {
        self.get(PreferenceKey::Density).parse().unwrap_or_default()
    }

    pub fn preferences(&self) -> Preferences {
        Preferences::new(self.theme(), self.density())
    }

    /// Reject values outside the key's valid set
    pub fn validate(&self, key: PreferenceKey, value: &str) -> Result<()> {
        if key.is_valid(value) {
            Ok(())
        } else {
            Err(WeaveError::invalid_value(key.storage_key(), value))
        }
    }

    /// Validate and persist
    pub fn set(&mut self, key: PreferenceKey, value: &str) -> Result<()> {
        self.validate(key, value)?;
        self.backend.set(key.storage_key(), value).map_err(|err| {
            tracing::warn!("could not persist {} {:?}: {}", key, value, err);
            err
        })
    }

    /// Persist both values of an already validated pair in one write
    pub fn set_preferences(&mut self, prefs: Preferences) -> Result<()> {
        self.backend.set_many(&[
            (PreferenceKey::Theme.storage_key(), prefs.theme.id()),
            (PreferenceKey::Density.storage_key(), prefs.density.id()),
        ])
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut S {
        &mut self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for PreferenceStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("backend", &self.backend)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_reads_default() {
        let store = PreferenceStore::in_memory();
        assert_eq!(store.get(PreferenceKey::Theme), "light-gray");
        assert_eq!(store.get(PreferenceKey::Density), "high");
    }

    #[test]
    fn test_corrupt_value_reads_default() {
        let store = PreferenceStore::new(MemoryStorage::with_values([(
            "weave-ui-theme",
            "neon-pink",
        )]));
        assert_eq!(store.theme(), Theme::LightGray);
    }

    #[test]
    fn test_set_validates() {
        let mut store = PreferenceStore::in_memory();
        store.set(PreferenceKey::Theme, "dark-gray").unwrap();

        let err = store.set(PreferenceKey::Theme, "neon-pink").unwrap_err();
        assert!(matches!(err, WeaveError::InvalidValue { .. }));
        assert_eq!(store.theme(), Theme::DarkGray);

        // A valid theme is not a valid density.
        assert!(store.set(PreferenceKey::Density, "dark-gray").is_err());
        assert_eq!(store.density(), Density::High);
    }

    #[test]
    fn test_set_preferences_writes_both() {
        let mut store = PreferenceStore::in_memory();
        store
            .set_preferences(Preferences::new(Theme::DarkBlue, Density::Medium))
            .unwrap();
        assert_eq!(
            store.backend().get("weave-ui-theme").as_deref(),
            Some("dark-blue")
        );
        assert_eq!(
            store.backend().get("weave-ui-density").as_deref(),
            Some("medium")
        );
    }
}
