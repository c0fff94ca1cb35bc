//! Preference synchronizer
//!
//! Every preference change runs the same four steps inside one call:
//! validate, persist, render every mirror, publish. Nothing is rendered or
//! published if validation or the storage write fails, so storage and mirrors
//! never disagree once the call returns.
//!
//! Both preferences are always rendered together. A change that names only one
//! of them takes the other from the session pair, which starts out as whatever
//! startup synchronization settled on. That may be markup the store never saw.

use crate::inspect::DetectedPreferences;
use crate::mirror::Mirrors;
use crate::preference::{Density, PreferenceKey, Preferences, Theme};
use crate::storage::{MemoryStorage, StorageBackend};
use crate::store::PreferenceStore;
use std::sync::Arc;
use weave_core::{BroadcastBus, ChangeEvent, EventKind, EventPayload, Renderer, Result, Source};

/// A requested change; `None` keeps the current value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PreferenceUpdate<'a> {
    pub theme: Option<&'a str>,
    pub density: Option<&'a str>,
}

impl<'a> PreferenceUpdate<'a> {
    pub fn theme(theme: &'a str) -> Self {
        Self {
            theme: Some(theme),
            density: None,
        }
    }

    pub fn density(density: &'a str) -> Self {
        Self {
            theme: None,
            density: Some(density),
        }
    }

    pub fn both(theme: &'a str, density: &'a str) -> Self {
        Self {
            theme: Some(theme),
            density: Some(density),
        }
    }

    pub fn for_key(key: PreferenceKey, value: &'a str) -> Self {
        match key {
            PreferenceKey::Theme => Self::theme(value),
            PreferenceKey::Density => Self::density(value),
        }
    }

    /// Event announcing this update
    fn event_kind(&self, source: Source) -> EventKind {
        if source == Source::HostApp {
            return EventKind::HostThemeChanged;
        }
        match (self.theme.is_some(), self.density.is_some()) {
            (true, false) => EventKind::ThemeChanged,
            (false, true) => EventKind::DensityChanged,
            _ => EventKind::UiChanged,
        }
    }
}

pub struct PreferenceSynchronizer<S = MemoryStorage> {
    store: PreferenceStore<S>,
    mirrors: Mirrors,
    bus: Arc<BroadcastBus>,
    /// Pair shown by the mirrors
    current: Preferences,
}

impl<S: StorageBackend> PreferenceSynchronizer<S> {
    pub fn new(store: PreferenceStore<S>, mirrors: Mirrors, bus: Arc<BroadcastBus>) -> Self {
        let current = store.preferences();
        Self {
            store,
            mirrors,
            bus,
            current,
        }
    }

    pub fn store(&self) -> &PreferenceStore<S> {
        &self.store
    }

    pub fn mirrors(&self) -> &Mirrors {
        &self.mirrors
    }

    pub fn bus(&self) -> &Arc<BroadcastBus> {
        &self.bus
    }

    /// Pair currently shown by the mirrors
    pub fn current(&self) -> Preferences {
        self.current
    }

    /// Apply a single preference
    pub fn apply_preference(
        &mut self,
        renderer: &mut dyn Renderer,
        key: PreferenceKey,
        value: &str,
        source: Source,
    ) -> Result<Preferences> {
        self.apply(renderer, PreferenceUpdate::for_key(key, value), source)
    }

    /// Validate, persist, render, publish.
    pub fn apply(
        &mut self,
        renderer: &mut dyn Renderer,
        update: PreferenceUpdate<'_>,
        source: Source,
    ) -> Result<Preferences> {
        let theme = update.theme.map(str::parse::<Theme>).transpose()?;
        let density = update.density.map(str::parse::<Density>).transpose()?;

        let prefs = Preferences {
            theme: theme.unwrap_or(self.current.theme),
            density: density.unwrap_or(self.current.density),
        };

        if let Err(err) = self.store.set_preferences(prefs) {
            tracing::warn!(
                "could not persist {} / {}: {}",
                prefs.theme.id(),
                prefs.density.id(),
                err
            );
            return Err(err);
        }
        self.current = prefs;
        self.mirrors.render(&prefs, renderer, true);

        let kind = update.event_kind(source);
        tracing::debug!(
            "PreferenceSynchronizer::apply - {} / {} ({} from {})",
            prefs.theme.id(),
            prefs.density.id(),
            kind,
            source
        );
        self.bus.publish(
            ChangeEvent::new(
                kind,
                EventPayload::Preferences {
                    theme: prefs.theme.id().to_string(),
                    density: prefs.density.id().to_string(),
                },
            )
            .with_source(source),
        );
        Ok(prefs)
    }

    /// Startup synchronization. Publishes nothing.
    ///
    /// A fully detected pair wins over storage and is only mirrored: the
    /// surface keeps its markup and storage is not written. A partially
    /// detected pair keeps the detected value, fills the rest from storage,
    /// persists the result, and renders every mirror including the surface.
    pub fn sync_initial(
        &mut self,
        renderer: &mut dyn Renderer,
        detected: DetectedPreferences,
    ) -> Preferences {
        let prefs = detected.resolve(self.store.preferences());

        if detected.is_complete() {
            tracing::debug!(
                "PreferenceSynchronizer::sync_initial - markup sets {} / {}, mirroring only",
                prefs.theme.id(),
                prefs.density.id()
            );
            self.current = prefs;
            self.mirrors.render(&prefs, renderer, false);
            return prefs;
        }

        if let Err(err) = self.store.set_preferences(prefs) {
            tracing::warn!("could not persist initial preferences: {}", err);
        }
        self.current = prefs;
        self.mirrors.render(&prefs, renderer, true);
        prefs
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for PreferenceSynchronizer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceSynchronizer")
            .field("store", &self.store)
            .field("mirrors", &self.mirrors)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use weave_core::{MemoryRenderer, WeaveError};

    fn synchronizer() -> (PreferenceSynchronizer, Arc<Mutex<Vec<ChangeEvent>>>) {
        let bus = Arc::new(BroadcastBus::new());
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        bus.subscribe_all(move |event| sink.lock().unwrap().push(event.clone()));
        (
            PreferenceSynchronizer::new(PreferenceStore::in_memory(), Mirrors::default(), bus),
            events,
        )
    }

    #[test]
    fn test_single_key_resolves_the_other() {
        let (mut sync, events) = synchronizer();
        let mut renderer = MemoryRenderer::new();

        sync.apply(&mut renderer, PreferenceUpdate::density("medium"), Source::Api)
            .unwrap();
        let prefs = sync
            .apply(&mut renderer, PreferenceUpdate::theme("dark-gray"), Source::UserUi)
            .unwrap();

        assert_eq!(prefs, Preferences::new(Theme::DarkGray, Density::Medium));
        let events = events.lock().unwrap();
        assert_eq!(events[0].kind, EventKind::DensityChanged);
        assert_eq!(events[1].kind, EventKind::ThemeChanged);
        assert_eq!(events[1].source, Some(Source::UserUi));
        assert_eq!(
            events[1].payload,
            EventPayload::Preferences {
                theme: "dark-gray".into(),
                density: "medium".into()
            }
        );
    }

    #[test]
    fn test_invalid_value_changes_nothing() {
        let (mut sync, events) = synchronizer();
        let mut renderer = MemoryRenderer::new();

        let err = sync
            .apply_preference(&mut renderer, PreferenceKey::Theme, "neon-pink", Source::Api)
            .unwrap_err();

        assert!(matches!(err, WeaveError::InvalidValue { .. }));
        assert!(renderer.calls().is_empty());
        assert!(events.lock().unwrap().is_empty());
        assert!(sync.store().backend().get("weave-ui-theme").is_none());
    }

    #[test]
    fn test_invalid_second_value_rejects_pair() {
        let (mut sync, _events) = synchronizer();
        let mut renderer = MemoryRenderer::new();

        assert!(sync
            .apply(
                &mut renderer,
                PreferenceUpdate::both("dark-blue", "compact"),
                Source::Api
            )
            .is_err());
        assert_eq!(sync.current(), Preferences::default());
    }

    #[test]
    fn test_host_source_publishes_host_event() {
        let (mut sync, events) = synchronizer();
        let mut renderer = MemoryRenderer::new();

        sync.apply(
            &mut renderer,
            PreferenceUpdate::both("dark-blue", "medium"),
            Source::HostApp,
        )
        .unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::HostThemeChanged);
        assert_eq!(events[0].source, Some(Source::HostApp));
    }

    #[test]
    fn test_complete_markup_is_mirrored_not_persisted() {
        let (mut sync, events) = synchronizer();
        let mut renderer = MemoryRenderer::new();

        let prefs = sync.sync_initial(
            &mut renderer,
            DetectedPreferences::complete(Preferences::new(Theme::DarkBlue, Density::Medium)),
        );

        assert_eq!(prefs.theme, Theme::DarkBlue);
        assert_eq!(renderer.label("theme-dropdown/label"), Some("Dark Blue"));
        assert!(renderer.state("surface").is_none());
        assert!(sync.store().backend().get("weave-ui-theme").is_none());
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_partial_markup_keeps_detected_value() {
        let bus = Arc::new(BroadcastBus::new());
        let store = PreferenceStore::new(MemoryStorage::with_values([
            ("weave-ui-theme", "dark-gray"),
            ("weave-ui-density", "medium"),
        ]));
        let mut sync = PreferenceSynchronizer::new(store, Mirrors::default(), bus);
        let mut renderer = MemoryRenderer::new();

        let prefs = sync.sync_initial(
            &mut renderer,
            DetectedPreferences {
                theme: Some(Theme::DarkBlue),
                density: None,
            },
        );

        assert_eq!(prefs, Preferences::new(Theme::DarkBlue, Density::Medium));
        assert_eq!(sync.current(), prefs);
        assert_eq!(
            renderer.state("surface"),
            Some(&weave_core::VisualState::Surface {
                theme: "dark-blue".into(),
                density: "medium".into()
            })
        );
    }
}
