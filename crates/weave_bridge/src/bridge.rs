//! Host bridge
//!
//! Inbound messages come from an untrusted host frame. Nothing the host sends
//! can make [`HostBridge::receive`] fail: malformed payloads and invalid values
//! are logged and reported in the returned [`BridgeOutcome`].

use crate::message::{encode_pair, HostMessage};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use weave_core::{
    BroadcastBus, EventPayload, Renderer, Source, SubscriptionId, WeaveError,
};
use weave_theme::{PreferenceSynchronizer, PreferenceUpdate, Preferences, StorageBackend};

/// What happened to an inbound message
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BridgeOutcome {
    /// Preferences were applied
    Applied(Preferences),
    /// Integration is disabled; the message was dropped
    Disabled,
    /// Well-formed but not a message we handle
    Ignored,
    /// Malformed or invalid; nothing changed
    Rejected(WeaveError),
}

#[derive(Debug)]
pub struct HostBridge {
    enabled: bool,
}

impl Default for HostBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl HostBridge {
    /// A bridge with integration enabled
    pub fn new() -> Self {
        Self { enabled: true }
    }

    pub fn enable(&mut self) {
        if !self.enabled {
            tracing::info!("host app integration enabled");
        }
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        if self.enabled {
            tracing::info!("host app integration disabled");
        }
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Handle a raw cross-frame message
    pub fn receive<S: StorageBackend>(
        &self,
        raw: &str,
        sync: &mut PreferenceSynchronizer<S>,
        renderer: &mut dyn Renderer,
    ) -> BridgeOutcome {
        if !self.enabled {
            return BridgeOutcome::Disabled;
        }
        Self::dispatch(HostMessage::decode(raw), sync, renderer)
    }

    /// Handle a message the host posted as a structured value
    pub fn receive_value<S: StorageBackend>(
        &self,
        value: Value,
        sync: &mut PreferenceSynchronizer<S>,
        renderer: &mut dyn Renderer,
    ) -> BridgeOutcome {
        if !self.enabled {
            return BridgeOutcome::Disabled;
        }
        Self::dispatch(HostMessage::decode_value(value), sync, renderer)
    }

    /// Loopback: run a theme change through the inbound path without a real
    /// host. Works whether or not integration is enabled.
    pub fn simulate<S: StorageBackend>(
        &self,
        theme: Option<&str>,
        density: Option<&str>,
        sync: &mut PreferenceSynchronizer<S>,
        renderer: &mut dyn Renderer,
    ) -> BridgeOutcome {
        let value = HostMessage::theme_change(theme, density).to_value();
        Self::dispatch(HostMessage::decode_value(value), sync, renderer)
    }

    fn dispatch<S: StorageBackend>(
        decoded: weave_core::Result<Option<HostMessage>>,
        sync: &mut PreferenceSynchronizer<S>,
        renderer: &mut dyn Renderer,
    ) -> BridgeOutcome {
        let message = match decoded {
            Ok(Some(message)) => message,
            Ok(None) => return BridgeOutcome::Ignored,
            Err(err) => {
                tracing::warn!("Failed to parse host app message: {}", err);
                return BridgeOutcome::Rejected(err);
            }
        };

        match message {
            HostMessage::ThemeChange(payload) => {
                let update = PreferenceUpdate {
                    theme: payload.theme.as_deref(),
                    density: payload.density.as_deref(),
                };
                match sync.apply(renderer, update, Source::HostApp) {
                    Ok(prefs) => BridgeOutcome::Applied(prefs),
                    Err(err) => {
                        tracing::warn!("host app sent an invalid theme change: {}", err);
                        BridgeOutcome::Rejected(err)
                    }
                }
            }
        }
    }
}

/// Outbound side of the cross-frame channel
pub trait HostChannel: Send + Sync {
    fn post(&self, message: &str);
}

/// Channel that keeps every posted message, for tests and headless runs
#[derive(Debug, Default)]
pub struct RecordingHost {
    messages: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }
}

impl HostChannel for RecordingHost {
    fn post(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

/// Forward locally originated preference changes to the host.
///
/// Changes that came from the host are not echoed back.
pub fn forward_to_host(bus: &BroadcastBus, channel: Arc<dyn HostChannel>) -> SubscriptionId {
    bus.subscribe_all(move |event| {
        if !event.kind.is_preference() || event.source == Some(Source::HostApp) {
            return;
        }
        if let EventPayload::Preferences { theme, density } = &event.payload {
            channel.post(&encode_pair(theme, density));
        }
    })
}
