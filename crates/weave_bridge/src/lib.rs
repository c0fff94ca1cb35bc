//! Weave Host Bridge
//!
//! Translates cross-frame messages from a host application into preference
//! changes (tagged `host-app`), and optionally forwards local preference
//! changes back to the host in the same envelope.

mod bridge;
mod message;

pub use bridge::{forward_to_host, BridgeOutcome, HostBridge, HostChannel, RecordingHost};
pub use message::{encode_preferences, HostMessage, ThemeChangePayload, THEME_CHANGE};
