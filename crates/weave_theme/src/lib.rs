//! Weave Theme Preferences
//!
//! Theme and density are the two persisted preferences of a Weave surface.
//! This crate owns their validation and storage and keeps every visual mirror
//! of them consistent.
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use weave_core::{BroadcastBus, MemoryRenderer, Source};
//! use weave_theme::{Mirrors, PreferenceStore, PreferenceSynchronizer, PreferenceUpdate, Theme};
//!
//! let bus = Arc::new(BroadcastBus::new());
//! let mut sync = PreferenceSynchronizer::new(PreferenceStore::in_memory(), Mirrors::default(), bus);
//! let mut renderer = MemoryRenderer::new();
//!
//! sync.apply(&mut renderer, PreferenceUpdate::theme("dark-gray"), Source::Api).unwrap();
//! assert_eq!(sync.current().theme, Theme::DarkGray);
//! assert_eq!(renderer.label("theme-dropdown/label"), Some("Dark Gray"));
//! ```
//!
//! # Storage
//!
//! - [`MemoryStorage`]: volatile, for tests and headless runs
//! - [`FileStorage`]: JSON file, rewritten on every change

pub mod inspect;
pub mod mirror;
pub mod preference;
pub mod storage;
pub mod store;
pub mod sync;

pub use inspect::{DetectedPreferences, StateInspector};
pub use mirror::Mirrors;
pub use preference::{Density, PreferenceKey, Preferences, Theme};
pub use storage::{FileStorage, MemoryStorage, StorageBackend};
pub use store::PreferenceStore;
pub use sync::{PreferenceSynchronizer, PreferenceUpdate};
