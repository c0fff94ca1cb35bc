//! Weave UI Controller
//!
//! Behavior controller for themed Weave widgets embedded in a host
//! application surface. [`WeaveUi`] takes over the controls of a scanned page
//! (dropdowns, accordions, collapsible sections, checkbox groups, selectable
//! lists, tab strips), keeps the theme/density preference consistent across
//! storage and every visual mirror, and announces each change on a
//! [`weave_core::BroadcastBus`].
//!
//! # Quick Start
//!
//! ```rust
//! use weave_core::{EventKind, InputAction, InputEvent};
//! use weave_ui::{PageScan, WeaveUi};
//!
//! let scan = PageScan::from_toml_str(r#"
//!     [[dropdowns]]
//!     id = "export-dropdown"
//!     items = [{ value = "csv", text = "CSV" }, { value = "json", text = "JSON" }]
//! "#).unwrap();
//!
//! let mut ui = WeaveUi::in_memory();
//! ui.bus().subscribe(EventKind::DropdownSelected, |event| println!("{:?}", event.payload));
//! ui.initialize(&scan);
//!
//! ui.handle_input(InputEvent::new("export-dropdown", InputAction::Select("json".into()))).unwrap();
//! assert_eq!(ui.renderer().label("export-dropdown/label"), Some("JSON"));
//!
//! ui.set_theme("dark-blue").unwrap();
//! assert!(ui.set_theme("neon-pink").is_err());
//! ```

pub mod config;
pub mod controller;
pub mod scan;
pub mod selection;

pub use config::{ConfigError, HostConfig, MirrorConfig, StorageConfig, WeaveConfig};
pub use controller::{WeaveUi, VERSION};
pub use scan::{
    AccordionScan, CheckboxGroupScan, DropdownScan, ItemScan, ListScan, MemberScan, PageScan,
    SectionScan, TabStripScan, DROPDOWN_CLASS,
};
pub use selection::{Choice, Selection, SelectionChanges, SelectionMode};

// Re-export the collaborators callers need alongside the controller
pub use weave_bridge::{BridgeOutcome, HostChannel, RecordingHost};
pub use weave_theme::{Density, FileStorage, MemoryStorage, Mirrors, PreferenceStore, Preferences, Theme};
