//! Weave Core Runtime
//!
//! Foundational primitives for the Weave UI controller:
//!
//! - **Broadcast bus**: synchronous publish/subscribe for change events
//! - **Toggle state machines**: open/closed controls with exclusivity classes
//! - **Group reducer**: tri-state aggregate of checkbox groups
//! - **Renderer collaborator**: the only way state reaches the screen
//!
//! # Example
//!
//! ```rust
//! use weave_core::toggle::{ToggleKind, ToggleSet, ToggleSpec};
//!
//! let mut toggles = ToggleSet::new();
//! toggles.register(ToggleSpec::new("theme", ToggleKind::Dropdown).exclusive_in("dropdowns"));
//! toggles.register(ToggleSpec::new("density", ToggleKind::Dropdown).exclusive_in("dropdowns"));
//!
//! toggles.activate("theme").unwrap();
//! let transitions = toggles.activate("density").unwrap();
//!
//! // The open sibling is closed before the new one opens.
//! assert_eq!(transitions[0].control.as_str(), "theme");
//! assert!(!transitions[0].open);
//! assert!(transitions[1].open);
//! ```

pub mod bus;
pub mod error;
pub mod events;
pub mod fsm;
pub mod group;
pub mod render;
pub mod toggle;

pub use bus::{BroadcastBus, SubscriptionId};
pub use error::{Result, WeaveError};
pub use events::{
    ChangeEvent, ControlId, EventKind, EventPayload, InputAction, InputEvent, KeyCode, Source,
};
pub use fsm::{StateMachine, Transition};
pub use group::{reduce, Aggregate, CheckboxGroup, GroupChange, GroupSet};
pub use render::{MemoryRenderer, Renderer, VisualState};
pub use toggle::{ToggleKind, ToggleSet, ToggleSpec, ToggleState, ToggleTransition};
