//! Change events and normalized input events
//!
//! [`ChangeEvent`]s flow out of the controllers through the
//! [`BroadcastBus`](crate::bus::BroadcastBus); [`InputEvent`]s flow in from
//! whatever input source the host surface provides.

use crate::group::Aggregate;
use std::borrow::Borrow;
use std::fmt;

/// Identifier of a rendered control (dropdown, accordion, checkbox, tab...)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ControlId(String);

impl ControlId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Id of a sub-part of this control, e.g. `theme-dropdown/label`
    pub fn part(&self, part: &str) -> ControlId {
        Self(format!("{}/{}", self.0, part))
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ControlId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ControlId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Borrow<str> for ControlId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Kinds of change notifications published on the bus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    ThemeChanged,
    DensityChanged,
    /// Theme and density applied together through the API
    UiChanged,
    /// Preferences applied from a host application message
    HostThemeChanged,
    CheckboxGroupChanged,
    SectionToggled,
    ListItemSelected,
    DropdownToggled,
    DropdownSelected,
    AccordionToggled,
    TabChanged,
    UiReady,
}

impl EventKind {
    /// Stable wire name, used in logs and by hosts listening for DOM-style events.
    pub fn name(self) -> &'static str {
        match self {
            Self::ThemeChanged => "weave-theme-changed",
            Self::DensityChanged => "weave-density-changed",
            Self::UiChanged => "weave-ui-changed",
            Self::HostThemeChanged => "weave-host-theme-changed",
            Self::CheckboxGroupChanged => "weave-checkbox-group-changed",
            Self::SectionToggled => "weave-section-toggled",
            Self::ListItemSelected => "weave-list-item-selected",
            Self::DropdownToggled => "weave-dropdown-toggled",
            Self::DropdownSelected => "weave-dropdown-selected",
            Self::AccordionToggled => "weave-accordion-toggled",
            Self::TabChanged => "weave-tab-changed",
            Self::UiReady => "weave-ui-ready",
        }
    }

    /// Every event kind, in catalogue order.
    pub fn all() -> &'static [EventKind] {
        const KINDS: [EventKind; 12] = [
            EventKind::ThemeChanged,
            EventKind::DensityChanged,
            EventKind::UiChanged,
            EventKind::HostThemeChanged,
            EventKind::CheckboxGroupChanged,
            EventKind::SectionToggled,
            EventKind::ListItemSelected,
            EventKind::DropdownToggled,
            EventKind::DropdownSelected,
            EventKind::AccordionToggled,
            EventKind::TabChanged,
            EventKind::UiReady,
        ];
        &KINDS
    }

    /// Whether this kind reports a preference change.
    pub fn is_preference(self) -> bool {
        matches!(
            self,
            Self::ThemeChanged | Self::DensityChanged | Self::UiChanged | Self::HostThemeChanged
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Origin of a change, so observers can break feedback loops
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Source {
    UserUi,
    Api,
    HostApp,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserUi => "user-ui",
            Self::Api => "api",
            Self::HostApp => "host-app",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event-specific data
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventPayload {
    /// Resolved preference pair after the change
    Preferences { theme: String, density: String },
    CheckboxGroup {
        parent_id: ControlId,
        aggregate: Aggregate,
        checked_count: usize,
        total_count: usize,
    },
    Section {
        section: ControlId,
        collapsed: bool,
    },
    ListItem {
        item: String,
        list_id: ControlId,
    },
    DropdownToggled {
        dropdown: ControlId,
        is_open: bool,
    },
    DropdownSelected {
        dropdown: ControlId,
        value: String,
        text: String,
    },
    Accordion {
        accordion: ControlId,
        is_expanded: bool,
        header: String,
    },
    Tab {
        strip: ControlId,
        active_tab: String,
    },
    Ready {
        version: String,
        timestamp_ms: u64,
    },
}

/// An immutable, fire-and-forget state change notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: EventKind,
    pub payload: EventPayload,
    /// Present for every kind that can be triggered from more than one origin
    pub source: Option<Source>,
}

impl ChangeEvent {
    pub fn new(kind: EventKind, payload: EventPayload) -> Self {
        Self {
            kind,
            payload,
            source: None,
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }
}

/// Virtual key codes (platform-agnostic)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const TAB: KeyCode = KeyCode(0x09);
    pub const ENTER: KeyCode = KeyCode(0x0D);
    pub const ESCAPE: KeyCode = KeyCode(0x1B);
    pub const SPACE: KeyCode = KeyCode(0x20);

    pub const LEFT: KeyCode = KeyCode(0x25);
    pub const UP: KeyCode = KeyCode(0x26);
    pub const RIGHT: KeyCode = KeyCode(0x27);
    pub const DOWN: KeyCode = KeyCode(0x28);

    pub const UNKNOWN: KeyCode = KeyCode(0);

    /// Enter and Space activate a focused control exactly like a click.
    pub const fn is_activation(self) -> bool {
        self.0 == Self::ENTER.0 || self.0 == Self::SPACE.0
    }
}

/// What the user did to a control
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputAction {
    /// Primary activation (click or tap)
    Activate,
    /// Key pressed while the control had focus
    Key(KeyCode),
    /// Click or focus landed outside every dropdown
    OutsideClick,
    /// Cancellation (Escape)
    Escape,
    /// An item or option with the given value was chosen
    Select(String),
    /// A checkbox changed its checked flag
    SetChecked(bool),
}

/// A normalized interaction raised by the input source
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputEvent {
    pub target: ControlId,
    pub action: InputAction,
}

impl InputEvent {
    pub fn new(target: impl Into<ControlId>, action: InputAction) -> Self {
        Self {
            target: target.into(),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_unique() {
        let mut names: Vec<&str> = EventKind::all().iter().map(|k| k.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), EventKind::all().len());
    }

    #[test]
    fn test_activation_keys() {
        assert!(KeyCode::ENTER.is_activation());
        assert!(KeyCode::SPACE.is_activation());
        assert!(!KeyCode::ESCAPE.is_activation());
        assert!(!KeyCode::TAB.is_activation());
    }

    #[test]
    fn test_control_id_borrows_as_str() {
        let mut map = std::collections::HashMap::new();
        map.insert(ControlId::from("theme-dropdown"), 1);
        assert_eq!(map.get("theme-dropdown"), Some(&1));
    }

    #[test]
    fn test_part_ids() {
        let id = ControlId::from("theme-dropdown");
        assert_eq!(id.part("label").as_str(), "theme-dropdown/label");
    }
}
